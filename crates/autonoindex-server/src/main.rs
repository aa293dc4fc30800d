//! Auto Noindex Entitlement Server
//!
//! HTTP service answering subscription-token validation queries for the
//! Auto Noindex agent, backed by a SQLite token registry.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use autonoindex_core::tracing_init::init_tracing;
use autonoindex_server::routes::{AppState, build_router};
use autonoindex_server::storage::TokenDatabase;

#[derive(Parser, Debug)]
#[command(name = "autonoindex-server")]
#[command(version, about = "Auto Noindex entitlement server - token registry and validation RPC")]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0:8080", env = "LISTEN_ADDR")]
    addr: SocketAddr,

    /// Path to the SQLite token registry file.
    #[arg(long, env = "TOKEN_DB_PATH")]
    db_path: Option<PathBuf>,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing("autonoindex_server=info", args.log_json);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %args.addr,
        "Starting autonoindex-server"
    );

    let db_path = match args.db_path {
        Some(path) => path,
        None => default_db_path()?,
    };
    info!(path = %db_path.display(), "Opening token registry");
    let db = TokenDatabase::open(&db_path).await?;

    let app = build_router(AppState { db });
    let listener = tokio::net::TcpListener::bind(args.addr).await?;

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
    }

    info!("Server stopped");
    Ok(())
}

fn default_db_path() -> anyhow::Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(home.join(".autonoindex").join("tokens.db"))
}
