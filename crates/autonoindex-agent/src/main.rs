//! Auto Noindex agent CLI.
//!
//! Operator surface for the consuming install: run the manual "check now"
//! validation, inspect the cached subscription status, save sanitized
//! settings, and evaluate the noindex decision for a classified request.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use autonoindex_agent::check::{run_check, site_host};
use autonoindex_agent::client::{DEFAULT_ENDPOINT, ValidationClient};
use autonoindex_agent::store::SettingsStore;
use autonoindex_core::db::unix_timestamp;
use autonoindex_core::entitlement::pro_enabled;
use autonoindex_core::rules::{PageContext, RobotsDirectives, decide};
use autonoindex_core::settings::{Settings, sanitize_settings};
use autonoindex_core::tracing_init::init_tracing;

#[derive(Parser, Debug)]
#[command(name = "autonoindex")]
#[command(version, about = "Auto Noindex agent - entitlement checks and noindex evaluation")]
struct Args {
    /// Path to the settings file (default: ~/.autonoindex/settings.json).
    #[arg(long, env = "AUTONOINDEX_SETTINGS")]
    settings: Option<PathBuf>,

    /// Output logs as JSON.
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate the configured token against the entitlement server now.
    Check {
        /// Validation endpoint URL.
        #[arg(long, env = "AUTONOINDEX_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
        endpoint: String,

        /// This install's home URL, sent as the site identity.
        #[arg(long, env = "AUTONOINDEX_HOME_URL")]
        home_url: String,
    },

    /// Show the cached subscription status.
    Status,

    /// Evaluate the noindex decision for a classified request context.
    Evaluate {
        /// Path to a JSON page-context file.
        #[arg(long)]
        context: PathBuf,

        /// Path to a JSON robots-directives file to merge into (optional).
        #[arg(long)]
        robots: Option<PathBuf>,
    },

    /// Sanitize and persist a submitted settings record.
    ApplySettings {
        /// Path to the submitted settings JSON.
        path: PathBuf,

        /// Taxonomy names accepted into the pro allow-list (repeatable).
        #[arg(long = "allow-taxonomy")]
        allow_taxonomies: Vec<String>,

        /// Post-type names accepted into the pro allow-list (repeatable).
        #[arg(long = "allow-post-type")]
        allow_post_types: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing("autonoindex_agent=info", args.log_json);

    let store_path = match args.settings {
        Some(path) => path,
        None => SettingsStore::default_path()
            .ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?,
    };
    let store = SettingsStore::new(store_path);

    match args.command {
        Command::Check { endpoint, home_url } => {
            let client = ValidationClient::new(&endpoint)?;
            let notice = run_check(&store, &client, &home_url, unix_timestamp()).await?;
            println!("{}", notice.message());
        }
        Command::Status => {
            print_status(&store);
        }
        Command::Evaluate { context, robots } => {
            let ctx: PageContext = read_json(&context)?;
            let incoming: RobotsDirectives = match robots {
                Some(path) => read_json(&path)?,
                None => RobotsDirectives::default(),
            };
            let settings = store.load();
            let pro = pro_enabled(&settings.entitlement, unix_timestamp());
            let out = decide(&settings, &ctx, pro).apply(incoming);
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Command::ApplySettings {
            path,
            allow_taxonomies,
            allow_post_types,
        } => {
            let raw: serde_json::Value = read_json(&path)?;
            // An omitted token keeps the stored one; only an explicit
            // submission (including an empty one) replaces it.
            let submitted_token = raw
                .get("pro_token")
                .and_then(serde_json::Value::as_str)
                .map(ToString::to_string);
            let input: Settings = serde_json::from_value(raw)?;
            let existing = store.load();
            let pro = pro_enabled(&existing.entitlement, unix_timestamp());
            let sanitized = sanitize_settings(
                &input,
                submitted_token.as_deref(),
                &existing.entitlement,
                pro,
                &allow_taxonomies,
                &allow_post_types,
            );
            store.save(&sanitized)?;
            println!("Settings saved.");
        }
    }

    Ok(())
}

fn print_status(store: &SettingsStore) {
    let settings = store.load();
    let e = &settings.entitlement;
    let now = unix_timestamp();

    let last = if e.pro_last_check == 0 {
        "Never".to_string()
    } else {
        e.pro_last_check.to_string()
    };
    let grace = if e.pro_grace_until == 0 {
        "-".to_string()
    } else {
        e.pro_grace_until.to_string()
    };

    println!("Status:      {}", e.pro_status.badge());
    println!("Last check:  {last}");
    println!("Grace until: {grace}");
    println!(
        "Pro enabled: {}",
        if pro_enabled(e, now) { "yes" } else { "no" }
    );

    // The site identity the next check will send, for operator sanity.
    if let Ok(home_url) = std::env::var("AUTONOINDEX_HOME_URL") {
        println!("Site:        {}", site_host(&home_url));
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &std::path::Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
