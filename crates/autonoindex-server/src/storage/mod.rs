//! SQLite storage for the Auto Noindex entitlement server.
//!
//! Persists the token registry: status, expiry, grace deadline, and the
//! optional site binding for each token.

mod db;
mod models;
mod queries;


pub use db::TokenDatabase;
pub use models::{SITES_MAX_ENTRIES, TokenRecord, TokenRegistration};
