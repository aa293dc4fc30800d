//! Auto Noindex Agent Library
//!
//! The consuming-plugin side of the Auto Noindex pair:
//! - Persisted settings record (JSON file store)
//! - Validation client for the entitlement server
//! - The manual "check now" round trip and its operator notices

pub mod check;
pub mod client;
pub mod store;

pub use check::{Notice, run_check};
pub use client::ValidationClient;
pub use store::SettingsStore;
