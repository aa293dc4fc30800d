//! Auto Noindex Core Library
//!
//! Shared functionality for the Auto Noindex components:
//! - Persisted settings record with sanitization
//! - Client-side entitlement cache and staleness rules
//! - Noindex rule evaluator and robots-directive merge
//! - Common error types

pub mod db;
pub mod entitlement;
pub mod error;
pub mod rules;
pub mod settings;
pub mod tracing_init;

pub use entitlement::{CheckOutcome, EntitlementCache, ProStatus, pro_enabled};
pub use error::{Error, Result};
pub use rules::{Decision, PageContext, RobotsDirectives};
pub use settings::Settings;
