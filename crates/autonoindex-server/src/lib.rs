//! Auto Noindex Entitlement Server Library
//!
//! The validation side of the Auto Noindex pair:
//! - SQLite token registry (status, expiry, grace, site binding)
//! - Validation RPC answering `{active, grace_until}` queries
//! - Small JSON admin API for managing token records

pub mod routes;
pub mod storage;
pub mod validate;
