//! Data models for the token registry.

use serde::{Deserialize, Serialize};

/// Maximum number of bound sites kept per token.
pub const SITES_MAX_ENTRIES: usize = 50;

/// One registry row, keyed by the opaque token string.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TokenRecord {
    pub token: String,
    /// `active` or `inactive`; anything else is treated as inactive.
    pub status: String,
    /// Absolute expiry, 0 = never.
    pub expires_at: i64,
    /// Grace deadline, 0 = no grace.
    pub grace_until: i64,
    /// Newline-separated hostnames; empty = unrestricted.
    pub sites: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl TokenRecord {
    pub fn is_active_status(&self) -> bool {
        self.status == "active"
    }

    /// The bound sites as a list, empty lines dropped.
    pub fn site_list(&self) -> Vec<String> {
        self.sites
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(ToString::to_string)
            .collect()
    }
}

/// Admin API payload for creating or updating a token record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenRegistration {
    pub status: String,
    pub expires_at: i64,
    pub grace_until: i64,
    pub sites: Vec<String>,
}

impl TokenRegistration {
    /// Coerce the submitted payload into storable form: unrecognized status
    /// becomes `inactive`, sites are trimmed, empties dropped, and the list
    /// is capped at [`SITES_MAX_ENTRIES`].
    pub fn sanitized(&self) -> Self {
        let status = if self.status == "active" {
            "active".to_string()
        } else {
            "inactive".to_string()
        };

        let sites: Vec<String> = self
            .sites
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .take(SITES_MAX_ENTRIES)
            .collect();

        Self {
            status,
            expires_at: self.expires_at,
            grace_until: self.grace_until,
            sites,
        }
    }

    /// The sites list in its stored newline-joined form.
    pub fn sites_column(&self) -> String {
        self.sites.join("\n")
    }
}
