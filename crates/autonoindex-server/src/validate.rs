//! Token validation logic.
//!
//! Pure functions over a fetched token record and the caller's claimed
//! site identity. The server is the source of truth for status and
//! expiry: it never answers "grace" as an active state, it only surfaces
//! the grace deadline so the client can locally treat itself as soft-active.

use serde::{Deserialize, Serialize};

use crate::storage::TokenRecord;

/// Validation RPC request body. Missing fields coerce to empty strings;
/// `plugin` and `version` are accepted for diagnostics but not evaluated.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ValidateRequest {
    pub token: String,
    pub site: String,
    pub home_url: String,
    pub plugin: String,
    pub version: String,
}

/// Validation RPC response body. Always returned with HTTP 200.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateResponse {
    pub active: bool,
    pub grace_until: i64,
}

impl ValidateResponse {
    const fn denied() -> Self {
        Self {
            active: false,
            grace_until: 0,
        }
    }

    const fn inactive_with_grace(grace_until: i64) -> Self {
        Self {
            active: false,
            grace_until,
        }
    }
}

/// Normalize a site identity to a bare lowercase hostname.
///
/// Accepts either a full URL or a plain host: the scheme and anything after
/// the host are stripped when present, then the result is lowercased and a
/// trailing `:port` is removed.
pub fn normalize_host(url_or_host: &str) -> String {
    let trimmed = url_or_host.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let host = match trimmed.find("://") {
        Some(idx) => {
            let after_scheme = &trimmed[idx + 3..];
            let authority = after_scheme
                .split(['/', '?', '#'])
                .next()
                .unwrap_or_default();
            authority.rsplit('@').next().unwrap_or_default()
        }
        None => trimmed,
    };

    strip_port(&host.to_lowercase())
}

fn strip_port(host: &str) -> String {
    if let Some(idx) = host.rfind(':') {
        let tail = &host[idx + 1..];
        if !tail.is_empty() && tail.chars().all(|c| c.is_ascii_digit()) {
            return host[..idx].to_string();
        }
    }
    host.to_string()
}

/// Answer a validation query against a (possibly absent) token record.
///
/// `record` is the registry row for the trimmed request token, or `None`
/// when the token is empty or unknown. Evaluation order: token presence,
/// site identity, site binding, expiry (with grace surfaced), stored
/// status (same grace fallback), then active with the stored grace passed
/// through unchanged.
pub fn evaluate(record: Option<&TokenRecord>, req: &ValidateRequest, now: i64) -> ValidateResponse {
    if req.token.trim().is_empty() {
        return ValidateResponse::denied();
    }

    let Some(record) = record else {
        return ValidateResponse::denied();
    };

    let grace = record.grace_until;

    let mut site_host = normalize_host(&req.site);
    if site_host.is_empty() {
        site_host = normalize_host(&req.home_url);
    }
    if site_host.is_empty() {
        return ValidateResponse::inactive_with_grace(grace);
    }

    let allowed: Vec<String> = record
        .site_list()
        .iter()
        .map(|s| normalize_host(s))
        .filter(|s| !s.is_empty())
        .collect();
    if !allowed.is_empty() && !allowed.contains(&site_host) {
        return ValidateResponse::inactive_with_grace(grace);
    }

    if record.expires_at > 0 && now > record.expires_at {
        let surfaced = if grace > now { grace } else { 0 };
        return ValidateResponse::inactive_with_grace(surfaced);
    }

    if !record.is_active_status() {
        let surfaced = if grace > now { grace } else { 0 };
        return ValidateResponse::inactive_with_grace(surfaced);
    }

    ValidateResponse {
        active: true,
        grace_until: grace,
    }
}
