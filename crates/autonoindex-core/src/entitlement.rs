//! Client-side entitlement cache and staleness rules.
//!
//! The agent keeps a single persisted entitlement record and derives a
//! "pro enabled" flag from it on every evaluation. Two independent windows
//! must both hold: the last validation check must be recent (7-day hard
//! cutoff), and the cached status must be active or inside a grace window
//! granted by the server. The record is mutated only by the explicit
//! "check now" round trip; the evaluation path is read-only.
//!
//! Time is always an explicit `now` parameter so the grace/staleness logic
//! is deterministic under test.

use serde::{Deserialize, Serialize};

/// Hard cutoff on check freshness: 7 days.
pub const CHECK_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Maximum accepted token length after whitespace stripping.
pub const TOKEN_MAX_LEN: usize = 200;

/// Locally cached subscription status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProStatus {
    #[default]
    Unknown,
    Active,
    Grace,
    Inactive,
}

impl ProStatus {
    /// Human-readable badge shown to the operator.
    pub const fn badge(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Active => "Active",
            Self::Grace => "Grace",
            Self::Inactive => "Inactive",
        }
    }
}

/// The single persisted entitlement record on the client side.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntitlementCache {
    /// Opaque subscription token, trimmed and whitespace-stripped.
    #[serde(default)]
    pub pro_token: String,
    #[serde(default)]
    pub pro_status: ProStatus,
    /// Unix timestamp of the last successful or attempted validation.
    #[serde(default)]
    pub pro_last_check: i64,
    /// Grace deadline carried over from the last server response.
    #[serde(default)]
    pub pro_grace_until: i64,
}

/// Outcome of one validation round trip, as seen by the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Well-formed response: HTTP 2xx and an `active` field in the body.
    Response { active: bool, grace_until: i64 },
    /// Network error, timeout, non-2xx status, or malformed body.
    Failed,
}

/// Whether pro rule tiers may be evaluated right now.
///
/// Rules, in order: a token must be configured; the last check must be
/// within [`CHECK_TTL_SECS`] (staleness alone disables pro, grace does not
/// extend it); then the cached status decides, with a non-active status
/// still counting while `now` is inside the grace window.
pub fn pro_enabled(cache: &EntitlementCache, now: i64) -> bool {
    if cache.pro_token.is_empty() {
        return false;
    }

    if cache.pro_last_check == 0 || now - cache.pro_last_check > CHECK_TTL_SECS {
        return false;
    }

    match cache.pro_status {
        ProStatus::Active => true,
        _ => cache.pro_grace_until != 0 && now <= cache.pro_grace_until,
    }
}

/// Fold one validation outcome into the cache.
///
/// An `active=false` response enters grace while the reported deadline is
/// still ahead. A failed call falls back to the previously stored grace
/// window instead of revoking outright; once that window is behind us the
/// status drops to inactive and the deadline is cleared. `pro_last_check`
/// is re-armed unconditionally.
pub fn apply_check_result(cache: &mut EntitlementCache, outcome: CheckOutcome, now: i64) {
    let (status, grace_until) = match outcome {
        CheckOutcome::Response {
            active: true,
            grace_until,
        } => (ProStatus::Active, grace_until),
        CheckOutcome::Response {
            active: false,
            grace_until,
        } => {
            if grace_until > now {
                (ProStatus::Grace, grace_until)
            } else {
                (ProStatus::Inactive, grace_until)
            }
        }
        CheckOutcome::Failed => {
            if cache.pro_grace_until > now {
                (ProStatus::Grace, cache.pro_grace_until)
            } else {
                (ProStatus::Inactive, 0)
            }
        }
    };

    cache.pro_status = status;
    cache.pro_grace_until = grace_until;
    cache.pro_last_check = now;
}

/// Record a "check now" attempt made without a configured token.
pub fn apply_token_missing(cache: &mut EntitlementCache, now: i64) {
    cache.pro_status = ProStatus::Inactive;
    cache.pro_last_check = now;
    cache.pro_grace_until = 0;
}
