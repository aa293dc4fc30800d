//! The manual "check now" round trip.
//!
//! The only code path that mutates the entitlement fields of the settings
//! record. Outcomes surface to the operator as exactly two notices; raw
//! transport errors never do.

use autonoindex_core::entitlement::{
    CheckOutcome, apply_check_result, apply_token_missing,
};
use autonoindex_core::error::Result;
use autonoindex_core::settings::sanitize_token;

use crate::client::ValidationClient;
use crate::store::SettingsStore;

/// Operator-visible outcome of a "check now" action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    TokenMissing,
    StatusUpdated,
}

impl Notice {
    pub const fn message(self) -> &'static str {
        match self {
            Self::TokenMissing => "Subscription token is missing.",
            Self::StatusUpdated => "Subscription status updated.",
        }
    }
}

/// Lowercase host of the install's home URL, sent as the site identity.
pub fn site_host(home_url: &str) -> String {
    let trimmed = home_url.trim();
    let after_scheme = match trimmed.find("://") {
        Some(idx) => &trimmed[idx + 3..],
        None => trimmed,
    };
    after_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

/// Run the check-now protocol and persist the updated record.
///
/// An empty configured token short-circuits to an inactive record and the
/// token-missing notice without touching the network. Otherwise one
/// validation call is made and its outcome folded into the cache; the
/// last-check timestamp is re-armed either way.
pub async fn run_check(
    store: &SettingsStore,
    client: &ValidationClient,
    home_url: &str,
    now: i64,
) -> Result<Notice> {
    let mut settings = store.load();
    let token = sanitize_token(&settings.entitlement.pro_token);

    if token.is_empty() {
        apply_token_missing(&mut settings.entitlement, now);
        store.save(&settings)?;
        return Ok(Notice::TokenMissing);
    }

    let outcome = client.validate(&token, &site_host(home_url), home_url).await;
    finish_check(store, outcome, now)
}

fn finish_check(store: &SettingsStore, outcome: CheckOutcome, now: i64) -> Result<Notice> {
    let mut settings = store.load();
    apply_check_result(&mut settings.entitlement, outcome, now);
    store.save(&settings)?;
    Ok(Notice::StatusUpdated)
}
