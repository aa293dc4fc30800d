//! Validation client for the entitlement server.
//!
//! One bounded-timeout POST per "check now" action, no retries. Transport
//! failures and malformed responses all collapse into `CheckOutcome::Failed`;
//! the caller decides what that means via the grace-fallback policy.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use autonoindex_core::entitlement::CheckOutcome;

/// Bounded timeout for the outbound validation call.
pub const VALIDATE_TIMEOUT: Duration = Duration::from_secs(10);

/// Default validation endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://wptools.co.uk/v1/noindex/validate";

/// Validation client errors (construction only; calls never error, they
/// yield a failed outcome).
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP client build failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

#[derive(Debug, Serialize)]
struct ValidatePayload<'a> {
    token: &'a str,
    site: &'a str,
    home_url: &'a str,
    plugin: &'a str,
    version: &'a str,
}

/// HTTP client for the validation RPC.
#[derive(Debug)]
pub struct ValidationClient {
    http: reqwest::Client,
    endpoint: String,
}

impl ValidationClient {
    /// Create a new validation client against the given endpoint.
    pub fn new(endpoint: &str) -> Result<Self, ClientError> {
        if endpoint.is_empty() {
            return Err(ClientError::Config("endpoint is empty".into()));
        }

        // Ensure a TLS crypto provider is installed (reqwest uses rustls-no-provider).
        let _ = rustls::crypto::ring::default_provider().install_default();

        let http = reqwest::Client::builder()
            .timeout(VALIDATE_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
        })
    }

    /// Perform one validation round trip.
    ///
    /// Never fails: every transport or decoding problem is reported as
    /// `CheckOutcome::Failed`.
    pub async fn validate(&self, token: &str, site: &str, home_url: &str) -> CheckOutcome {
        let payload = ValidatePayload {
            token,
            site,
            home_url,
            plugin: "autonoindex-agent",
            version: env!("CARGO_PKG_VERSION"),
        };

        let resp = match self.http.post(&self.endpoint).json(&payload).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(error = %e, "Validation request failed");
                return CheckOutcome::Failed;
            }
        };

        let status = resp.status().as_u16();
        let body = match resp.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "Validation response unreadable");
                return CheckOutcome::Failed;
            }
        };

        outcome_from_response(status, &body)
    }
}

/// Decode a validation response into a check outcome.
///
/// Success requires an HTTP status in [200, 300) and a decoded JSON body
/// containing the `active` key; anything else is a failed call.
pub fn outcome_from_response(status: u16, body: &str) -> CheckOutcome {
    if !(200..300).contains(&status) {
        return CheckOutcome::Failed;
    }

    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return CheckOutcome::Failed;
    };

    let Some(active) = value.get("active") else {
        return CheckOutcome::Failed;
    };

    CheckOutcome::Response {
        active: active.as_bool().unwrap_or(false),
        grace_until: value.get("grace_until").and_then(serde_json::Value::as_i64).unwrap_or(0),
    }
}
