//! Error types for the Auto Noindex core library.

use thiserror::Error;

/// Result type alias using the Auto Noindex core Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for Auto Noindex operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Settings record error
    #[error("Settings error: {0}")]
    Settings(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
