//! Error types for the Apify client.

use thiserror::Error;

/// Result type for Apify client operations.
pub type Result<T> = std::result::Result<T, ApifyError>;

/// Apify client errors.
#[derive(Debug, Error)]
pub enum ApifyError {
    /// Non-2xx response. `message` is the raw response body.
    #[error("Apify API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Connection failed, timed out, or the body could not be read
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Success status but the body was not the JSON we expected
    #[error("Parse error: {0}")]
    Parse(String),
}
