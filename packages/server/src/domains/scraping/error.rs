//! Error taxonomy for the scraping domain.

use apify_client::ApifyError;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Rejected before any network call.
    #[error("Invalid scrape request: {0}")]
    Validation(String),

    /// The provider answered with a non-success HTTP status.
    #[error("Provider call failed with HTTP {status}")]
    RemoteCallFailed { status: u16, body: String },

    /// The remote job reached a terminal status other than SUCCEEDED.
    #[error("Remote job finished with status {status}")]
    RemoteJobFailed { status: String, payload: Value },

    /// Network-level failure. Not retried here.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The provider kept reporting a non-terminal status past the poll deadline.
    #[error("Remote job {run_id} still running after {waited:?}")]
    PollTimeout { run_id: String, waited: Duration },

    /// Success status but an unreadable body.
    #[error("Could not decode provider response: {0}")]
    Decode(String),

    /// The snapshot store could not be reached. Never fatal.
    #[error("Persistence unavailable: {0}")]
    PersistenceUnavailable(String),
}

impl From<ApifyError> for ScrapeError {
    fn from(err: ApifyError) -> Self {
        match err {
            ApifyError::Api { status, message } => Self::RemoteCallFailed {
                status,
                body: message,
            },
            ApifyError::Network(e) => Self::Transport(e.to_string()),
            ApifyError::Parse(msg) => Self::Decode(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_keep_status_and_body() {
        let err: ScrapeError = ApifyError::Api {
            status: 402,
            message: r#"{"error":{"type":"not-enough-usage"}}"#.to_string(),
        }
        .into();

        match err {
            ScrapeError::RemoteCallFailed { status, body } => {
                assert_eq!(status, 402);
                assert!(body.contains("not-enough-usage"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn parse_errors_become_decode() {
        let err: ScrapeError = ApifyError::Parse("expected value".to_string()).into();
        assert!(matches!(err, ScrapeError::Decode(_)));
    }
}
