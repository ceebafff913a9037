//! Asset fetch errors.

use reqwest::StatusCode;
use std::path::PathBuf;

/// Fetching the raw bytes of an audio asset failed.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Transport-level HTTP failure
    #[error("request for {uri} failed: {source}")]
    Http {
        uri: String,
        #[source]
        source: reqwest::Error,
    },

    /// Server answered with a non-success status
    #[error("HTTP {status} for {uri}")]
    Status { status: StatusCode, uri: String },

    /// Reading a local asset failed
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported asset uri: {0}")]
    InvalidUri(String),
}

impl LoadError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            LoadError::Http { .. } => true,
            LoadError::Status { status, .. } => {
                *status == StatusCode::REQUEST_TIMEOUT
                    || *status == StatusCode::TOO_MANY_REQUESTS
                    || status.is_server_error()
            }
            LoadError::Io { .. } | LoadError::InvalidUri(_) => false,
        }
    }
}
