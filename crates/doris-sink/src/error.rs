//! Error types for doris-sink crate.

use thiserror::Error;

/// Errors talking to a Doris frontend.
#[derive(Error, Debug)]
pub enum DorisSinkError {
    #[error("No Doris frontend endpoint configured")]
    NoEndpoint,

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("HTTP request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Result type alias for doris-sink operations.
pub type Result<T> = std::result::Result<T, DorisSinkError>;
