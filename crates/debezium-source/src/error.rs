//! Error types for the Debezium source crate.

use doris_types::TypeMappingError;
use thiserror::Error;

/// Errors raised while decoding envelopes or building records and DDL.
#[derive(Error, Debug)]
pub enum CdcError {
    #[error("Malformed change payload: {0}")]
    MalformedPayload(#[source] serde_json::Error),

    #[error("Malformed field '{field}': {message}")]
    MalformedField { field: String, message: String },

    #[error("Malformed schema history record: {0}")]
    MalformedHistory(String),

    #[error("Failed to serialize row: {0}")]
    Serialization(#[source] serde_json::Error),

    #[error("Invalid table identifier '{0}', expected 'database.table'")]
    InvalidTableIdentifier(String),

    #[error("Invalid DDL pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error(transparent)]
    SchemaChange(#[from] TypeMappingError),
}

/// Result type alias for Debezium source operations.
pub type Result<T> = std::result::Result<T, CdcError>;
