//! Error types for doris-types crate.

use thiserror::Error;

/// Errors that can occur while mapping types or rendering DDL.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeMappingError {
    #[error("Unsupported MySQL type: {0}")]
    UnsupportedType(String),

    #[error("Invalid schema change for column '{column}': {message}")]
    InvalidIntent { column: String, message: String },
}

/// Result type alias for doris-types operations.
pub type Result<T> = std::result::Result<T, TypeMappingError>;
