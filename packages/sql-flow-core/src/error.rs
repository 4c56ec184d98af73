//! Core error types.

use thiserror::Error;

/// Errors raised by configuration and record handling.
///
/// Malformed metadata and malformed button lists are not errors: they
/// degrade to empty structures and are only logged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    /// Two logical fields were mapped onto the same host column
    #[error("Fields '{first}' and '{second}' are both mapped to column '{column}'")]
    FieldCollision {
        first: &'static str,
        second: &'static str,
        column: String,
    },

    /// A required field mapping is empty
    #[error("Field mapping '{0}' is empty")]
    EmptyMapping(&'static str),

    /// Record payload could not be decoded
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Button rejected before any write
    #[error("Invalid button: {0}")]
    InvalidButton(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for FlowError {
    fn from(e: serde_json::Error) -> Self {
        FlowError::SerializationError(e.to_string())
    }
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, FlowError>;
