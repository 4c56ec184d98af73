//! Runtime error types.

use sql_flow_core::error::FlowError;
use sql_flow_core::record::RecordId;
use thiserror::Error;

/// Failures talking to the spreadsheet host.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// Request could not be sent or timed out
    #[error("Transport error: {0}")]
    Transport(String),

    /// Host answered with a non-success status
    #[error("Host returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not have the expected shape
    #[error("Undecodable host response: {0}")]
    Decode(String),

    /// No access token could be obtained
    #[error("Access token unavailable: {0}")]
    Token(String),
}

impl From<reqwest::Error> for HostError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            HostError::Decode(e.to_string())
        } else {
            HostError::Transport(e.to_string())
        }
    }
}

/// Failures of a button or single-query execution.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecError {
    /// A sequence is already running on this runner
    #[error("An execution is already in progress")]
    AlreadyRunning,

    /// Button has no steps
    #[error("Button '{0}' has an empty sequence")]
    EmptySequence(String),

    /// Step id with no loaded record
    #[error("Query record {0} not found")]
    RecordNotFound(RecordId),

    /// Query endpoint reported an error
    #[error("Query {record_id:?} failed: {message}")]
    Query {
        record_id: Option<RecordId>,
        message: String,
    },

    /// Host request failed
    #[error("Host error: {0}")]
    Host(#[from] HostError),

    /// Nothing to run
    #[error("SQL text is empty")]
    BlankSql,

    /// No destination table chosen
    #[error("No destination table selected")]
    MissingDestination,
}

/// Failures of a button list write.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Button rejected before any write
    #[error(transparent)]
    Invalid(#[from] FlowError),

    /// Host write failed
    #[error("Host error: {0}")]
    Host(#[from] HostError),
}

/// Result type for host calls
pub type HostResult<T> = std::result::Result<T, HostError>;

/// Result type for executions
pub type Result<T> = std::result::Result<T, ExecError>;
