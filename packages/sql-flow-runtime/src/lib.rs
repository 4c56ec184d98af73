//! Host boundary, HTTP client and sequential execution engine.

pub mod compose;
pub mod error;
pub mod executor;
pub mod host;
pub mod http;
pub mod store;

pub use compose::{compose_button, Composition};
pub use error::{ExecError, HostError, Result, StoreError};
pub use executor::{ButtonRunner, ExecutionReport, ExecutionState, SingleOutcome, StepOutcome};
pub use host::{
    AccessTokenProvider, BulkColumns, QueryEndpoint, RecordWriter, SqlResponse, StaticToken,
    TableWriter,
};
pub use http::HostClient;
pub use store::{ButtonStore, SaveSummary};
