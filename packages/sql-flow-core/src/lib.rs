//! Core of the SQL flow toolkit.
//!
//! Provides the schema catalog built from table/column metadata, the
//! label/ID SQL rewriter, query records, the button model and the editor
//! load/save helpers. Nothing here performs I/O.

pub mod button;
pub mod catalog;
pub mod config;
pub mod editor;
pub mod error;
pub mod record;
pub mod rewrite;

pub use button::{Button, ButtonList};
pub use catalog::Catalog;
pub use config::{FieldMapping, HostConfig};
pub use error::{FlowError, Result};
pub use record::{QueryIndex, QueryRecord, RecordId, RecordSource};
