//! Wire shapes of the table/column metadata payload.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{ColumnId, TableId};

/// Metadata payload with explicit numeric ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplicitPayload {
    /// Tables in build order
    pub tables: Vec<ExplicitTable>,
}

/// One table of the explicit shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplicitTable {
    /// Stable table id
    pub table_id: TableId,
    /// Current table name
    pub table_name: String,
    /// Columns in build order (absent means none)
    #[serde(default)]
    pub columns: Option<Vec<ExplicitColumn>>,
}

/// One column of the explicit shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplicitColumn {
    /// Globally unique column id
    pub id: ColumnId,
    /// Current column label
    pub label: String,
}

/// Either accepted payload shape.
///
/// The explicit shape is tried first; a structural mismatch falls back to
/// the legacy `table name -> [column labels]` mapping. Key order of the
/// legacy map is kept because it drives id synthesis.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MetadataPayload {
    Explicit(ExplicitPayload),
    Legacy(IndexMap<String, Vec<String>>),
}
