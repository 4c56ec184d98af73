//! Host boundary: the calls the engine and the store make into the
//! spreadsheet host, and the wire shapes they exchange.

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use sql_flow_core::record::RecordId;

use crate::error::{HostError, HostResult};

/// Supplies the token appended to host requests.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn token(&self) -> HostResult<String>;
}

/// Fixed token from configuration.
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl AccessTokenProvider for StaticToken {
    async fn token(&self) -> HostResult<String> {
        if self.0.is_empty() {
            return Err(HostError::Token("no token configured".to_string()));
        }
        Ok(self.0.clone())
    }
}

/// One result row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    #[serde(default)]
    pub fields: Map<String, Value>,
}

/// Answer of the query endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SqlResponse {
    /// Set when the host rejected the query
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub records: Vec<ResultRow>,
}

impl SqlResponse {
    pub fn rows(records: Vec<ResultRow>) -> Self {
        Self {
            error: None,
            records,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            records: Vec::new(),
        }
    }
}

/// Runs label-form SQL on the host.
#[async_trait]
pub trait QueryEndpoint: Send + Sync {
    async fn run_sql(&self, sql: &str) -> HostResult<SqlResponse>;
}

/// Replaces the whole content of a table.
#[async_trait]
pub trait TableWriter: Send + Sync {
    async fn replace_table_data(&self, table: &str, data: BulkColumns) -> HostResult<()>;
}

/// Updates fields of one record.
#[async_trait]
pub trait RecordWriter: Send + Sync {
    async fn update_record(
        &self,
        table: &str,
        id: RecordId,
        fields: Map<String, Value>,
    ) -> HostResult<()>;
}

/// Column-oriented table content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkColumns {
    /// Row ids, `1..=n`
    pub row_ids: Vec<i64>,
    /// Column name -> one value per row
    pub columns: IndexMap<String, Vec<Value>>,
}

impl BulkColumns {
    /// Pivots rows into columns.
    ///
    /// Column order comes from the first row; keys absent from the first
    /// row are dropped and cells missing from a later row become null.
    pub fn from_rows(rows: &[ResultRow]) -> Self {
        let Some(first) = rows.first() else {
            return Self::default();
        };
        let columns = first
            .fields
            .keys()
            .map(|name| {
                let values = rows
                    .iter()
                    .map(|row| row.fields.get(name).cloned().unwrap_or(Value::Null))
                    .collect();
                (name.clone(), values)
            })
            .collect();
        Self {
            row_ids: (1..=rows.len() as i64).collect(),
            columns,
        }
    }

    pub fn row_count(&self) -> usize {
        self.row_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_ids.is_empty()
    }
}

/// Host document action.
#[derive(Debug, Clone, PartialEq)]
pub enum UserAction {
    ReplaceTableData {
        table: String,
        data: BulkColumns,
    },
    UpdateRecord {
        table: String,
        id: RecordId,
        fields: Map<String, Value>,
    },
}

impl UserAction {
    /// Positional wire form, e.g. `["UpdateRecord", table, id, {fields}]`.
    pub fn to_json(&self) -> Value {
        match self {
            UserAction::ReplaceTableData { table, data } => {
                json!(["ReplaceTableData", table, data.row_ids, data.columns])
            }
            UserAction::UpdateRecord { table, id, fields } => {
                json!(["UpdateRecord", table, id, fields])
            }
        }
    }
}
