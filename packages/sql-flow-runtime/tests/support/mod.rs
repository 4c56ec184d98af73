//! In-memory host doubles shared by the runtime test suites.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Map, Value};
use tokio::sync::Notify;

use sql_flow_core::record::{QueryRecord, RecordId};
use sql_flow_runtime::error::{HostError, HostResult};
use sql_flow_runtime::host::{
    BulkColumns, QueryEndpoint, RecordWriter, ResultRow, SqlResponse, TableWriter,
};

/// Catalog payload: orders(1) with amount(12), Out(9).
pub fn metadata() -> Value {
    json!({
        "tables": [
            {"table_id": 1, "table_name": "orders",
             "columns": [{"id": 11, "label": "id"}, {"id": 12, "label": "amount"}]},
            {"table_id": 9, "table_name": "Out", "columns": []}
        ]
    })
}

pub fn query(id: RecordId, sql: &str, destination: Option<&str>) -> QueryRecord {
    QueryRecord {
        id,
        name: format!("q{}", id),
        sql_text: sql.to_string(),
        metadata: Some(metadata()),
        destination_table: destination.map(str::to_string),
        button_config: None,
    }
}

pub fn rows(count: usize) -> SqlResponse {
    SqlResponse::rows(
        (0..count)
            .map(|i| ResultRow {
                fields: json!({ "n": i }).as_object().cloned().unwrap_or_default(),
            })
            .collect(),
    )
}

/// Query endpoint answering from a table of canned responses.
pub struct MockEndpoint {
    responses: HashMap<String, SqlResponse>,
    fallback: SqlResponse,
    gated: bool,
    pub calls: Mutex<Vec<String>>,
    pub entered: Notify,
    pub release: Notify,
}

impl MockEndpoint {
    pub fn new(fallback: SqlResponse) -> Self {
        Self {
            responses: HashMap::new(),
            fallback,
            gated: false,
            calls: Mutex::new(Vec::new()),
            entered: Notify::new(),
            release: Notify::new(),
        }
    }

    pub fn respond(mut self, sql: &str, response: SqlResponse) -> Self {
        self.responses.insert(sql.to_string(), response);
        self
    }

    /// Holds every call until `release` is notified.
    pub fn gated(mut self) -> Self {
        self.gated = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl QueryEndpoint for MockEndpoint {
    async fn run_sql(&self, sql: &str) -> HostResult<SqlResponse> {
        self.calls.lock().push(sql.to_string());
        self.entered.notify_one();
        if self.gated {
            self.release.notified().await;
        }
        Ok(self
            .responses
            .get(sql)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone()))
    }
}

/// Table writer recording every replacement.
#[derive(Default)]
pub struct MockTableWriter {
    pub writes: Mutex<Vec<(String, BulkColumns)>>,
    pub failing: HashSet<String>,
}

impl MockTableWriter {
    pub fn failing_on(table: &str) -> Self {
        Self {
            failing: HashSet::from([table.to_string()]),
            ..Default::default()
        }
    }

    pub fn tables(&self) -> Vec<String> {
        self.writes.lock().iter().map(|(t, _)| t.clone()).collect()
    }
}

#[async_trait]
impl TableWriter for MockTableWriter {
    async fn replace_table_data(&self, table: &str, data: BulkColumns) -> HostResult<()> {
        if self.failing.contains(table) {
            return Err(HostError::Status {
                status: 500,
                body: format!("cannot write {}", table),
            });
        }
        self.writes.lock().push((table.to_string(), data));
        Ok(())
    }
}

/// Record writer recording every update.
#[derive(Default)]
pub struct MockRecordWriter {
    pub updates: Mutex<Vec<(String, RecordId, Map<String, Value>)>>,
    pub failing: HashSet<RecordId>,
}

#[async_trait]
impl RecordWriter for MockRecordWriter {
    async fn update_record(
        &self,
        table: &str,
        id: RecordId,
        fields: Map<String, Value>,
    ) -> HostResult<()> {
        if self.failing.contains(&id) {
            return Err(HostError::Transport("connection reset".to_string()));
        }
        self.updates.lock().push((table.to_string(), id, fields));
        Ok(())
    }
}
