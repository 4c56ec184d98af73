//! Query records as delivered by the host, and the in-memory index over them.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::FieldMapping;

/// Host row identifier
pub type RecordId = i64;

/// Raw host row: id plus column values keyed by column id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostRecord {
    pub id: RecordId,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

/// Stored query, projected from a host row through a [`FieldMapping`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryRecord {
    pub id: RecordId,
    /// Display name
    pub name: String,
    /// SQL text, encoded or label form depending on lifecycle stage
    pub sql_text: String,
    /// Metadata payload the catalog is built from
    pub metadata: Option<Value>,
    /// Default destination, usually an encoded `[TABLE:<id>]` token
    pub destination_table: Option<String>,
    /// JSON array of buttons
    pub button_config: Option<String>,
}

impl QueryRecord {
    /// Projects a host row.
    pub fn from_host(record: &HostRecord, mapping: &FieldMapping) -> Self {
        let text = |column: &str| record.fields.get(column).map(value_to_text);
        Self {
            id: record.id,
            name: text(mapping.name.as_str()).unwrap_or_default(),
            sql_text: text(mapping.sql.as_str()).unwrap_or_default(),
            metadata: record
                .fields
                .get(&mapping.metadata)
                .filter(|v| !is_blank(v))
                .cloned(),
            destination_table: text(mapping.destination.as_str()).filter(|s| !s.trim().is_empty()),
            button_config: text(mapping.button_config.as_str()).filter(|s| !s.trim().is_empty()),
        }
    }

    /// Returns true when there is no SQL to run.
    pub fn has_blank_sql(&self) -> bool {
        self.sql_text.trim().is_empty()
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Synchronous lookup of already-loaded query records.
pub trait RecordSource {
    /// Returns the record with the given id, if loaded.
    fn get(&self, id: RecordId) -> Option<&QueryRecord>;

    /// Returns true when the record is loaded.
    fn contains(&self, id: RecordId) -> bool {
        self.get(id).is_some()
    }
}

/// Outcome of resolving query names to record ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameResolution {
    /// Ids in the order the names were given
    pub ids: Vec<RecordId>,
    /// Names with no matching record
    pub missing: Vec<String>,
}

/// All query records of the host table, in host order.
#[derive(Debug, Clone, Default)]
pub struct QueryIndex {
    records: Vec<QueryRecord>,
    by_id: HashMap<RecordId, usize>,
}

impl QueryIndex {
    /// Builds an index; a repeated id keeps its first record.
    pub fn new(records: Vec<QueryRecord>) -> Self {
        let mut index = Self::default();
        for record in records {
            if index.by_id.contains_key(&record.id) {
                tracing::warn!("Duplicate record id {} ignored", record.id);
                continue;
            }
            index.by_id.insert(record.id, index.records.len());
            index.records.push(record);
        }
        index
    }

    /// Builds an index from raw host rows.
    pub fn from_host_records(records: &[HostRecord], mapping: &FieldMapping) -> Self {
        Self::new(
            records
                .iter()
                .map(|r| QueryRecord::from_host(r, mapping))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueryRecord> + '_ {
        self.records.iter()
    }

    /// Ids of every loaded record.
    pub fn known_ids(&self) -> HashSet<RecordId> {
        self.by_id.keys().copied().collect()
    }

    /// Distinct non-blank query names, trimmed and sorted.
    pub fn query_names(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.name.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// First record whose name equals `name` exactly.
    pub fn find_by_name(&self, name: &str) -> Option<&QueryRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    /// Resolves names to ids, keeping order and reporting unknown names.
    pub fn ids_for_names<S: AsRef<str>>(&self, names: &[S]) -> NameResolution {
        let mut resolution = NameResolution::default();
        for name in names {
            let name = name.as_ref();
            match self.find_by_name(name) {
                Some(record) => {
                    tracing::debug!("Query '{}' -> id {}", name, record.id);
                    resolution.ids.push(record.id);
                }
                None => {
                    tracing::warn!("Query '{}' not found among loaded records", name);
                    resolution.missing.push(name.to_string());
                }
            }
        }
        resolution
    }
}

impl RecordSource for QueryIndex {
    fn get(&self, id: RecordId) -> Option<&QueryRecord> {
        self.by_id.get(&id).map(|&i| &self.records[i])
    }
}
