//! Schema catalog: bidirectional table/column name and id lookups.
//!
//! A catalog is built from one metadata payload and is never merged with a
//! previous one. Malformed or unrecognized payloads produce an empty
//! catalog and a warning, never an error.

mod payload;

use std::collections::{HashMap, HashSet};

use serde_json::Value;

pub use payload::{ExplicitColumn, ExplicitPayload, ExplicitTable, MetadataPayload};

/// Stable table identifier
pub type TableId = i64;
/// Stable column identifier, unique across a whole catalog
pub type ColumnId = i64;

/// First id handed out to tables of a legacy payload.
pub const LEGACY_TABLE_ID_BASE: TableId = 1000;
/// First id handed out to columns of a legacy payload.
pub const LEGACY_COLUMN_ID_BASE: ColumnId = 10000;

/// Table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub id: TableId,
    pub name: String,
}

/// Column entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub id: ColumnId,
    pub label: String,
    /// Owning table, always present in the same catalog
    pub table_id: TableId,
}

/// Tables and columns of one metadata payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    /// Tables in build order
    tables: Vec<Table>,
    /// Columns in build order
    columns: Vec<Column>,
    table_name_to_id: HashMap<String, TableId>,
    table_id_to_name: HashMap<TableId, String>,
    column_id_to_label: HashMap<ColumnId, String>,
    /// `table.column` -> column id
    qualified_to_column_id: HashMap<String, ColumnId>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from metadata text.
    ///
    /// Blank text yields an empty catalog; text that is not JSON, or JSON of
    /// neither accepted shape, yields an empty catalog and a warning.
    pub fn build(payload: &str) -> Self {
        if payload.trim().is_empty() {
            tracing::info!("No metadata payload supplied, using empty catalog");
            return Self::new();
        }
        match serde_json::from_str::<Value>(payload) {
            Ok(value) => Self::from_value(&value),
            Err(e) => {
                tracing::warn!("Metadata payload is not valid JSON: {}", e);
                Self::new()
            }
        }
    }

    /// Builds a catalog from an already decoded payload.
    ///
    /// A JSON string value is treated as metadata text.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => {
                tracing::info!("Null metadata payload, using empty catalog");
                Self::new()
            }
            Value::String(text) => Self::build(text),
            other => match MetadataPayload::deserialize_value(other) {
                Some(payload) => Self::from_payload(payload),
                None => {
                    tracing::warn!(
                        "Unrecognized metadata payload shape, using empty catalog"
                    );
                    Self::new()
                }
            },
        }
    }

    /// Builds a catalog from a typed payload.
    pub fn from_payload(payload: MetadataPayload) -> Self {
        let mut builder = CatalogBuilder::default();
        match payload {
            MetadataPayload::Explicit(explicit) => {
                tracing::debug!("Explicit metadata payload with {} tables", explicit.tables.len());
                for table in explicit.tables {
                    if !builder.add_table(table.table_id, &table.table_name) {
                        continue;
                    }
                    for column in table.columns.unwrap_or_default() {
                        builder.add_column(
                            table.table_id,
                            &table.table_name,
                            column.id,
                            column.label,
                        );
                    }
                }
            }
            MetadataPayload::Legacy(map) => {
                tracing::debug!(
                    "Legacy metadata payload with {} tables, synthesizing ids",
                    map.len()
                );
                let mut next_table_id = LEGACY_TABLE_ID_BASE;
                let mut next_column_id = LEGACY_COLUMN_ID_BASE;
                for (table_name, labels) in map {
                    let table_id = next_table_id;
                    next_table_id += 1;
                    if !builder.add_table(table_id, &table_name) {
                        continue;
                    }
                    for label in labels {
                        let column_id = next_column_id;
                        next_column_id += 1;
                        builder.add_column(table_id, &table_name, column_id, label);
                    }
                }
            }
        }
        let catalog = builder.catalog;
        tracing::debug!(
            "Catalog built: {} tables, {} columns",
            catalog.table_count(),
            catalog.column_count()
        );
        catalog
    }

    /// Returns true when the catalog holds no tables.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Number of tables.
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Tables in build order.
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Columns in build order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Columns of one table, in build order.
    pub fn columns_of(&self, table_id: TableId) -> impl Iterator<Item = &Column> + '_ {
        self.columns.iter().filter(move |c| c.table_id == table_id)
    }

    /// Looks up a table id by exact name.
    pub fn table_id(&self, name: &str) -> Option<TableId> {
        self.table_name_to_id.get(name).copied()
    }

    /// Looks up a table name by id.
    pub fn table_name(&self, id: TableId) -> Option<&str> {
        self.table_id_to_name.get(&id).map(String::as_str)
    }

    /// Looks up a column label by id.
    pub fn column_label(&self, id: ColumnId) -> Option<&str> {
        self.column_id_to_label.get(&id).map(String::as_str)
    }

    /// Looks up a column id by `table.column` name.
    pub fn qualified_column_id(&self, qualified: &str) -> Option<ColumnId> {
        self.qualified_to_column_id.get(qualified).copied()
    }

    /// Qualified references in build order as `(table, label, table id, column id)`.
    pub fn qualified_columns(&self) -> impl Iterator<Item = (&str, &str, TableId, ColumnId)> + '_ {
        self.columns.iter().filter_map(move |column| {
            let table = self.table_name(column.table_id)?;
            let key = qualified_key(table, &column.label);
            // duplicate labels inside a table keep the first column only
            (self.qualified_column_id(&key) == Some(column.id))
                .then_some((table, column.label.as_str(), column.table_id, column.id))
        })
    }

    /// Bare column labels mapped to the column of the first table (in build
    /// order) that declares them.
    ///
    /// Labels shared by several tables therefore always resolve to the
    /// earliest table, whatever the SQL around them says.
    pub fn first_column_by_label(&self) -> Vec<(&str, ColumnId)> {
        let mut seen = HashSet::new();
        let mut labels = Vec::new();
        for column in &self.columns {
            if seen.insert(column.label.as_str()) {
                labels.push((column.label.as_str(), column.id));
            }
        }
        labels
    }
}

impl MetadataPayload {
    fn deserialize_value(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }
}

/// Formats a `table.column` key.
pub fn qualified_key(table: &str, column: &str) -> String {
    format!("{}.{}", table, column)
}

#[derive(Default)]
struct CatalogBuilder {
    catalog: Catalog,
}

impl CatalogBuilder {
    /// Registers a table; duplicates keep the first entry.
    fn add_table(&mut self, id: TableId, name: &str) -> bool {
        let catalog = &mut self.catalog;
        if catalog.table_id_to_name.contains_key(&id) {
            tracing::warn!("Duplicate table id {} ('{}') ignored", id, name);
            return false;
        }
        if catalog.table_name_to_id.contains_key(name) {
            tracing::warn!("Duplicate table name '{}' (id {}) ignored", name, id);
            return false;
        }
        catalog.table_id_to_name.insert(id, name.to_string());
        catalog.table_name_to_id.insert(name.to_string(), id);
        catalog.tables.push(Table {
            id,
            name: name.to_string(),
        });
        true
    }

    fn add_column(&mut self, table_id: TableId, table_name: &str, id: ColumnId, label: String) {
        let catalog = &mut self.catalog;
        if catalog.column_id_to_label.contains_key(&id) {
            tracing::warn!(
                "Duplicate column id {} ('{}.{}') ignored",
                id,
                table_name,
                label
            );
            return;
        }
        catalog.column_id_to_label.insert(id, label.clone());
        catalog
            .qualified_to_column_id
            .entry(qualified_key(table_name, &label))
            .or_insert(id);
        catalog.columns.push(Column {
            id,
            label,
            table_id,
        });
    }
}
