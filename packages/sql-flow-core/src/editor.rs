//! Loading a query record into an editable, label-form document and
//! producing the field values to persist it back.

use serde_json::{Map, Value};

use crate::catalog::Catalog;
use crate::config::FieldMapping;
use crate::record::{QueryRecord, RecordId};
use crate::rewrite;

/// Query record in label form.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorDocument {
    pub record_id: RecordId,
    pub name: String,
    /// SQL with current table and column names
    pub sql: String,
    /// Decoded default destination, if the record names one
    pub destination: Option<String>,
    /// True when `sql` is the generated template rather than stored text
    pub is_placeholder: bool,
    catalog: Catalog,
}

impl EditorDocument {
    /// Builds the catalog of `record` and decodes its SQL and destination.
    pub fn load(record: &QueryRecord) -> Self {
        let catalog = record
            .metadata
            .as_ref()
            .map(Catalog::from_value)
            .unwrap_or_default();

        let destination = record
            .destination_table
            .as_deref()
            .map(|token| rewrite::decode_table_token(token, &catalog));
        if let (Some(token), Some(name)) = (&record.destination_table, &destination) {
            tracing::debug!("Default destination {} -> {}", token, name);
        }

        let is_placeholder = record.has_blank_sql();
        let sql = if is_placeholder {
            placeholder(&record.name, &catalog)
        } else {
            rewrite::to_labels(&record.sql_text, &catalog)
        };

        tracing::info!(
            "Loaded query {} ('{}') with {} tables, {} columns",
            record.id,
            record.name,
            catalog.table_count(),
            catalog.column_count()
        );

        Self {
            record_id: record.id,
            name: record.name.clone(),
            sql,
            destination,
            is_placeholder,
            catalog,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Table names offered as destinations, in metadata order.
    pub fn table_choices(&self) -> Vec<&str> {
        self.catalog.tables().iter().map(|t| t.name.as_str()).collect()
    }

    /// Field values persisting `sql` and, when given, `destination`.
    ///
    /// The destination field is only written when the mapping names one.
    pub fn save_fields(
        &self,
        sql: &str,
        destination: Option<&str>,
        mapping: &FieldMapping,
    ) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert(
            mapping.sql.clone(),
            Value::String(rewrite::to_encoded(sql, &self.catalog)),
        );

        let destination = destination.filter(|d| !d.trim().is_empty());
        if let Some(destination) = destination {
            if mapping.destination.trim().is_empty() {
                tracing::warn!("No destination field mapped, destination not saved");
            } else {
                let token = rewrite::encode_table_token(destination, &self.catalog);
                tracing::debug!("Saving destination {} -> {}", destination, token);
                fields.insert(mapping.destination.clone(), Value::String(token));
            }
        }
        fields
    }
}

fn placeholder(name: &str, catalog: &Catalog) -> String {
    let name = if name.trim().is_empty() { "Unnamed" } else { name };
    let tables = if catalog.is_empty() {
        "none in metadata".to_string()
    } else {
        catalog
            .tables()
            .iter()
            .map(|t| t.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!(
        "-- Selected query: {}\n-- Available tables: {}\nSELECT * FROM my_table LIMIT 10;",
        name, tables
    )
}
