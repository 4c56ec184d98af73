//! Host field mapping and connection configuration.

use serde::{Deserialize, Serialize};

use crate::error::{FlowError, Result};

/// Names of the host columns backing each logical query-record field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldMapping {
    /// Column holding the SQL text (encoded form at rest)
    pub sql: String,
    /// Column holding the table/column metadata payload
    pub metadata: String,
    /// Column holding the query display name
    pub name: String,
    /// Column holding the JSON array of buttons
    pub button_config: String,
    /// Column holding the encoded default destination table
    pub destination: String,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            sql: "sqlField".to_string(),
            metadata: "pythonfield".to_string(),
            name: "RequestName".to_string(),
            button_config: "buttonconfig".to_string(),
            destination: "destinationTable".to_string(),
        }
    }
}

impl FieldMapping {
    /// Checks that the mapping is usable.
    ///
    /// The SQL and metadata fields must be distinct columns: saving SQL
    /// into the metadata column would destroy the catalog source.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("sql", &self.sql),
            ("metadata", &self.metadata),
            ("name", &self.name),
        ];
        for (label, value) in required {
            if value.trim().is_empty() {
                return Err(FlowError::EmptyMapping(label));
            }
        }
        if self.sql == self.metadata {
            return Err(FlowError::FieldCollision {
                first: "sql",
                second: "metadata",
                column: self.sql.clone(),
            });
        }
        Ok(())
    }
}

/// Connection settings for the spreadsheet host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HostConfig {
    /// Document API base URL (e.g. `https://host/api/docs/<doc>`)
    pub base_url: String,
    /// Access token appended as `auth=`
    pub token: Option<String>,
    /// Table holding the query records
    pub queries_table: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Column mapping for query records
    pub fields: FieldMapping,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8484/api/docs/default".to_string(),
            token: None,
            queries_table: "Requests".to_string(),
            request_timeout_ms: 5000, // 5 seconds default
            fields: FieldMapping::default(),
        }
    }
}

impl HostConfig {
    /// Parses a JSON configuration document; absent keys keep their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: HostConfig = serde_json::from_str(text)?;
        config.fields.validate()?;
        Ok(config)
    }
}
