//! Buttons: named, ordered sequences of stored-query ids.
//!
//! A record stores every button as one JSON array in a single text field.
//! The list is always rewritten whole; entries this crate cannot decode
//! are carried through untouched so a write never drops them.

mod color;
mod validation;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use color::{color_for_name, BUTTON_PALETTE, DEFAULT_BUTTON_COLOR};
pub use validation::{clean, validate, Validation};

use crate::error::{FlowError, Result};
use crate::record::{QueryRecord, RecordId};

/// Named sequence of query-record ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Button {
    /// Unique key within a record's button list
    pub name: String,
    /// Execution order; duplicates run again
    pub sequence: Vec<RecordId>,
    /// Display color
    #[serde(
        rename = "rgba",
        alias = "colorTag",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub color_tag: Option<String>,
    /// Destination for steps whose record names none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_table: Option<String>,
}

impl Button {
    /// Creates an uncolored button.
    pub fn new(name: impl Into<String>, sequence: Vec<RecordId>) -> Self {
        Self {
            name: name.into(),
            sequence,
            color_tag: None,
            destination_table: None,
        }
    }

    /// Creates a button colored from its name.
    pub fn with_palette_color(name: impl Into<String>, sequence: Vec<RecordId>) -> Self {
        let name = name.into();
        let color = color_for_name(&name).to_string();
        Self {
            color_tag: Some(color),
            ..Self::new(name, sequence)
        }
    }

    /// Display color, falling back to [`DEFAULT_BUTTON_COLOR`].
    pub fn color(&self) -> &str {
        self.color_tag.as_deref().unwrap_or(DEFAULT_BUTTON_COLOR)
    }

    /// Rejects buttons that must never be persisted.
    pub fn check(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(FlowError::InvalidButton("name is empty".to_string()));
        }
        Ok(())
    }
}

/// Whether an upsert replaced an existing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Replaced,
}

/// Raw button list of one record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ButtonList {
    entries: Vec<Value>,
}

impl ButtonList {
    /// Parses the field text leniently.
    ///
    /// Missing or blank text, malformed JSON and JSON other than an array
    /// all give an empty list.
    pub fn parse(text: Option<&str>) -> Self {
        let Some(text) = text.filter(|t| !t.trim().is_empty()) else {
            tracing::debug!("No button configuration found");
            return Self::default();
        };
        match serde_json::from_str::<Value>(text) {
            Ok(Value::Array(entries)) => {
                tracing::debug!("{} buttons found in configuration", entries.len());
                Self { entries }
            }
            Ok(_) => {
                tracing::warn!("Button configuration is not an array, ignoring it");
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to parse button configuration: {}", e);
                Self::default()
            }
        }
    }

    /// Parses the list stored on a record.
    pub fn from_record(record: &QueryRecord) -> Self {
        Self::parse(record.button_config.as_deref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Decodable buttons, in stored order.
    pub fn buttons(&self) -> Vec<Button> {
        self.entries
            .iter()
            .filter_map(|entry| match Button::deserialize(entry) {
                Ok(button) => Some(button),
                Err(e) => {
                    tracing::warn!("Skipping undecodable button entry: {}", e);
                    None
                }
            })
            .collect()
    }

    /// Replaces the entry with exactly the same name, or appends.
    pub fn upsert(&mut self, button: &Button) -> Result<Upsert> {
        button.check()?;
        let value = serde_json::to_value(button)?;
        match self.position(&button.name) {
            Some(index) => {
                self.entries[index] = value;
                tracing::debug!("Button '{}' replaced", button.name);
                Ok(Upsert::Replaced)
            }
            None => {
                self.entries.push(value);
                tracing::debug!("Button '{}' added", button.name);
                Ok(Upsert::Inserted)
            }
        }
    }

    /// Drops every entry named exactly `name`; false when none matched.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry_name(entry) != Some(name));
        before != self.entries.len()
    }

    /// Serializes the whole list for the record field.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.entries)?)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry_name(entry) == Some(name))
    }
}

fn entry_name(entry: &Value) -> Option<&str> {
    entry.get("name").and_then(Value::as_str)
}

/// Buttons stored on a record; never fails.
pub fn read_all(record: &QueryRecord) -> Vec<Button> {
    ButtonList::from_record(record).buttons()
}
