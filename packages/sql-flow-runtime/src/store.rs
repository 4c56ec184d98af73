//! Persisting button lists through the host.

use std::sync::Arc;

use serde_json::{Map, Value};

use sql_flow_core::button::{Button, ButtonList, Upsert};
use sql_flow_core::config::FieldMapping;
use sql_flow_core::record::QueryRecord;

use crate::error::StoreError;
use crate::host::RecordWriter;

/// Counts of a multi-record save.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveSummary {
    pub saved: usize,
    pub failed: usize,
}

/// Writes button lists into the button field of query records.
///
/// Every write replaces the whole list. On success the record passed in is
/// updated to the written text, so consecutive calls on the same record
/// build on each other.
pub struct ButtonStore {
    writer: Arc<dyn RecordWriter>,
    table: String,
    field: String,
}

impl ButtonStore {
    pub fn new(
        writer: Arc<dyn RecordWriter>,
        table: impl Into<String>,
        mapping: &FieldMapping,
    ) -> Self {
        Self {
            writer,
            table: table.into(),
            field: mapping.button_config.clone(),
        }
    }

    /// Replaces the same-named button or appends it.
    pub async fn try_upsert(
        &self,
        record: &mut QueryRecord,
        button: &Button,
    ) -> Result<Upsert, StoreError> {
        let mut list = ButtonList::from_record(record);
        let upsert = list.upsert(button)?;
        self.write(record, &list).await?;
        tracing::info!(
            "Button '{}' {} on record {}",
            button.name,
            if upsert == Upsert::Replaced { "updated" } else { "added" },
            record.id
        );
        Ok(upsert)
    }

    /// Like [`try_upsert`](Self::try_upsert); false on any failure.
    pub async fn upsert(&self, record: &mut QueryRecord, button: &Button) -> bool {
        match self.try_upsert(record, button).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(
                    "Failed to save button '{}' on record {}: {}",
                    button.name,
                    record.id,
                    e
                );
                false
            }
        }
    }

    /// Removes buttons named exactly `name`; nothing is written when none match.
    pub async fn try_remove(
        &self,
        record: &mut QueryRecord,
        name: &str,
    ) -> Result<bool, StoreError> {
        if name.is_empty() {
            return Ok(false);
        }
        let mut list = ButtonList::from_record(record);
        if !list.remove(name) {
            tracing::debug!("No button '{}' on record {}", name, record.id);
            return Ok(false);
        }
        self.write(record, &list).await?;
        tracing::info!("Button '{}' removed from record {}", name, record.id);
        Ok(true)
    }

    /// Like [`try_remove`](Self::try_remove); false on any failure.
    pub async fn remove(&self, record: &mut QueryRecord, name: &str) -> bool {
        match self.try_remove(record, name).await {
            Ok(removed) => removed,
            Err(e) => {
                tracing::error!(
                    "Failed to remove button '{}' from record {}: {}",
                    name,
                    record.id,
                    e
                );
                false
            }
        }
    }

    /// Saves `button` into every record, continuing past failures.
    pub async fn save_everywhere<'a, I>(&self, records: I, button: &Button) -> SaveSummary
    where
        I: IntoIterator<Item = &'a mut QueryRecord>,
    {
        let mut summary = SaveSummary::default();
        for record in records {
            if self.upsert(record, button).await {
                summary.saved += 1;
            } else {
                summary.failed += 1;
            }
        }
        tracing::info!(
            "Button '{}' saved on {} records, {} failures",
            button.name,
            summary.saved,
            summary.failed
        );
        summary
    }

    async fn write(&self, record: &mut QueryRecord, list: &ButtonList) -> Result<(), StoreError> {
        let text = list.to_json()?;
        let mut fields = Map::new();
        fields.insert(self.field.clone(), Value::String(text.clone()));
        self.writer.update_record(&self.table, record.id, fields).await?;
        record.button_config = Some(text);
        Ok(())
    }
}
