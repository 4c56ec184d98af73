//! Command handlers.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use sql_flow_core::button::{self, ButtonList};
use sql_flow_core::catalog::Catalog;
use sql_flow_core::config::HostConfig;
use sql_flow_core::editor::EditorDocument;
use sql_flow_core::record::{QueryIndex, QueryRecord};
use sql_flow_core::rewrite;
use sql_flow_runtime::compose::compose_button;
use sql_flow_runtime::executor::{ButtonRunner, SingleOutcome, StepOutcome};
use sql_flow_runtime::host::RecordWriter;
use sql_flow_runtime::http::HostClient;
use sql_flow_runtime::store::ButtonStore;

use crate::cli::ButtonCommands;

/// Encodes or decodes SQL offline.
pub fn rewrite(metadata: &Path, sql: Option<String>, encode: bool) -> Result<()> {
    let payload = std::fs::read_to_string(metadata)
        .with_context(|| format!("Failed to read metadata file {}", metadata.display()))?;
    let catalog = Catalog::build(&payload);
    let sql = match sql {
        Some(sql) => sql,
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            text
        }
    };
    let output = if encode {
        rewrite::to_encoded(&sql, &catalog)
    } else {
        rewrite::to_labels(&sql, &catalog)
    };
    println!("{}", output);

    let leftover = rewrite::unresolved_tokens(&output);
    if !encode && !leftover.is_empty() {
        eprintln!("warning: unresolved references {}", leftover.join(", "));
    }
    Ok(())
}

/// Host connection plus the loaded query records.
pub struct Session {
    pub config: HostConfig,
    pub client: Arc<HostClient>,
    pub index: QueryIndex,
}

impl Session {
    pub async fn open(config: HostConfig) -> Result<Self> {
        let client = Arc::new(HostClient::new(&config)?);
        let rows = client
            .fetch_records(&config.queries_table)
            .await
            .with_context(|| format!("Failed to load records of {}", config.queries_table))?;
        let index = QueryIndex::from_host_records(&rows, &config.fields);
        tracing::info!("Loaded {} query records", index.len());
        Ok(Self {
            config,
            client,
            index,
        })
    }

    pub fn record(&self, name: &str) -> Result<&QueryRecord> {
        self.index
            .find_by_name(name)
            .with_context(|| format!("No query named '{}'", name))
    }

    fn store(&self) -> ButtonStore {
        ButtonStore::new(
            self.client.clone(),
            self.config.queries_table.clone(),
            &self.config.fields,
        )
    }

    pub fn list_queries(&self) {
        for name in self.index.query_names() {
            println!("{}", name);
        }
    }

    pub fn show(&self, query: &str) -> Result<()> {
        let doc = EditorDocument::load(self.record(query)?);
        println!("-- {} (record {})", doc.name, doc.record_id);
        if let Some(destination) = &doc.destination {
            println!("-- destination: {}", destination);
        }
        println!("{}", doc.sql);
        Ok(())
    }

    pub async fn save(&self, query: &str, sql: &str, destination: Option<&str>) -> Result<()> {
        let record = self.record(query)?;
        let doc = EditorDocument::load(record);
        let fields = doc.save_fields(sql, destination, &self.config.fields);
        self.client
            .update_record(&self.config.queries_table, record.id, fields)
            .await?;
        println!("Saved query '{}'", query);
        Ok(())
    }

    pub async fn execute(
        &self,
        query: &str,
        sql: Option<&str>,
        destination: Option<&str>,
    ) -> Result<()> {
        let doc = EditorDocument::load(self.record(query)?);
        let sql = match sql {
            Some(sql) => sql,
            None if doc.is_placeholder => bail!("Query '{}' has no SQL", query),
            None => doc.sql.as_str(),
        };
        let destination = destination.or(doc.destination.as_deref());

        let runner = ButtonRunner::new(self.client.clone(), self.client.clone());
        match runner.execute_single(sql, doc.catalog(), destination).await? {
            SingleOutcome::NoRows => println!("Query returned no rows, nothing written"),
            SingleOutcome::Written { table, rows } => println!("Wrote {} rows to {}", rows, table),
        }
        Ok(())
    }

    pub async fn run(&self, query: &str, name: &str) -> Result<()> {
        let record = self.record(query)?;
        let button = button::read_all(record)
            .into_iter()
            .find(|b| b.name == name)
            .with_context(|| format!("No button '{}' on query '{}'", name, query))?;

        let runner = ButtonRunner::new(self.client.clone(), self.client.clone());
        let report = runner.execute(&button, &self.index).await?;
        for step in &report.steps {
            match &step.outcome {
                StepOutcome::Skipped => println!("{}: skipped (no SQL)", step.record_id),
                StepOutcome::Executed { rows, written_to: Some(table) } => {
                    println!("{}: {} rows -> {}", step.record_id, rows, table)
                }
                StepOutcome::Executed { rows, written_to: None } => {
                    println!("{}: {} rows", step.record_id, rows)
                }
            }
        }
        println!("Button '{}' completed", button.name);
        Ok(())
    }

    pub async fn buttons(&self, command: ButtonCommands) -> Result<()> {
        match command {
            ButtonCommands::List { query } => {
                let known = self.index.known_ids();
                let list = ButtonList::from_record(self.record(&query)?);
                for button in list.buttons() {
                    let check = button::validate(&button, &known);
                    let status = if check.is_valid {
                        "ok".to_string()
                    } else {
                        format!("missing {:?}", check.missing_ids)
                    };
                    println!(
                        "{} {:?} [{}] {}",
                        button.name,
                        button.sequence,
                        button.color(),
                        status
                    );
                }
            }
            ButtonCommands::Compose { name, queries, on } => {
                let composition = compose_button(&name, &queries, &self.index)?;
                if !composition.missing.is_empty() {
                    eprintln!("warning: unknown queries {}", composition.missing.join(", "));
                }
                let store = self.store();
                match on {
                    Some(query) => {
                        let mut record = self.record(&query)?.clone();
                        store.try_upsert(&mut record, &composition.button).await?;
                        println!("Saved '{}' on '{}'", composition.button.name, query);
                    }
                    None => {
                        let mut records: Vec<QueryRecord> = self.index.iter().cloned().collect();
                        let summary = store
                            .save_everywhere(records.iter_mut(), &composition.button)
                            .await;
                        println!(
                            "Saved '{}' on {} records ({} failed)",
                            composition.button.name, summary.saved, summary.failed
                        );
                        if summary.saved == 0 {
                            bail!("Button was not saved on any record");
                        }
                    }
                }
            }
            ButtonCommands::Clean { query, button: name } => {
                let mut record = self.record(&query)?.clone();
                let stored = button::read_all(&record)
                    .into_iter()
                    .find(|b| b.name == name)
                    .with_context(|| format!("No button '{}' on query '{}'", name, query))?;
                let cleaned = button::clean(&stored, &self.index.known_ids());
                if cleaned.sequence.len() == stored.sequence.len() {
                    println!("Button '{}' has no stale references", name);
                    return Ok(());
                }
                self.store().try_upsert(&mut record, &cleaned).await?;
                println!("Button '{}' now runs {:?}", name, cleaned.sequence);
            }
            ButtonCommands::Remove { query, button: name } => {
                let mut record = self.record(&query)?.clone();
                if self.store().try_remove(&mut record, &name).await? {
                    println!("Removed '{}' from '{}'", name, query);
                } else {
                    bail!("No button '{}' on query '{}'", name, query);
                }
            }
        }
        Ok(())
    }
}
