//! Sequential execution of button sequences.
//!
//! A runner moves through `Idle -> Running -> Succeeded | Failed`. Steps run
//! strictly one after another: step n+1 is only started once the table
//! write of step n has completed. The first fatal error stops the sequence;
//! writes already made by earlier steps stay in place.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use sql_flow_core::button::Button;
use sql_flow_core::catalog::Catalog;
use sql_flow_core::record::{QueryRecord, RecordId, RecordSource};
use sql_flow_core::rewrite;

use crate::error::{ExecError, Result};
use crate::host::{BulkColumns, QueryEndpoint, TableWriter};

/// Lifecycle of a runner.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExecutionState {
    #[default]
    Idle,
    Running,
    Succeeded,
    Failed(String),
}

/// What happened to one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Record has no SQL
    Skipped,
    /// Query ran; `written_to` is set when a destination received the rows
    Executed {
        rows: usize,
        written_to: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub record_id: RecordId,
    pub outcome: StepOutcome,
}

/// Outcomes of a completed sequence, in step order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    pub steps: Vec<StepReport>,
}

impl ExecutionReport {
    pub fn executed(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s.outcome, StepOutcome::Executed { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.outcome == StepOutcome::Skipped)
            .count()
    }
}

/// Result of a single editor query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SingleOutcome {
    /// Query returned nothing; the destination was left alone
    NoRows,
    Written { table: String, rows: usize },
}

/// Clears the running latch when an execution ends, however it ends.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Executes buttons against a query endpoint and a table writer.
pub struct ButtonRunner {
    endpoint: Arc<dyn QueryEndpoint>,
    writer: Arc<dyn TableWriter>,
    running: AtomicBool,
    state: Mutex<ExecutionState>,
}

impl ButtonRunner {
    pub fn new(endpoint: Arc<dyn QueryEndpoint>, writer: Arc<dyn TableWriter>) -> Self {
        Self {
            endpoint,
            writer,
            running: AtomicBool::new(false),
            state: Mutex::new(ExecutionState::Idle),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> ExecutionState {
        self.state.lock().clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Runs every step of `button` in order.
    ///
    /// Rejected without any state change when the sequence is empty or
    /// another execution is in progress on this runner.
    pub async fn execute<R>(&self, button: &Button, records: &R) -> Result<ExecutionReport>
    where
        R: RecordSource + ?Sized,
    {
        if button.sequence.is_empty() {
            tracing::warn!("Button '{}' has no steps", button.name);
            return Err(ExecError::EmptySequence(button.name.clone()));
        }
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!("Execution of '{}' rejected: runner busy", button.name);
            return Err(ExecError::AlreadyRunning);
        }
        let _guard = RunningGuard(&self.running);
        self.set_state(ExecutionState::Running);

        tracing::info!(
            "Executing button '{}' ({} steps)",
            button.name,
            button.sequence.len()
        );

        let mut report = ExecutionReport::default();
        for (index, &id) in button.sequence.iter().enumerate() {
            tracing::info!("Step {}/{}: query {}", index + 1, button.sequence.len(), id);
            match self.run_step(id, button, records).await {
                Ok(outcome) => report.steps.push(StepReport {
                    record_id: id,
                    outcome,
                }),
                Err(e) => {
                    tracing::error!("Step {} (query {}) failed: {}", index + 1, id, e);
                    self.set_state(ExecutionState::Failed(e.to_string()));
                    return Err(e);
                }
            }
        }

        tracing::info!(
            "Button '{}' done: {} executed, {} skipped",
            button.name,
            report.executed(),
            report.skipped()
        );
        self.set_state(ExecutionState::Succeeded);
        Ok(report)
    }

    async fn run_step<R>(&self, id: RecordId, button: &Button, records: &R) -> Result<StepOutcome>
    where
        R: RecordSource + ?Sized,
    {
        let record = records.get(id).ok_or(ExecError::RecordNotFound(id))?;
        if record.has_blank_sql() {
            tracing::info!("Query {} has no SQL, skipping", id);
            return Ok(StepOutcome::Skipped);
        }

        let catalog = catalog_of(record);
        let sql = rewrite::resolve_for_execution(&record.sql_text, &catalog);
        let response = self.endpoint.run_sql(&sql).await?;
        if let Some(message) = response.error {
            return Err(ExecError::Query {
                record_id: Some(id),
                message,
            });
        }

        let rows = response.records.len();
        let destination = non_blank(record.destination_table.as_deref())
            .or_else(|| non_blank(button.destination_table.as_deref()));
        let written_to = match destination {
            Some(token) if rows > 0 => {
                let table = rewrite::decode_table_token(token, &catalog);
                self.writer
                    .replace_table_data(&table, BulkColumns::from_rows(&response.records))
                    .await?;
                Some(table)
            }
            Some(_) => {
                tracing::info!("Query {} returned no rows, destination left as is", id);
                None
            }
            None => {
                tracing::debug!("Query {} has no destination", id);
                None
            }
        };
        Ok(StepOutcome::Executed { rows, written_to })
    }

    /// Runs one label-form query and replaces `destination` with its rows.
    ///
    /// Does not touch the runner state.
    pub async fn execute_single(
        &self,
        sql: &str,
        catalog: &Catalog,
        destination: Option<&str>,
    ) -> Result<SingleOutcome> {
        if sql.trim().is_empty() {
            return Err(ExecError::BlankSql);
        }
        let destination = non_blank(destination).ok_or(ExecError::MissingDestination)?;
        let table = rewrite::decode_table_token(destination, catalog);

        let sql = rewrite::resolve_for_execution(sql, catalog);
        let response = self.endpoint.run_sql(&sql).await?;
        if let Some(message) = response.error {
            return Err(ExecError::Query {
                record_id: None,
                message,
            });
        }
        if response.records.is_empty() {
            tracing::info!("Query returned no rows, {} left as is", table);
            return Ok(SingleOutcome::NoRows);
        }

        let rows = response.records.len();
        self.writer
            .replace_table_data(&table, BulkColumns::from_rows(&response.records))
            .await?;
        Ok(SingleOutcome::Written { table, rows })
    }

    fn set_state(&self, state: ExecutionState) {
        *self.state.lock() = state;
    }
}

fn catalog_of(record: &QueryRecord) -> Catalog {
    record
        .metadata
        .as_ref()
        .map(Catalog::from_value)
        .unwrap_or_default()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
