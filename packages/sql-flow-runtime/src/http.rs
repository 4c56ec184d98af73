//! HTTP client for the spreadsheet host's document API.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use sql_flow_core::config::HostConfig;
use sql_flow_core::record::{HostRecord, RecordId};

use crate::error::{HostError, HostResult};
use crate::host::{
    AccessTokenProvider, BulkColumns, QueryEndpoint, RecordWriter, SqlResponse, StaticToken,
    TableWriter, UserAction,
};

#[derive(Deserialize)]
struct TableList {
    tables: Vec<TableEntry>,
}

#[derive(Deserialize)]
struct TableEntry {
    id: String,
}

#[derive(Deserialize)]
struct RecordList {
    records: Vec<HostRecord>,
}

/// Document API client.
pub struct HostClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn AccessTokenProvider>,
}

impl HostClient {
    /// Creates a client using the configured static token.
    pub fn new(config: &HostConfig) -> HostResult<Self> {
        let token = StaticToken::new(config.token.clone().unwrap_or_default());
        Self::with_token_provider(config, Arc::new(token))
    }

    /// Creates a client with a custom token source.
    pub fn with_token_provider(
        config: &HostConfig,
        tokens: Arc<dyn AccessTokenProvider>,
    ) -> HostResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Ids of every table in the document.
    pub async fn list_tables(&self) -> HostResult<Vec<String>> {
        let token = self.tokens.token().await?;
        let response = self
            .http
            .get(format!("{}/tables", self.base_url))
            .query(&[("auth", token.as_str())])
            .send()
            .await?;
        let list: TableList = decode(response).await?;
        Ok(list.tables.into_iter().map(|t| t.id).collect())
    }

    /// All rows of `table`.
    pub async fn fetch_records(&self, table: &str) -> HostResult<Vec<HostRecord>> {
        let token = self.tokens.token().await?;
        let url = self.table_url(table, "records")?;
        let response = self
            .http
            .get(url)
            .query(&[("auth", token.as_str())])
            .send()
            .await?;
        let list: RecordList = decode(response).await?;
        tracing::debug!("Fetched {} records from {}", list.records.len(), table);
        Ok(list.records)
    }

    /// Applies document actions in one request.
    pub async fn apply(&self, actions: &[UserAction]) -> HostResult<()> {
        let token = self.tokens.token().await?;
        let body: Vec<Value> = actions.iter().map(UserAction::to_json).collect();
        let response = self
            .http
            .post(format!("{}/apply", self.base_url))
            .query(&[("auth", token.as_str())])
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HostError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    /// `{base}/tables/{table}/{leaf}` with `table` escaped as one path segment.
    fn table_url(&self, table: &str, leaf: &str) -> HostResult<reqwest::Url> {
        let invalid = || HostError::Transport(format!("invalid base URL {}", self.base_url));
        let mut url = reqwest::Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(["tables", table, leaf]);
        Ok(url)
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> HostResult<T> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(HostError::Status {
            status: status.as_u16(),
            body,
        });
    }
    serde_json::from_str(&body).map_err(|e| HostError::Decode(e.to_string()))
}

#[async_trait]
impl QueryEndpoint for HostClient {
    async fn run_sql(&self, sql: &str) -> HostResult<SqlResponse> {
        let token = self.tokens.token().await?;
        tracing::debug!("Submitting SQL: {}", sql);
        let response = self
            .http
            .get(format!("{}/sql", self.base_url))
            .query(&[("q", sql), ("auth", token.as_str())])
            .header("X-Requested-With", "XMLHttpRequest")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        match serde_json::from_str::<SqlResponse>(&body) {
            Ok(parsed) if status.is_success() || parsed.error.is_some() => Ok(parsed),
            Ok(_) => Err(HostError::Status {
                status: status.as_u16(),
                body,
            }),
            Err(_) if !status.is_success() => Err(HostError::Status {
                status: status.as_u16(),
                body,
            }),
            Err(e) => Err(HostError::Decode(e.to_string())),
        }
    }
}

#[async_trait]
impl TableWriter for HostClient {
    async fn replace_table_data(&self, table: &str, data: BulkColumns) -> HostResult<()> {
        let rows = data.row_count();
        self.apply(&[UserAction::ReplaceTableData {
            table: table.to_string(),
            data,
        }])
        .await?;
        tracing::info!("Replaced content of {} with {} rows", table, rows);
        Ok(())
    }
}

#[async_trait]
impl RecordWriter for HostClient {
    async fn update_record(
        &self,
        table: &str,
        id: RecordId,
        fields: Map<String, Value>,
    ) -> HostResult<()> {
        self.apply(&[UserAction::UpdateRecord {
            table: table.to_string(),
            id,
            fields,
        }])
        .await
    }
}
