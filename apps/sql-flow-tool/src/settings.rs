//! Host configuration: JSON file first, then command-line overrides.

use std::path::Path;

use anyhow::{Context, Result};
use sql_flow_core::config::HostConfig;

use crate::cli::HostArgs;

/// Resolves the effective configuration.
pub fn load(args: &HostArgs) -> Result<HostConfig> {
    let mut config = match &args.config {
        Some(path) => read_file(path)?,
        None => HostConfig::default(),
    };
    if let Some(base_url) = &args.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(token) = &args.token {
        config.token = Some(token.clone());
    }
    if let Some(table) = &args.queries_table {
        config.queries_table = table.clone();
    }
    if let Some(timeout) = args.request_timeout_ms {
        config.request_timeout_ms = timeout;
    }
    config.fields.validate()?;
    Ok(config)
}

fn read_file(path: &Path) -> Result<HostConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config = HostConfig::from_json(&text)
        .with_context(|| format!("Invalid config file {}", path.display()))?;
    tracing::debug!("Loaded configuration from {}", path.display());
    Ok(config)
}
