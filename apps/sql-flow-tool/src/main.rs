//! Command-line front end.
//!
//! Offline rewriting of SQL against a metadata file, and host-backed
//! commands to edit stored queries, manage buttons and run them.

mod cli;
mod commands;
mod settings;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, HostArgs};
use commands::Session;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Encode { metadata, sql } => commands::rewrite(&metadata, sql, true),
        Commands::Decode { metadata, sql } => commands::rewrite(&metadata, sql, false),
        command => run_online(&cli.host, command).await,
    }
}

async fn run_online(host: &HostArgs, command: Commands) -> Result<()> {
    let config = settings::load(host)?;
    let session = Session::open(config).await?;

    match command {
        Commands::Queries => session.list_queries(),
        Commands::Show { query } => session.show(&query)?,
        Commands::Save {
            query,
            sql,
            destination,
        } => session.save(&query, &sql, destination.as_deref()).await?,
        Commands::Execute {
            query,
            sql,
            destination,
        } => {
            session
                .execute(&query, sql.as_deref(), destination.as_deref())
                .await?
        }
        Commands::Buttons(command) => session.buttons(command).await?,
        Commands::Run { query, button } => session.run(&query, &button).await?,
        Commands::Encode { metadata, sql } => commands::rewrite(&metadata, sql, true)?,
        Commands::Decode { metadata, sql } => commands::rewrite(&metadata, sql, false)?,
    }
    Ok(())
}
