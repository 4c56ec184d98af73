use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub host: HostArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Connection options; flags override the configuration file.
#[derive(Args, Debug, Default)]
pub struct HostArgs {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Document API base URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Access token
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Table holding the query records
    #[arg(long, global = true)]
    pub queries_table: Option<String>,

    /// Request timeout in milliseconds
    #[arg(long, global = true)]
    pub request_timeout_ms: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rewrite label-form SQL into encoded form using a metadata file
    Encode {
        /// Metadata payload file
        #[arg(short, long)]
        metadata: PathBuf,

        /// SQL text (read from stdin when absent)
        #[arg(short, long)]
        sql: Option<String>,
    },

    /// Rewrite encoded SQL back into label form using a metadata file
    Decode {
        /// Metadata payload file
        #[arg(short, long)]
        metadata: PathBuf,

        /// SQL text (read from stdin when absent)
        #[arg(short, long)]
        sql: Option<String>,
    },

    /// List the names of stored queries
    Queries,

    /// Show a stored query in label form
    Show {
        /// Query name
        #[arg(short, long)]
        query: String,
    },

    /// Save label-form SQL (and a destination) into a stored query
    Save {
        /// Query name
        #[arg(short, long)]
        query: String,

        /// SQL text with current table and column names
        #[arg(short, long)]
        sql: String,

        /// Default destination table name
        #[arg(short, long)]
        destination: Option<String>,
    },

    /// Run label-form SQL against the catalog of a stored query and
    /// replace the destination table with the result
    Execute {
        /// Query whose metadata resolves the SQL
        #[arg(short, long)]
        query: String,

        /// SQL text (defaults to the stored query)
        #[arg(short, long)]
        sql: Option<String>,

        /// Destination table name (defaults to the stored destination)
        #[arg(short, long)]
        destination: Option<String>,
    },

    /// Manage buttons stored on query records
    #[command(subcommand)]
    Buttons(ButtonCommands),

    /// Execute a button's sequence
    Run {
        /// Query record holding the button
        #[arg(short, long)]
        query: String,

        /// Button name
        #[arg(short, long)]
        button: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ButtonCommands {
    /// List buttons of a query record with their validation status
    List {
        #[arg(short, long)]
        query: String,
    },

    /// Build a button from query names and save it
    Compose {
        /// Button name
        #[arg(short, long)]
        name: String,

        /// Query names in execution order (comma-separated)
        #[arg(long, value_delimiter = ',', required = true)]
        queries: Vec<String>,

        /// Save on this record only instead of every record
        #[arg(long)]
        on: Option<String>,
    },

    /// Drop ids with no record from a button and save it
    Clean {
        #[arg(short, long)]
        query: String,

        #[arg(short, long)]
        button: String,
    },

    /// Remove a button from a query record
    Remove {
        #[arg(short, long)]
        query: String,

        #[arg(short, long)]
        button: String,
    },
}
