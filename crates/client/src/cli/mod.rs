//! CLI command definitions.

use clap::{Parser, Subcommand, ValueEnum};
use didit_core::entry::EntryId;

/// CLI client for the didit entry service.
#[derive(Debug, Parser)]
#[command(name = "didit-client")]
#[command(about = "Track what you did, one entry at a time", long_about = None)]
pub struct Cli {
    /// API base URL. Overrides DIDIT_API_URL.
    #[arg(long)]
    pub base_url: Option<String>,

    /// Request timeout in seconds. Overrides DIDIT_REQUEST_TIMEOUT_SECS.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Name to log in as.
    #[arg(long, short, env = "DIDIT_USER")]
    pub user: Option<String>,

    /// Output format.
    #[arg(long, default_value = "pretty")]
    pub format: OutputFormat,

    /// Suppress non-essential output.
    #[arg(long)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Raw JSON output.
    Json,
    /// Human-readable output.
    #[default]
    Pretty,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List your entries.
    List,
    /// Record a new entry ("I did it!").
    Add,
    /// Delete one of your entries.
    Delete {
        /// Entry ID.
        id: EntryId,
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },
}
