//! CLI argument parsing and command definitions.
//!
//! One binary, six commands: `ingest`, `index`, `search`, `health`,
//! `config`, and `version`, plus the shared configuration and verbosity
//! flags.

use clap::{Parser, Subcommand};

// ============================================================================
// CLI argument types
// ============================================================================

/// Top-level CLI arguments.
#[derive(Parser, Debug)]
#[command(author, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file.
    #[arg(short, long, env = "VITRINA_CONFIG")]
    pub config: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-essential output.
    #[arg(short, long)]
    pub quiet: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ingest the catalog into the remote vector collection.
    Ingest {
        /// Override the features file path from the config.
        #[arg(long)]
        features: Option<String>,

        /// Override the metadata table path from the config.
        #[arg(long)]
        data: Option<String>,
    },

    /// Build or inspect the local flat index.
    Index {
        /// Rebuild even when an index file is already present.
        #[arg(short, long)]
        force: bool,

        /// Report whether the index file exists without building.
        #[arg(long)]
        check: bool,
    },

    /// Search the catalog.
    Search(SearchCommand),

    /// Check the health of the configured backends.
    Health,

    /// Print version information.
    Version,

    /// Configuration operations.
    Config(ConfigCommand),
}

/// Search subcommand wrapper.
#[derive(Parser, Debug)]
pub struct SearchCommand {
    /// Search route to use.
    #[command(subcommand)]
    pub command: SearchRoute,
}

/// Available search routes.
#[derive(Subcommand, Debug)]
pub enum SearchRoute {
    /// Nearest neighbors of an embedding vector.
    Vector {
        /// JSON file holding the query vector as an array of numbers.
        #[arg(short, long)]
        file: Option<String>,

        /// Catalog row id whose stored vector becomes the query.
        #[arg(long)]
        id: Option<u64>,

        /// Query the local flat index instead of the remote collection.
        #[arg(long)]
        local: bool,

        /// Number of results.
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Full-text search on item names.
    Text {
        /// Query text.
        query: String,

        /// Number of results.
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Autocomplete item names by prefix.
    Complete {
        /// Name prefix typed so far.
        prefix: String,

        /// Number of results.
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },
}

/// Config-specific subcommand wrapper.
#[derive(Parser, Debug)]
pub struct ConfigCommand {
    /// Config subcommand to execute.
    #[command(subcommand)]
    pub command: ConfigAction,
}

/// Available config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path.
    Path,

    /// Get a configuration value by dotted key.
    Get {
        /// Dotted key (e.g., "vector.collection").
        key: String,
    },

    /// Set a configuration value by dotted key.
    Set {
        /// Dotted key (e.g., "vector.collection").
        key: String,

        /// Value to set.
        value: String,
    },

    /// Create a default configuration file.
    Init {
        /// Output file path (defaults to the platform config path).
        #[arg(short, long)]
        file: Option<String>,

        /// Overwrite existing file.
        #[arg(long)]
        force: bool,
    },

    /// Export configuration as environment variables.
    Export {
        /// Format as Docker --env flags.
        #[arg(long)]
        docker_env: bool,
    },
}

// ============================================================================
// Tests
// ============================================================================
