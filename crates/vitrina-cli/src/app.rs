//! The Vitrina CLI application.
//!
//! Owns config loading, logging setup, and the dispatch from parsed
//! arguments to the handler functions.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use vitrina_core::Result;
use vitrina_fts::ElasticBackend;
use vitrina_vector::QdrantClient;

use crate::cli::{CliArgs, Command, SearchRoute};
use crate::config::VitrinaConfig;
use crate::config_handlers;
use crate::ingest_handlers::{self, IngestOptions};
use crate::search_handlers::{self, VectorSearchOptions};

// ============================================================================
// VitrinaApp
// ============================================================================

/// The CLI application: loaded config plus name and version for output.
pub struct VitrinaApp {
    name: String,
    config: VitrinaConfig,
    version: String,
}

impl VitrinaApp {
    /// Create from CLI args, loading config from file/env.
    pub fn from_args(name: impl Into<String>, args: &CliArgs) -> Result<Self> {
        let config = VitrinaConfig::load(args.config.as_deref())?;
        Ok(Self::new(name, config))
    }

    /// Create with an already-loaded config.
    pub fn new(name: impl Into<String>, config: VitrinaConfig) -> Self {
        Self {
            name: name.into(),
            config,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Override the version string.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// The loaded configuration.
    pub fn config(&self) -> &VitrinaConfig {
        &self.config
    }

    /// Initialise tracing-based logging.
    ///
    /// Uses `RUST_LOG` env var if set, otherwise defaults based on verbosity flags.
    pub fn init_logging(&self, verbose: bool, quiet: bool) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else if quiet {
            EnvFilter::new("warn")
        } else if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        };

        // Ignore error if a subscriber is already set (e.g. in tests).
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    }

    /// Run the CLI with the given arguments.
    pub async fn run(&self, args: CliArgs) -> Result<()> {
        self.init_logging(args.verbose, args.quiet);

        match args.command {
            Some(Command::Version) => {
                println!("{} {}", self.name, self.version);
                Ok(())
            }
            Some(Command::Health) => {
                self.config.validate()?;
                ingest_handlers::handle_health(&self.config).await
            }
            Some(Command::Ingest { features, data }) => {
                self.config.validate()?;
                let store = Arc::new(QdrantClient::from_config(&self.config.vector)?);
                let options = IngestOptions { features, data };
                ingest_handlers::handle_ingest(&self.config, store, options).await
            }
            Some(Command::Index { force, check }) => {
                self.config.validate()?;
                ingest_handlers::handle_index(&self.config, force, check).await
            }
            Some(Command::Search(search_cmd)) => self.handle_search(search_cmd.command).await,
            Some(Command::Config(config_cmd)) => {
                config_handlers::handle_config_command(args.config.as_deref(), config_cmd.command)
            }
            None => {
                println!("{} {} — use --help for usage", self.name, self.version);
                Ok(())
            }
        }
    }

    /// Dispatch search routes to handlers, wiring the backends each needs.
    async fn handle_search(&self, route: SearchRoute) -> Result<()> {
        self.config.validate()?;
        match route {
            SearchRoute::Vector {
                file,
                id,
                local,
                top_k,
            } => {
                let options = VectorSearchOptions { file, id, top_k };
                if local {
                    search_handlers::handle_local_search(&self.config, options).await
                } else {
                    let store = Arc::new(QdrantClient::from_config(&self.config.vector)?);
                    search_handlers::handle_remote_search(&self.config, store, options).await
                }
            }
            SearchRoute::Text { query, top_k } => {
                let backend = Arc::new(ElasticBackend::from_config(&self.config.text)?);
                search_handlers::handle_text_search(&self.config, backend, &query, top_k).await
            }
            SearchRoute::Complete { prefix, top_k } => {
                let backend = Arc::new(ElasticBackend::from_config(&self.config.text)?);
                search_handlers::handle_complete(&self.config, backend, &prefix, top_k).await
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
