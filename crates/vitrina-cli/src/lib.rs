//! Command-line interface for Vitrina.
//!
//! Argument parsing, layered configuration, and the handlers behind each
//! subcommand. The binary in `main.rs` is a thin wrapper over
//! [`app::VitrinaApp`]; everything it does is reachable from this library
//! for tests.
//!
//! # Modules
//!
//! - [`cli`]: clap argument types
//! - [`config`]: `VitrinaConfig`, file + env layering
//! - [`app`]: dispatch from parsed args to handlers
//! - [`ingest_handlers`]: ingest, index, and health commands
//! - [`search_handlers`]: search and autocomplete commands
//! - [`config_handlers`]: config inspection and editing commands

pub mod app;
pub mod cli;
pub mod config;
pub mod config_handlers;
pub mod ingest_handlers;
pub mod search_handlers;

// Re-export key types at crate root for convenience
pub use app::VitrinaApp;
pub use cli::{CliArgs, Command};
pub use config::VitrinaConfig;
