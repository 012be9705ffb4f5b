//! Vitrina Core: shared error types and instrumentation.
//!
//! This crate provides the foundational types used across all Vitrina
//! crates. It has no internal Vitrina dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`timing`]: Explicit operation stopwatches

pub mod error;
pub mod timing;

// Re-export key types at crate root for convenience
pub use error::{Error, Result};
pub use timing::OpTimer;
