//! Error types for Vitrina operations.
//!
//! This module provides the common `Error` type and `Result<T>` alias used
//! across all Vitrina crates. Uses `thiserror` for derive macros.
//!
//! The taxonomy follows the lifecycle of the system: load-time failures
//! (`Load`, `InvalidRecord`), ingestion-time failures (`SchemaMismatch`,
//! `Persist`, `Ingest`), query-time failures (`Search`, `Timeout`,
//! `Cancelled`), and the ambient `Io`/`Config`/`Serialization` cases.
//! `Ingest` and `Search` are wrapper variants: they carry the operation
//! context (batch index, backend name) around an underlying cause.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in Vitrina operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error, annotated with the path that produced it.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path being read or written when the error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Input files could not be loaded: missing, unreadable, or mutually
    /// inconsistent (for example a row-count mismatch between the feature
    /// matrix and the catalog table).
    #[error("load error: {0}")]
    Load(String),

    /// A catalog row failed validation and must not be ingested.
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// An existing remote collection is incompatible with the requested
    /// dimension or distance metric.
    #[error("collection schema mismatch: {0}")]
    SchemaMismatch(String),

    /// The local index could not be written durably.
    #[error("persist error: {0}")]
    Persist(String),

    /// One ingestion batch failed. Sibling batches are unaffected; the
    /// batch index identifies which slice of rows to retry.
    #[error("ingest failed for batch {batch}: {source}")]
    Ingest {
        /// Zero-based index of the failed batch.
        batch: usize,
        /// Underlying cause.
        #[source]
        source: Box<Error>,
    },

    /// A query-time backend call failed.
    #[error("search failed on {backend} backend: {source}")]
    Search {
        /// Which backend failed ("vector", "local", "text").
        backend: String,
        /// Underlying cause.
        #[source]
        source: Box<Error>,
    },

    /// The operation was cancelled by the caller's deadline before a
    /// result was produced.
    #[error("operation cancelled: {0}")]
    Cancelled(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport-level backend failure (HTTP status, connection refused,
    /// malformed response). `retryable` records whether the failure class
    /// is transient (HTTP 429/5xx, connection errors).
    #[error("backend error: {message}")]
    Backend {
        /// Human-readable description including any status code.
        message: String,
        /// Whether retrying the same call could reasonably succeed.
        retryable: bool,
    },

    /// A backend call exceeded its configured timeout.
    #[error("timeout: {0}")]
    Timeout(String),

    /// Serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Create an I/O error annotated with its path.
    pub fn io_with_path(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a load error.
    pub fn load(msg: impl Into<String>) -> Self {
        Self::Load(msg.into())
    }

    /// Create an invalid-record error.
    pub fn invalid_record(msg: impl Into<String>) -> Self {
        Self::InvalidRecord(msg.into())
    }

    /// Create a schema-mismatch error.
    pub fn schema_mismatch(msg: impl Into<String>) -> Self {
        Self::SchemaMismatch(msg.into())
    }

    /// Create a persist error.
    pub fn persist(msg: impl Into<String>) -> Self {
        Self::Persist(msg.into())
    }

    /// Wrap a cause with the index of the batch it failed.
    pub fn ingest(batch: usize, source: Error) -> Self {
        Self::Ingest {
            batch,
            source: Box::new(source),
        }
    }

    /// Wrap a cause with the name of the backend it failed on.
    pub fn search(backend: impl Into<String>, source: Error) -> Self {
        Self::Search {
            backend: backend.into(),
            source: Box::new(source),
        }
    }

    /// Create a cancellation error.
    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a permanent backend error (client-side fault, HTTP 4xx).
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend {
            message: msg.into(),
            retryable: false,
        }
    }

    /// Create a transient backend error (HTTP 429/5xx, connection loss).
    pub fn backend_transient(msg: impl Into<String>) -> Self {
        Self::Backend {
            message: msg.into(),
            retryable: true,
        }
    }

    /// Create a timeout error.
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Whether retrying the same operation could reasonably succeed.
    ///
    /// Timeouts and transient transport failures are retryable; schema,
    /// validation, and configuration failures are not. Wrapper variants
    /// defer to their cause.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::Backend { retryable, .. } => *retryable,
            Self::Ingest { source, .. } | Self::Search { source, .. } => source.is_retryable(),
            _ => false,
        }
    }

    /// The failed batch index, when this error came from one ingestion
    /// batch.
    pub fn batch_index(&self) -> Option<usize> {
        match self {
            Self::Ingest { batch, .. } => Some(*batch),
            _ => None,
        }
    }

    /// The backend name, when this error came from a query-time backend
    /// call.
    pub fn backend_name(&self) -> Option<&str> {
        match self {
            Self::Search { backend, .. } => Some(backend),
            _ => None,
        }
    }
}

/// Result type alias using Vitrina's Error type.
pub type Result<T> = std::result::Result<T, Error>;
