//! Storage error types
//!
//! Every backend normalises driver-specific failures into [`StorageError`]
//! before returning, so callers never inspect `sqlx` error variants.
//!
//! Construction errors (bad config, unreachable server, schema creation) are
//! FATAL: the process must not start serving. Per-request errors are ERROR
//! severity and map onto HTTP statuses in the server layer.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Severity levels for storage errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation fails, server continues
    Error,
    /// Startup must abort
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    // ==================
    // Construction (FATAL)
    // ==================
    /// Driver string matched no backend
    #[error("unknown db driver: {0}")]
    UnknownDriver(String),

    /// Backend-specific configuration is missing or malformed
    #[error("invalid storage configuration: {0}")]
    InvalidConfig(String),

    /// Could not prepare the on-disk location of a file database
    #[error("cannot prepare storage path {path:?}: {source}")]
    StoragePath {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Could not reach or talk to the database server
    #[error("connection error during {stage}: {source}")]
    Connection {
        stage: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// Could not create the database or the students table
    #[error("DB error during {stage}: {source}")]
    Schema {
        stage: &'static str,
        #[source]
        source: sqlx::Error,
    },

    // ==================
    // Per-request (ERROR)
    // ==================
    /// No row matches the requested id
    #[error("no student found with id {0}")]
    NotFound(i64),

    /// Any other database failure
    #[error("query error: {0}")]
    Query(#[source] sqlx::Error),
}

impl StorageError {
    pub fn connection(stage: &'static str) -> impl FnOnce(sqlx::Error) -> Self {
        move |source| Self::Connection { stage, source }
    }

    pub fn schema(stage: &'static str) -> impl FnOnce(sqlx::Error) -> Self {
        move |source| Self::Schema { stage, source }
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        match self {
            StorageError::UnknownDriver(_)
            | StorageError::InvalidConfig(_)
            | StorageError::StoragePath { .. }
            | StorageError::Connection { .. }
            | StorageError::Schema { .. } => Severity::Fatal,
            StorageError::NotFound(_) | StorageError::Query(_) => Severity::Error,
        }
    }

    /// Returns whether this error must stop the process
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        StorageError::Query(err)
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
