//! Error types and Result aliases for codesearch.
//!
//! Errors are layered the same way ingestion is:
//! - setup failures (config, store client, index reset) surface as `Error`
//!   and stop the process;
//! - a repository that cannot be fetched or walked is reported through
//!   [`RepoOutcome`](crate::ingest::RepoOutcome) and never propagated;
//! - entry and per-line failures are only counted in
//!   [`WalkStats`](crate::ingest::WalkStats).

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using codesearch's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for codesearch operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Search store error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Repository fetch error.
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Tree walk error.
    #[error("walk error: {0}")]
    Walk(#[from] WalkError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Store-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The store could not be reached.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The store answered with an unexpected status.
    #[error("{operation} returned HTTP {status}: {body}")]
    Request {
        operation: &'static str,
        status: u16,
        body: String,
    },

    /// `SQLite` database error.
    #[error("database error: {0}")]
    Database(String),

    /// Schema migration error.
    #[error("migration error: {0}")]
    Migration(String),
}

/// Repository fetch errors.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The git binary could not be started.
    #[error("git not available: {0}")]
    GitUnavailable(String),

    /// A git command exited unsuccessfully.
    #[error("`{command}` failed: {message}")]
    CommandFailed { command: String, message: String },

    /// The local directory exists but is not a git work tree.
    #[error("'{}' is not a git repository", path.display())]
    NotARepository { path: PathBuf },
}

/// Tree walk errors. Only failures that abort a whole walk live here.
#[derive(Error, Debug)]
pub enum WalkError {
    /// An eligible file could not be opened.
    #[error("failed to open '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl StorageError {
    /// Create a request error from an HTTP status and response body.
    pub fn request(operation: &'static str, status: u16, body: impl Into<String>) -> Self {
        Self::Request {
            operation,
            status,
            body: body.into(),
        }
    }
}

impl FetchError {
    /// Create a command failure error.
    pub fn command_failed(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CommandFailed {
            command: command.into(),
            message: message.into(),
        }
    }
}
