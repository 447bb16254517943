//! Core error types for battery-campaign-core.
//!
//! Errors are grouped by collaborator: configuration, the lock registry,
//! notification delivery, and input validation. [`CoreError`] covers what
//! can end a campaign run: the registry failing to list locks, or recorded
//! events failing summary validation. Configuration and delivery errors are
//! returned by their own APIs.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for battery-campaign-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Lock registry / user directory errors
    #[error("Data source error: {0}")]
    Source(#[from] SourceError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Home/config directory could not be resolved or created
    #[error("Config directory unavailable: {0}")]
    DirUnavailable(String),
}

/// Errors raised by a [`crate::source::DataSource`].
#[derive(Error, Debug)]
pub enum SourceError {
    /// Registry file missing
    #[error("Lock registry not found at {0}")]
    NotFound(PathBuf),

    /// Failed to open the registry
    #[error("Failed to open lock registry at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Registry is locked by another writer
    #[error("Lock registry is busy")]
    Busy,

    /// Source-specific failure (used by test doubles and fixtures)
    #[error("{0}")]
    Unavailable(String),
}

/// Errors raised by a [`crate::notify::Notifier`].
#[derive(Error, Debug)]
pub enum DeliveryError {
    /// User has no push token on file
    #[error("User '{user_id}' has no push token")]
    MissingToken { user_id: String },

    /// Delivery backend refused or failed
    #[error("Delivery via {notifier} failed: {message}")]
    Rejected { notifier: String, message: String },
}

/// Validation errors.
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    /// Counts or arguments that contradict each other
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid value for a named field
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<rusqlite::Error> for SourceError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg) => {
                if inner.code == rusqlite::ErrorCode::DatabaseBusy
                    || inner.code == rusqlite::ErrorCode::DatabaseLocked
                {
                    SourceError::Busy
                } else {
                    SourceError::QueryFailed(err.to_string())
                }
            }
            _ => SourceError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
