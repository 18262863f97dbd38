//! Core error types for planos-core.
//!
//! Nothing in the lifecycle engine is fatal: storage and presentation
//! failures are logged and degraded at the call site. These types exist so
//! that the boundary (validation, config, the CLI) can report precisely what
//! went wrong.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for planos-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Key-value store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Presentation adapter errors
    #[error("Presentation error: {0}")]
    Present(#[from] PresentError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Key-value store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the backing database
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Reading a key failed
    #[error("Failed to read '{key}': {message}")]
    ReadFailed { key: String, message: String },

    /// Writing a key failed (quota, locked database, disabled storage)
    #[error("Failed to write '{key}': {message}")]
    WriteFailed { key: String, message: String },

    /// The data directory could not be determined or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
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

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Validation errors, raised before any mutation happens.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Title is empty after trimming whitespace
    #[error("Task title must not be empty")]
    EmptyTitle,

    /// Duration below zero
    #[error("Task duration must not be negative (got {0} minutes)")]
    NegativeDuration(i64),

    /// Duration does not fit the persisted representation
    #[error("Task duration of {0} minutes is too long")]
    DurationTooLong(i64),

    /// No task with the given id
    #[error("No task with id {0}")]
    UnknownTask(u64),
}

/// Presentation adapter failures. Never affect engine state.
#[derive(Error, Debug)]
#[error("{adapter}: {message}")]
pub struct PresentError {
    pub adapter: String,
    pub message: String,
}

impl PresentError {
    pub fn new(adapter: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            adapter: adapter.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
