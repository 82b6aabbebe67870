//! Error types for the Shorthand acronym engine
//!
//! This module provides comprehensive error handling using thiserror for
//! structured error definitions and anyhow for error propagation.

use crate::editor::BufferId;
use thiserror::Error;

/// Main error type for Shorthand operations
#[derive(Error, Debug)]
pub enum ShorthandError {
    /// Store collaborator failed (unreachable, write conflict, ...)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Record or entry not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Resource already exists (e.g. duplicate acronym label)
    #[error("Resource already exists: {0}")]
    AlreadyExists(String),

    /// Store does not declare the requested capability
    #[error("Unsupported capability: {0}")]
    Unsupported(String),

    /// Event or query addressed to a buffer that is not attached
    #[error("Buffer {0} is not attached")]
    NotAttached(BufferId),

    /// Accept requested while no suggestion is selected
    #[error("No suggestion selected")]
    NoSelection,

    /// Invalid operation for the current state
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Result type alias for Shorthand operations
pub type Result<T> = std::result::Result<T, ShorthandError>;

/// Convert anyhow::Error to ShorthandError
impl From<anyhow::Error> for ShorthandError {
    fn from(err: anyhow::Error) -> Self {
        ShorthandError::Other(err.to_string())
    }
}
