//! Error types for embedding operations

use std::fmt;
use thiserror::Error;

/// Error type for embedding operations
#[derive(Debug, Error)]
pub enum MLError {
    /// Error during embedding generation
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Vector has the wrong number of components
    #[error("Expected embedding dimension {expected}, got {got}")]
    Dimension { expected: usize, got: usize },

    /// Vector contains NaN or infinite components
    #[error("Invalid embedding value at index {index}: {value}")]
    InvalidValue { index: usize, value: f32 },

    /// Error related to embedding configuration
    #[error("Embedding configuration error: {0}")]
    Configuration(String),

    /// Other unexpected errors
    #[error("{0}")]
    Other(String),
}

impl MLError {
    /// Create a new embedding error
    pub fn embedding(msg: impl fmt::Display) -> Self {
        Self::Embedding(msg.to_string())
    }

    /// Create a new configuration error
    pub fn configuration(msg: impl fmt::Display) -> Self {
        Self::Configuration(msg.to_string())
    }

    /// Create a new other error
    pub fn other(msg: impl fmt::Display) -> Self {
        Self::Other(msg.to_string())
    }
}

/// Result type for embedding operations
pub type Result<T> = std::result::Result<T, MLError>;
