//! Error types for storage operations

use std::error::Error;
use std::fmt;

/// Error type for storage operations
#[derive(Debug)]
pub enum StorageError {
    /// Configuration error
    Configuration(String),

    /// Filesystem error while reading or writing a snapshot
    Io(String),

    /// Validation error
    Validation(String),

    /// Data not found
    NotFound(String),

    /// Item already exists
    AlreadyExists(String),

    /// A compare-and-set precondition did not hold
    Conflict(String),

    /// Serialization/deserialization error
    Serialization(String),

    /// Storage timeout error
    Timeout(String),

    /// Internal error
    Internal(String),

    /// Other error
    Other(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl StorageError {
    /// Whether retrying the operation with fresh state may succeed
    pub fn is_conflict(&self) -> bool {
        matches!(self, StorageError::Conflict(_))
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            StorageError::Io(msg) => write!(f, "I/O error: {}", msg),
            StorageError::Validation(msg) => write!(f, "Validation error: {}", msg),
            StorageError::NotFound(msg) => write!(f, "Not found: {}", msg),
            StorageError::AlreadyExists(msg) => write!(f, "Already exists: {}", msg),
            StorageError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            StorageError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            StorageError::Timeout(msg) => write!(f, "Timeout: {}", msg),
            StorageError::Internal(msg) => write!(f, "Internal error: {}", msg),
            StorageError::Other(msg) => write!(f, "Other error: {}", msg),
        }
    }
}

impl Error for StorageError {}

/// Convert a JSON error to a storage error
impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Convert a standard IO error to a storage error
impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

/// Convert EventFeedError to StorageError
impl From<crate::EventFeedError> for StorageError {
    fn from(err: crate::EventFeedError) -> Self {
        match err {
            crate::EventFeedError::Storage(s) => StorageError::Other(s),
            crate::EventFeedError::Configuration(s) => StorageError::Configuration(s),
            crate::EventFeedError::EventNotFound(id) => {
                StorageError::NotFound(format!("event {}", id))
            }
            crate::EventFeedError::UserNotFound(id) => {
                StorageError::NotFound(format!("user {}", id))
            }
            crate::EventFeedError::NotFound(s) => StorageError::NotFound(s),
            crate::EventFeedError::InvalidInput(s) => StorageError::Validation(s),
            crate::EventFeedError::Conflict(s) => StorageError::Conflict(s),
            crate::EventFeedError::Timeout(s) => StorageError::Timeout(s),
            other => StorageError::Other(other.to_string()),
        }
    }
}

// This allows StorageError to be converted to the top-level EventFeedError
impl From<StorageError> for crate::EventFeedError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(s) => crate::EventFeedError::NotFound(s),
            StorageError::Validation(s) => crate::EventFeedError::InvalidInput(s),
            StorageError::AlreadyExists(s) | StorageError::Conflict(s) => {
                crate::EventFeedError::Conflict(s)
            }
            StorageError::Timeout(s) => crate::EventFeedError::Timeout(s),
            other => crate::EventFeedError::Storage(other.to_string()),
        }
    }
}
