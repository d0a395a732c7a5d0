//! Error types for tcestore
//!
//! Every layer below the command boundary reports failures through
//! [`StoreError`]. We use `thiserror` for `Display` and `Error` impls.
//!
//! | Variant | Raised by |
//! |---------|-----------|
//! | `Validation` | key/document checks |
//! | `NotFound` | version store reads |
//! | `Io`, `Storage`, `VersionConflict` | version store writes |
//! | `Serialization` | snapshot and config decoding |
//! | `Index` | record index |
//! | `PartialCommit` | reconciler, snapshot written but index not updated |
//! | `Unauthorized` | delete authorization |
//! | `ShuttingDown` | database lifecycle |

use std::io;
use thiserror::Error;

/// Result type alias for tcestore operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Error types for tcestore
#[derive(Debug, Error)]
pub enum StoreError {
    /// Missing or malformed record key or document
    #[error("validation error: {0}")]
    Validation(String),

    /// Unknown record key, or unknown version of a known key
    #[error("record '{key}' not found{}", version_suffix(.version))]
    NotFound {
        /// Record key that was looked up
        key: String,
        /// Specific version, if one was requested
        version: Option<u32>,
    },

    /// I/O error from the filesystem
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Storage layer error that is not a plain I/O failure
    #[error("storage error: {0}")]
    Storage(String),

    /// Snapshot or configuration could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Record index (database) failure
    #[error("index error: {0}")]
    Index(String),

    /// Snapshot file was written but the index row could not be updated
    #[error("snapshot {version} of '{key}' was written but the index was not updated: {reason}")]
    PartialCommit {
        /// Record key
        key: String,
        /// Version that reached disk
        version: u32,
        /// Underlying index failure
        reason: String,
    },

    /// A snapshot file for this version already exists
    #[error("snapshot {version} of '{key}' already exists")]
    VersionConflict {
        /// Record key
        key: String,
        /// Version that was about to be overwritten
        version: u32,
    },

    /// Credential rejected
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Database has been shut down
    #[error("database is shutting down")]
    ShuttingDown,
}

fn version_suffix(version: &Option<u32>) -> String {
    match version {
        Some(v) => format!(" at version {v}"),
        None => String::new(),
    }
}

impl StoreError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        StoreError::Validation(msg.into())
    }

    /// Create a storage error.
    pub fn storage(msg: impl Into<String>) -> Self {
        StoreError::Storage(msg.into())
    }

    /// Create an index error.
    pub fn index(msg: impl Into<String>) -> Self {
        StoreError::Index(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        StoreError::Serialization(msg.into())
    }

    /// Record key is unknown.
    pub fn not_found(key: impl Into<String>) -> Self {
        StoreError::NotFound {
            key: key.into(),
            version: None,
        }
    }

    /// Specific version of a record key is unknown.
    pub fn version_not_found(key: impl Into<String>, version: u32) -> Self {
        StoreError::NotFound {
            key: key.into(),
            version: Some(version),
        }
    }

    /// Returns true for `NotFound`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// Returns true for `Validation`.
    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Validation(_))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}
