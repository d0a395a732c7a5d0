//! Error types for command execution.
//!
//! All errors from command execution are represented by the [`Error`] enum.
//! These errors are:
//! - **Structured**: Each variant has typed fields for error details
//! - **Serializable**: Can be converted to/from JSON
//! - **Classified**: Each maps to an HTTP-style status via [`Error::status_code`]

use serde::{Deserialize, Serialize};

/// Command execution errors.
///
/// # Categories
///
/// | Category | Variants | Status |
/// |----------|----------|--------|
/// | Validation | `InvalidInput` | 400 |
/// | Access | `Unauthorized`, `AccessDenied` | 403 |
/// | Not Found | `RecordNotFound`, `VersionNotFound` | 404 |
/// | State | `ShuttingDown` | 503 |
/// | System | `Io`, `Storage`, `Serialization`, `Index`, `PartialCommit`, `VersionConflict`, `Internal` | 500 |
///
/// # Example
///
/// ```ignore
/// use tcestore_executor::{Command, Error};
///
/// match executor.execute(cmd) {
///     Ok(output) => { /* handle success */ }
///     Err(Error::RecordNotFound { key }) => {
///         println!("Record '{}' not found", key);
///     }
///     Err(e) => {
///         println!("Error {}: {}", e.status_code(), e);
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum Error {
    // ==================== Validation ====================
    /// Missing or malformed key or document
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    // ==================== Access ====================
    /// Delete credential rejected
    #[error("unauthorized: {reason}")]
    Unauthorized { reason: String },

    /// Write command issued on a read-only handle
    #[error("access denied: {command} is not allowed in read-only mode")]
    AccessDenied { command: String },

    // ==================== Not Found ====================
    /// Record has no snapshots
    #[error("record not found: {key}")]
    RecordNotFound { key: String },

    /// Record exists but not at this version
    #[error("version not found: {key} has no version {version}")]
    VersionNotFound { key: String, version: u32 },

    // ==================== State ====================
    /// Store has been shut down
    #[error("database is shutting down")]
    ShuttingDown,

    // ==================== System ====================
    /// I/O error
    #[error("I/O error: {reason}")]
    Io { reason: String },

    /// Snapshot filesystem failure
    #[error("storage error: {reason}")]
    Storage { reason: String },

    /// Unreadable snapshot or config
    #[error("serialization error: {reason}")]
    Serialization { reason: String },

    /// Record index failure
    #[error("index error: {reason}")]
    Index { reason: String },

    /// Snapshot stored but index not updated
    #[error("partial commit: record '{key}' version {version} was stored but not indexed: {reason}")]
    PartialCommit {
        key: String,
        version: u32,
        reason: String,
    },

    /// Refused to overwrite an existing snapshot
    #[error("version conflict: record '{key}' already has version {version}")]
    VersionConflict { key: String, version: u32 },

    /// Internal error (bug or invariant violation)
    #[error("internal error: {reason}")]
    Internal { reason: String },
}

impl Error {
    /// HTTP-style status for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::InvalidInput { .. } => 400,
            Error::Unauthorized { .. } | Error::AccessDenied { .. } => 403,
            Error::RecordNotFound { .. } | Error::VersionNotFound { .. } => 404,
            Error::ShuttingDown => 503,
            Error::Io { .. }
            | Error::Storage { .. }
            | Error::Serialization { .. }
            | Error::Index { .. }
            | Error::PartialCommit { .. }
            | Error::VersionConflict { .. }
            | Error::Internal { .. } => 500,
        }
    }
}

/// Result type for executor operations.
pub type Result<T> = std::result::Result<T, Error>;
