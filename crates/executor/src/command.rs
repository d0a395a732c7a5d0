//! Command enum defining all tcestore operations.
//!
//! Commands are the "instruction set" of tcestore. Every operation a client
//! can request is a variant of this enum.
//!
//! Commands are:
//! - **Self-contained**: All parameters needed for execution are in the variant
//! - **Serializable**: Can be converted to/from JSON at any boundary
//! - **Pure data**: No closures or executable code

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A command is a self-contained, serializable operation.
///
/// # Command Categories
///
/// | Category | Commands | Description |
/// |----------|----------|-------------|
/// | Write | `Submit`, `SubmitKeyed` | Store a new version unless unchanged |
/// | Read | `ListRecords`, `GetLatest`, `GetVersion`, `ListVersions` | Query records |
/// | Admin | `Delete`, `Repair` | Remove history, rebuild the index |
///
/// # Example
///
/// ```ignore
/// use tcestore_executor::Command;
/// use serde_json::json;
///
/// let cmd = Command::Submit {
///     document: json!({"idUnico": "A", "nomeEstagiario": "Maria"}),
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Submit a document keyed by its own `idUnico` field.
    /// Returns: `Output::Saved` or `Output::Unchanged`
    Submit {
        /// JSON object to store
        document: Value,
    },

    /// Submit a document under an explicit key.
    /// Returns: `Output::Saved` or `Output::Unchanged`
    SubmitKeyed {
        /// Record key
        key: String,
        /// JSON object to store
        document: Value,
    },

    /// List the index rows of every record.
    /// Returns: `Output::Records`
    ListRecords,

    /// Read the latest snapshot of a record.
    /// Returns: `Output::Snapshot`
    GetLatest {
        /// Record key
        key: String,
    },

    /// Read one version of a record.
    /// Returns: `Output::Snapshot`
    GetVersion {
        /// Record key
        key: String,
        /// Version number, starting at 1
        version: u32,
    },

    /// List the stored versions of a record.
    /// Returns: `Output::Versions`
    ListVersions {
        /// Record key
        key: String,
    },

    /// Delete a record's history and index row.
    /// Returns: `Output::Deleted`
    Delete {
        /// Record key
        key: String,
        /// Credential checked by the configured authorizer
        #[serde(default, skip_serializing_if = "Option::is_none")]
        credential: Option<String>,
    },

    /// Rebuild the index from the snapshot files.
    /// Returns: `Output::Repaired`
    Repair,
}

impl Command {
    /// Returns `true` if this command modifies stored data.
    ///
    /// Used by the access-mode guard to reject writes when the store is
    /// opened read-only.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Command::Submit { .. }
                | Command::SubmitKeyed { .. }
                | Command::Delete { .. }
                | Command::Repair
        )
    }

    /// Returns the variant name as a static string.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Submit { .. } => "Submit",
            Command::SubmitKeyed { .. } => "SubmitKeyed",
            Command::ListRecords => "ListRecords",
            Command::GetLatest { .. } => "GetLatest",
            Command::GetVersion { .. } => "GetVersion",
            Command::ListVersions { .. } => "ListVersions",
            Command::Delete { .. } => "Delete",
            Command::Repair => "Repair",
        }
    }
}
