//! Output enum for command execution results.
//!
//! Every command produces exactly one output type, except the submit
//! commands which produce `Saved` or `Unchanged` depending on content.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tcestore_engine::RepairReport;
use tcestore_index::IndexRow;

/// Successful command execution results.
///
/// # Example
///
/// ```text
/// use tcestore_executor::{Command, Output};
///
/// match executor.execute(Command::Submit { document })? {
///     Output::Saved { version, .. } => println!("saved version {}", version),
///     Output::Unchanged { version, .. } => println!("still at version {}", version),
///     _ => unreachable!("Submit returns Saved or Unchanged"),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Output {
    /// A new snapshot was stored
    Saved {
        /// Record key
        key: String,
        /// New latest version
        version: u32,
        /// Snapshot file path
        path: PathBuf,
    },

    /// The submission matched the latest snapshot
    Unchanged {
        /// Record key
        key: String,
        /// Current latest version
        version: u32,
    },

    /// Index rows ordered by intern name
    Records(Vec<IndexRow>),

    /// One stored document
    Snapshot {
        /// Record key
        key: String,
        /// Version of this document
        version: u32,
        /// Document content
        document: Value,
    },

    /// Stored versions, highest first
    Versions {
        /// Record key
        key: String,
        /// Version numbers
        versions: Vec<u32>,
    },

    /// A record was deleted
    Deleted {
        /// Record key
        key: String,
        /// Whether the record had any files or index row
        existed: bool,
    },

    /// Repair summary
    Repaired(RepairReport),
}

impl Output {
    /// HTTP-style status for this result: 201 for a stored version, 200
    /// otherwise.
    pub fn status_code(&self) -> u16 {
        match self {
            Output::Saved { .. } => 201,
            _ => 200,
        }
    }

    /// Human-readable one-line summary.
    pub fn message(&self) -> String {
        match self {
            Output::Saved { key, version, .. } => {
                format!("Saved record '{}' as version {}", key, version)
            }
            Output::Unchanged { key, version } => format!(
                "No changes detected for record '{}'; latest version is {}",
                key, version
            ),
            Output::Records(rows) => format!("{} record(s)", rows.len()),
            Output::Snapshot { key, version, .. } => {
                format!("Record '{}' at version {}", key, version)
            }
            Output::Versions { key, versions } => {
                format!("Record '{}' has {} version(s)", key, versions.len())
            }
            Output::Deleted { key, existed: true } => format!("Deleted record '{}'", key),
            Output::Deleted { key, existed: false } => {
                format!("Record '{}' did not exist", key)
            }
            Output::Repaired(report) => format!(
                "Scanned {} record(s): {} repaired, {} removed, {} unchanged",
                report.scanned, report.inserted_or_updated, report.removed, report.unchanged
            ),
        }
    }
}
