//! Record index for tcestore
//!
//! A relational mirror of the latest snapshot of every record, used for
//! listing records sorted by intern name without reading snapshot files:
//! - RecordIndex: SQLite table `records`, one row per record key
//! - schema: table definitions and schema version check

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod record_index;
pub mod schema;

pub use record_index::{IndexRow, RecordIndex, UpsertOutcome};

use tcestore_core::StoreError;

/// Convert a SQLite failure into the shared error type.
pub(crate) fn index_err(e: rusqlite::Error) -> StoreError {
    StoreError::Index(e.to_string())
}
