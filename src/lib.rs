//! tcestore - versioned JSON record store with a relational summary index
//!
//! Every submitted document is kept as an immutable, numbered snapshot file
//! under `<data-dir>/tce/<key>/NNN.json`. A new snapshot is only written when
//! the document differs from the latest one. A SQLite table holds one summary
//! row per record for listing.
//!
//! # Quick Start
//!
//! ```ignore
//! use tcestore::{TceStore, Submitted};
//! use serde_json::json;
//!
//! let store = TceStore::open("/var/lib/tcestore")?;
//!
//! assert_eq!(store.submit(json!({"idUnico": "A", "n": 1}))?, Submitted::Saved(1));
//! assert_eq!(store.submit(json!({"n": 1, "idUnico": "A"}))?, Submitted::Unchanged(1));
//! ```
//!
//! # Architecture
//!
//! All operations go through the [`Executor`] which provides a command-based API.
//! The [`TceStore`] struct provides a typed interface over it.

// Re-export the public API from tcestore-executor
pub use tcestore_executor::*;

pub use tcestore_core::{Document, FingerprintStrategy, RecordKey, StoreError};
pub use tcestore_engine::SubmitOutcome;
