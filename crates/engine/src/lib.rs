//! Database engine for tcestore
//!
//! This crate orchestrates the lower layers:
//! - Database: data directory, configuration, open/close and the public
//!   record operations
//! - Reconciler: compare a submission with the latest snapshot and persist
//!   a new version when it differs
//! - Repair: rebuild the record index from the snapshot files
//!
//! The engine is the only component that knows about both the snapshot
//! files and the index, and the only one that takes record locks.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod database;
pub mod reconciler;
pub mod repair;

pub use database::{Database, TceStoreConfig, CONFIG_FILE_NAME};
pub use reconciler::{Reconciler, SubmitOutcome};
pub use repair::RepairReport;
