//! Storage layer for tcestore
//!
//! This crate owns the on-disk snapshot history:
//! - VersionStore: numbered `NNN.json` snapshots under one directory per record
//! - atomic: write-fsync-rename helper used for every snapshot write
//!
//! Snapshot files are the source of truth; the record index is rebuilt from
//! them when the two disagree.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod atomic;
pub mod version_store;

pub use version_store::VersionStore;
