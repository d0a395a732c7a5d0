//! Concurrency layer for tcestore
//!
//! This crate provides the per-record-key lock that serializes the
//! reconciler's read-compare-write-upsert sequence:
//! - KeyedLocks: lazily created `parking_lot` mutex per key in a `DashMap`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod keyed_lock;

pub use keyed_lock::KeyedLocks;
