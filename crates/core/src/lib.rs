//! Core types for tcestore
//!
//! This crate defines the foundational types used throughout the system:
//! - RecordKey: validated `idUnico`, safe as a path segment and primary key
//! - Document: a JSON object and the index fields derived from it
//! - Snapshot: a stored version plus the file naming scheme
//! - Fingerprint: content identity used to detect unchanged submissions
//! - StoreError: error taxonomy shared by every layer
//! - Limits: key and document size limits

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod error;
pub mod fingerprint;
pub mod key;
pub mod limits;
pub mod snapshot;

pub use document::{Document, IndexFields};
pub use error::{StoreError, StoreResult};
pub use fingerprint::{fingerprint, Fingerprint, FingerprintStrategy};
pub use key::{validate_key, KeyError, RecordKey, KEY_FIELD};
pub use limits::Limits;
pub use snapshot::{parse_snapshot_file_name, snapshot_file_name, Snapshot};
