//! Submission reconciler
//!
//! Decides whether a submitted document is a new version of its record and,
//! if so, persists the snapshot and refreshes the index row:
//!
//! 1. ensure the record directory exists
//! 2. compare the submission with the latest snapshot by fingerprint
//! 3. on a match, report `Unchanged` and touch nothing
//! 4. otherwise write the next snapshot, then upsert the index row
//!
//! The reconciler does no locking. Callers hold the record's lock for the
//! whole sequence so two submissions for one key never pick the same
//! version number.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tcestore_core::{Document, FingerprintStrategy, RecordKey, StoreError, StoreResult};
use tcestore_index::RecordIndex;
use tcestore_storage::VersionStore;
use tracing::{debug, error, info};

/// Result of one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmitOutcome {
    /// The document matches the latest snapshot; nothing was written.
    Unchanged {
        /// Current latest version
        version: u32,
    },
    /// A new snapshot was written and indexed.
    NewVersion {
        /// Version assigned to the snapshot
        version: u32,
        /// Snapshot file path
        path: PathBuf,
    },
}

impl SubmitOutcome {
    /// Latest version after the submission.
    pub fn version(&self) -> u32 {
        match self {
            SubmitOutcome::Unchanged { version } | SubmitOutcome::NewVersion { version, .. } => {
                *version
            }
        }
    }

    /// Returns true if a snapshot was written.
    pub fn is_new_version(&self) -> bool {
        matches!(self, SubmitOutcome::NewVersion { .. })
    }
}

/// Compare-and-write over one version store and its index.
#[derive(Debug, Clone, Copy)]
pub struct Reconciler<'a> {
    store: &'a VersionStore,
    index: &'a RecordIndex,
    strategy: FingerprintStrategy,
}

impl<'a> Reconciler<'a> {
    /// Create a reconciler.
    pub fn new(store: &'a VersionStore, index: &'a RecordIndex, strategy: FingerprintStrategy) -> Self {
        Self {
            store,
            index,
            strategy,
        }
    }

    /// Reconcile one submission. The caller must hold `key`'s lock.
    ///
    /// # Errors
    ///
    /// - `Storage`/`Io` if the record directory or snapshot cannot be
    ///   written; the index is untouched.
    /// - `Serialization` if the latest snapshot on disk is unreadable.
    /// - `PartialCommit` if the snapshot was written but the index upsert
    ///   failed. Repair brings the index back in line.
    pub fn reconcile(&self, key: &RecordKey, document: &Document) -> StoreResult<SubmitOutcome> {
        self.store.ensure_directory(key)?;

        if let Some(latest) = self.store.latest_snapshot(key)? {
            let current = self.strategy.fingerprint(&latest.document);
            let submitted = self.strategy.fingerprint(document);
            if current == submitted {
                debug!(
                    target: "tcestore::reconcile",
                    key = %key,
                    version = latest.version,
                    fingerprint = %submitted.short(),
                    "No changes detected"
                );
                return Ok(SubmitOutcome::Unchanged {
                    version: latest.version,
                });
            }
        }

        let version = self.store.next_version_number(key)?;
        let path = self.store.write_snapshot(key, version, document)?;

        if let Err(e) = self.index.upsert(key, &document.index_fields(), version) {
            error!(
                target: "tcestore::reconcile",
                key = %key,
                version,
                error = %e,
                "Snapshot written but index update failed"
            );
            return Err(StoreError::PartialCommit {
                key: key.to_string(),
                version,
                reason: e.to_string(),
            });
        }

        info!(target: "tcestore::reconcile", key = %key, version, "New version saved");
        Ok(SubmitOutcome::NewVersion { version, path })
    }
}
