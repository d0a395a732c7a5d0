//! Numbered snapshot files per record key
//!
//! Layout:
//! ```text
//! {root}/{record_key}/
//!   001.json       # version 1, pretty-printed JSON
//!   002.json       # version 2
//!   003.json.tmp   # in-flight write, ignored
//! ```
//!
//! The version store is the source of truth for a record's history. It does
//! no locking of its own; callers serialize writers per key.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tcestore_core::snapshot::{is_temp_file_name, parse_snapshot_file_name, snapshot_file_name};
use tcestore_core::{Document, RecordKey, Snapshot, StoreError, StoreResult};
use tracing::{debug, info, warn};

use crate::atomic::write_atomic;

/// Filesystem-backed snapshot store.
#[derive(Debug, Clone)]
pub struct VersionStore {
    root: PathBuf,
    sync_writes: bool,
}

impl VersionStore {
    /// Open (creating if needed) a version store rooted at `root`.
    pub fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|e| {
            StoreError::storage(format!(
                "failed to create snapshot root '{}': {}",
                root.display(),
                e
            ))
        })?;
        Ok(Self {
            root,
            sync_writes: true,
        })
    }

    /// Enable or disable fsync on snapshot writes (enabled by default).
    pub fn with_sync_writes(mut self, sync_writes: bool) -> Self {
        self.sync_writes = sync_writes;
        self
    }

    /// Snapshot root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding one record's snapshots.
    pub fn record_dir(&self, key: &RecordKey) -> PathBuf {
        self.root.join(key.as_str())
    }

    /// Path of one snapshot file.
    pub fn snapshot_path(&self, key: &RecordKey, version: u32) -> PathBuf {
        self.record_dir(key).join(snapshot_file_name(version))
    }

    /// Create the record directory if absent. Idempotent.
    pub fn ensure_directory(&self, key: &RecordKey) -> StoreResult<PathBuf> {
        let dir = self.record_dir(key);
        fs::create_dir_all(&dir).map_err(|e| {
            StoreError::storage(format!(
                "failed to create record directory '{}': {}",
                dir.display(),
                e
            ))
        })?;
        Ok(dir)
    }

    /// All stored versions of a record, highest first.
    ///
    /// Returns an empty list when the record directory does not exist.
    /// Entries that are not snapshot files are skipped with a warning;
    /// leftover `.tmp` files are skipped silently.
    pub fn list_versions(&self, key: &RecordKey) -> StoreResult<Vec<u32>> {
        let dir = self.record_dir(key);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut versions = Vec::new();
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                warn!(target: "tcestore::store", key = %key, file = ?name, "Skipping non-UTF-8 file name");
                continue;
            };
            if is_temp_file_name(name) {
                debug!(target: "tcestore::store", key = %key, file = name, "Ignoring interrupted write");
                continue;
            }
            if !entry.file_type()?.is_file() {
                warn!(target: "tcestore::store", key = %key, file = name, "Skipping non-file entry");
                continue;
            }
            match parse_snapshot_file_name(name) {
                Some(version) => versions.push(version),
                None => {
                    warn!(target: "tcestore::store", key = %key, file = name, "Skipping unparsable snapshot file name")
                }
            }
        }

        versions.sort_unstable_by(|a, b| b.cmp(a));
        Ok(versions)
    }

    /// Highest stored version, if any.
    pub fn latest_version(&self, key: &RecordKey) -> StoreResult<Option<u32>> {
        Ok(self.list_versions(key)?.first().copied())
    }

    /// Version the next new snapshot will receive. Always at least 1.
    pub fn next_version_number(&self, key: &RecordKey) -> StoreResult<u32> {
        match self.latest_version(key)? {
            None => Ok(1),
            Some(latest) => latest.checked_add(1).ok_or_else(|| {
                StoreError::storage(format!("record '{}' has exhausted its version numbers", key))
            }),
        }
    }

    /// Read one snapshot.
    ///
    /// # Errors
    ///
    /// `NotFound` if the record directory or the version file is missing,
    /// `Serialization` if the file is not a JSON object.
    pub fn read_snapshot(&self, key: &RecordKey, version: u32) -> StoreResult<Document> {
        let path = self.snapshot_path(key, version);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(if self.record_dir(key).is_dir() {
                    StoreError::version_not_found(key.as_str(), version)
                } else {
                    StoreError::not_found(key.as_str())
                });
            }
            Err(e) => return Err(e.into()),
        };
        Document::from_slice(&bytes).map_err(|e| {
            StoreError::serialization(format!(
                "snapshot '{}' is unreadable: {}",
                path.display(),
                e
            ))
        })
    }

    /// Latest snapshot with its version, or `None` if the record has none.
    pub fn latest_snapshot(&self, key: &RecordKey) -> StoreResult<Option<Snapshot>> {
        match self.latest_version(key)? {
            None => Ok(None),
            Some(version) => {
                let document = self.read_snapshot(key, version)?;
                Ok(Some(Snapshot { version, document }))
            }
        }
    }

    /// Persist a new snapshot and return its path.
    ///
    /// The record directory must exist. Existing versions are never
    /// overwritten: writing a version that is already on disk fails with
    /// `VersionConflict`.
    pub fn write_snapshot(
        &self,
        key: &RecordKey,
        version: u32,
        document: &Document,
    ) -> StoreResult<PathBuf> {
        if version == 0 {
            return Err(StoreError::validation("snapshot versions start at 1"));
        }
        let path = self.snapshot_path(key, version);
        match fs::symlink_metadata(&path) {
            Ok(meta) if meta.is_file() => {
                return Err(StoreError::VersionConflict {
                    key: key.to_string(),
                    version,
                });
            }
            // Invisible to list_versions, so retrying would conflict forever.
            Ok(_) => {
                return Err(StoreError::storage(format!(
                    "foreign entry '{}' occupies the slot of version {} of record '{}'; remove it to continue",
                    path.display(),
                    version,
                    key
                )));
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let bytes = document.to_pretty_bytes()?;
        write_atomic(&path, &bytes, self.sync_writes).map_err(|e| {
            StoreError::storage(format!(
                "failed to write snapshot '{}': {}",
                path.display(),
                e
            ))
        })?;

        debug!(
            target: "tcestore::store",
            key = %key,
            version,
            bytes = bytes.len(),
            "Snapshot written"
        );
        Ok(path)
    }

    /// Remove a record's whole history. Idempotent.
    ///
    /// Returns whether anything was removed.
    pub fn delete_all(&self, key: &RecordKey) -> StoreResult<bool> {
        let dir = self.record_dir(key);
        match fs::remove_dir_all(&dir) {
            Ok(()) => {
                info!(target: "tcestore::store", key = %key, "Record history deleted");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::storage(format!(
                "failed to delete record directory '{}': {}",
                dir.display(),
                e
            ))),
        }
    }

    /// Every record key that has a directory under the root, sorted.
    ///
    /// Directory names that are not valid record keys are skipped with a
    /// warning. Keys whose directory holds no snapshots are included.
    pub fn list_keys(&self) -> StoreResult<Vec<RecordKey>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name();
            match name.to_str().map(RecordKey::new) {
                Some(Ok(key)) => keys.push(key),
                _ => {
                    warn!(target: "tcestore::store", dir = ?name, "Skipping directory that is not a valid record key")
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}
