//! Database struct and open/close logic
//!
//! A `Database` owns one data directory:
//!
//! ```text
//! <data_dir>/
//!   tcestore.toml        configuration, written with defaults on first open
//!   .lock                exclusive process lock
//!   tce/<key>/NNN.json   snapshots (source of truth)
//!   index.sqlite         record index (derived)
//! ```
//!
//! Every mutation of a record runs under that record's lock, so concurrent
//! submissions for one key are serialized while different keys proceed in
//! parallel. Reads take no lock: snapshots become visible by atomic rename.

pub mod config;
mod registry;

pub use config::{TceStoreConfig, CONFIG_FILE_NAME};
pub use registry::OPEN_DATABASES;

use std::collections::BTreeSet;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tcestore_concurrency::KeyedLocks;
use tcestore_core::{
    Document, FingerprintStrategy, Limits, RecordKey, Snapshot, StoreError, StoreResult,
};
use tcestore_index::{IndexRow, RecordIndex};
use tcestore_security::Authorizer;
use tcestore_storage::VersionStore;
use tracing::{info, warn};

use crate::reconciler::{Reconciler, SubmitOutcome};
use crate::repair::{repair_key, RepairReport};

/// Lock file name placed in the data directory.
pub const LOCK_FILE_NAME: &str = ".lock";

/// Main store handle.
///
/// Open with [`Database::open`]; the returned `Arc` is shared by every
/// caller that opens the same directory in this process.
pub struct Database {
    /// Canonical data directory
    data_dir: PathBuf,

    /// Configuration in effect
    config: TceStoreConfig,

    /// Snapshot files
    store: VersionStore,

    /// Record index
    index: RecordIndex,

    /// Per-record locks
    locks: KeyedLocks,

    /// Content comparison for submissions
    strategy: FingerprintStrategy,

    /// Key and document size limits
    limits: Limits,

    /// False once `shutdown` has been called
    accepting: AtomicBool,

    /// Held for the lifetime of the database; dropping it releases the
    /// directory to other processes.
    _lock_file: File,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("data_dir", &self.data_dir)
            .field("config", &self.config)
            .field("accepting", &self.is_open())
            .finish()
    }
}

impl Database {
    /// Open (creating if needed) a store at `path`.
    ///
    /// Reads `tcestore.toml` from the directory, writing the default file
    /// first if there is none.
    ///
    /// # Errors
    ///
    /// Fails if the directory cannot be created, the config is invalid, the
    /// directory is locked by another process, or the index cannot be opened.
    ///
    /// # Example
    ///
    /// ```text
    /// use tcestore_engine::Database;
    ///
    /// let db = Database::open("/var/lib/tcestore")?;
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Arc<Self>> {
        let data_dir = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&data_dir)?;

        let config_path = data_dir.join(CONFIG_FILE_NAME);
        TceStoreConfig::write_default_if_missing(&config_path)?;
        let cfg = TceStoreConfig::from_file(&config_path)?;

        Self::open_inner(&data_dir, cfg)
    }

    /// Open a store with an explicit configuration.
    ///
    /// The config is written to `tcestore.toml` so later plain opens pick up
    /// the same settings. If the directory is already open in this process,
    /// the existing instance is returned and keeps its current settings.
    pub fn open_with_config<P: AsRef<Path>>(path: P, cfg: TceStoreConfig) -> StoreResult<Arc<Self>> {
        cfg.validate()?;
        let data_dir = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&data_dir)?;

        cfg.write_to_file(&data_dir.join(CONFIG_FILE_NAME))?;
        Self::open_inner(&data_dir, cfg)
    }

    fn open_inner(data_dir: &Path, cfg: TceStoreConfig) -> StoreResult<Arc<Self>> {
        let canonical_path = data_dir.canonicalize()?;

        // Held across the whole open so two threads cannot both miss the
        // registry and race for the process lock.
        let mut registry = OPEN_DATABASES.lock();

        loop {
            match registry.get(&canonical_path).map(|weak| weak.upgrade()) {
                Some(Some(db)) => {
                    info!(target: "tcestore::db", path = ?canonical_path, "Returning existing database instance");
                    return Ok(db);
                }
                // The previous instance is mid-drop and still holds the
                // process lock; its Drop removes this entry once released.
                Some(None) => {
                    drop(registry);
                    std::thread::yield_now();
                    registry = OPEN_DATABASES.lock();
                }
                None => break,
            }
        }

        let lock_file = std::fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(canonical_path.join(LOCK_FILE_NAME))
            .map_err(|e| StoreError::storage(format!("failed to open lock file: {}", e)))?;
        fs2::FileExt::try_lock_exclusive(&lock_file).map_err(|_| {
            StoreError::storage(format!(
                "data directory '{}' is already in use by another process",
                canonical_path.display()
            ))
        })?;

        let strategy = cfg.fingerprint_strategy()?;
        let store = VersionStore::open(canonical_path.join(&cfg.snapshots_dir))?
            .with_sync_writes(cfg.sync_writes);
        let index = RecordIndex::open(canonical_path.join(&cfg.index_file))?;
        let records = index.count()?;

        info!(
            target: "tcestore::db",
            path = ?canonical_path,
            fingerprint = %strategy,
            sync_writes = cfg.sync_writes,
            records,
            "Database opened"
        );

        let db = Arc::new(Self {
            data_dir: canonical_path.clone(),
            config: cfg,
            store,
            index,
            locks: KeyedLocks::new(),
            strategy,
            limits: Limits::default(),
            accepting: AtomicBool::new(true),
            _lock_file: lock_file,
        });

        registry.insert(canonical_path, Arc::downgrade(&db));
        Ok(db)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Canonical data directory.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Configuration in effect.
    pub fn config(&self) -> &TceStoreConfig {
        &self.config
    }

    /// Fingerprint strategy used to detect unchanged submissions.
    pub fn fingerprint_strategy(&self) -> FingerprintStrategy {
        self.strategy
    }

    /// Snapshot store.
    pub fn version_store(&self) -> &VersionStore {
        &self.store
    }

    /// Record index.
    pub fn record_index(&self) -> &RecordIndex {
        &self.index
    }

    /// Check if the database is currently open and accepting operations.
    pub fn is_open(&self) -> bool {
        self.accepting.load(Ordering::SeqCst)
    }

    fn check_accepting(&self) -> StoreResult<()> {
        if !self.is_open() {
            return Err(StoreError::ShuttingDown);
        }
        Ok(())
    }

    fn parse_key(&self, key: &str) -> StoreResult<RecordKey> {
        tcestore_core::key::validate_key_with_limits(key, &self.limits)?;
        RecordKey::new(key)
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Submit a document under an explicit key.
    ///
    /// Stores a new snapshot unless the document matches the latest one.
    ///
    /// # Errors
    ///
    /// `Validation` for a bad key or an oversized document, `ShuttingDown`
    /// after [`shutdown`](Self::shutdown), and whatever the reconciler
    /// reports (see [`Reconciler::reconcile`]).
    pub fn submit(&self, key: &str, document: &Document) -> StoreResult<SubmitOutcome> {
        self.check_accepting()?;
        let key = self.parse_key(key)?;
        document.check_limits(&self.limits)?;

        let reconciler = Reconciler::new(&self.store, &self.index, self.strategy);
        self.locks
            .with_lock(key.as_str(), || reconciler.reconcile(&key, document))
    }

    /// Submit a document keyed by its own `idUnico` field.
    pub fn submit_document(&self, document: &Document) -> StoreResult<SubmitOutcome> {
        let key = document.record_key()?;
        self.submit(key.as_str(), document)
    }

    /// Delete a record's whole history and its index row.
    ///
    /// Returns whether anything existed.
    ///
    /// # Errors
    ///
    /// `Unauthorized` if `authorizer` rejects `credential`. The check runs
    /// before anything is touched.
    pub fn delete(
        &self,
        key: &str,
        credential: Option<&str>,
        authorizer: &dyn Authorizer,
    ) -> StoreResult<bool> {
        self.check_accepting()?;
        let key = self.parse_key(key)?;

        if !authorizer.authorize_delete(key.as_str(), credential) {
            warn!(target: "tcestore::db", key = %key, "Delete rejected: invalid credential");
            return Err(StoreError::Unauthorized(format!(
                "not allowed to delete record '{}'",
                key
            )));
        }

        let existed = self.locks.with_lock(key.as_str(), || -> StoreResult<bool> {
            let had_files = self.store.delete_all(&key)?;
            let had_row = self.index.delete(&key)?;
            Ok(had_files || had_row)
        })?;
        self.locks.release(key.as_str());

        info!(target: "tcestore::db", key = %key, existed, "Record deleted");
        Ok(existed)
    }

    /// Rebuild the index from the snapshot files.
    ///
    /// Covers every key with a snapshot directory or an index row. Each key
    /// is repaired under its lock.
    pub fn repair(&self) -> StoreResult<RepairReport> {
        self.check_accepting()?;

        let mut keys: BTreeSet<RecordKey> = self.store.list_keys()?.into_iter().collect();
        for raw in self.index.keys()? {
            match RecordKey::new(raw.as_str()) {
                Ok(key) => {
                    keys.insert(key);
                }
                Err(e) => {
                    warn!(target: "tcestore::repair", key = %raw, error = %e, "Skipping index row with invalid key")
                }
            }
        }

        let mut report = RepairReport::default();
        for key in &keys {
            let action = self
                .locks
                .with_lock(key.as_str(), || repair_key(&self.store, &self.index, key))?;
            report.record(action);
        }

        info!(
            target: "tcestore::repair",
            scanned = report.scanned,
            inserted_or_updated = report.inserted_or_updated,
            removed = report.removed,
            unchanged = report.unchanged,
            "Repair complete"
        );
        Ok(report)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Latest snapshot of a record.
    ///
    /// # Errors
    ///
    /// `NotFound` if the record has no directory or no snapshots.
    pub fn get_latest(&self, key: &str) -> StoreResult<Snapshot> {
        self.check_accepting()?;
        let key = self.parse_key(key)?;
        self.store
            .latest_snapshot(&key)?
            .ok_or_else(|| StoreError::not_found(key.as_str()))
    }

    /// One specific version of a record.
    pub fn get_version(&self, key: &str, version: u32) -> StoreResult<Snapshot> {
        self.check_accepting()?;
        let key = self.parse_key(key)?;
        let document = self.store.read_snapshot(&key, version)?;
        Ok(Snapshot { version, document })
    }

    /// Stored versions of a record, highest first.
    ///
    /// # Errors
    ///
    /// `NotFound` if the record has no snapshots.
    pub fn list_versions(&self, key: &str) -> StoreResult<Vec<u32>> {
        self.check_accepting()?;
        let key = self.parse_key(key)?;
        let versions = self.store.list_versions(&key)?;
        if versions.is_empty() {
            return Err(StoreError::not_found(key.as_str()));
        }
        Ok(versions)
    }

    /// Every index row, ordered by intern name then key.
    pub fn list_records(&self) -> StoreResult<Vec<IndexRow>> {
        self.check_accepting()?;
        self.index.list_all()
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Stop accepting operations and checkpoint the index.
    ///
    /// Operations already holding a record lock finish normally. Calling
    /// `shutdown` twice is harmless.
    pub fn shutdown(&self) -> StoreResult<()> {
        if self.accepting.swap(false, Ordering::SeqCst) {
            info!(target: "tcestore::db", path = ?self.data_dir, "Database shutting down");
        }
        self.index.checkpoint()
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        if let Err(e) = self.index.checkpoint() {
            warn!(target: "tcestore::db", error = %e, "Index checkpoint failed on close");
        }

        let mut registry = OPEN_DATABASES.lock();

        // Release the process lock while the registry is held; the fields
        // drop after this returns, and an open racing with us must not find
        // the directory locked by an instance it can no longer upgrade.
        if let Err(e) = fs2::FileExt::unlock(&self._lock_file) {
            warn!(target: "tcestore::db", error = %e, "Failed to release data directory lock");
        }

        // A replacement may already be registered under the same path.
        let stale = registry
            .get(&self.data_dir)
            .is_some_and(|weak| weak.upgrade().is_none());
        if stale {
            registry.remove(&self.data_dir);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
