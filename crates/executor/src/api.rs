//! High-level typed wrapper for the Executor.
//!
//! [`TceStore`] wraps the [`Executor`] and the [`Command`]/[`Output`] enums
//! with typed method calls.
//!
//! # Example
//!
//! ```text
//! use tcestore_executor::TceStore;
//! use serde_json::json;
//!
//! let store = TceStore::open("/var/lib/tcestore")?;
//! let version = store.submit(json!({"idUnico": "A", "nomeEstagiario": "Maria"}))?;
//! let (latest, document) = store.get_latest("A")?;
//! ```

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tcestore_engine::{Database, RepairReport, TceStoreConfig, CONFIG_FILE_NAME};
use tcestore_index::IndexRow;
use tcestore_security::{authorizer_from_env, AccessMode, Authorizer, OpenOptions};

use crate::{Command, Error, Executor, Output, Result};

/// Result of a typed submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submitted {
    /// A new version was stored
    Saved(u32),
    /// The document matched this latest version
    Unchanged(u32),
}

impl Submitted {
    /// Latest version after the submission.
    pub fn version(&self) -> u32 {
        match self {
            Submitted::Saved(v) | Submitted::Unchanged(v) => *v,
        }
    }
}

/// Typed handle over one data directory.
pub struct TceStore {
    executor: Executor,
}

impl TceStore {
    /// Open a store at the given path in read-write mode.
    ///
    /// Deletes are authorized against `TCESTORE_DELETE_SECRET`; without it,
    /// every delete is rejected.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, OpenOptions::default())
    }

    /// Open a store with explicit options.
    ///
    /// Overrides in `opts` are applied on top of `tcestore.toml` and written
    /// back to it.
    pub fn open_with<P: AsRef<Path>>(path: P, opts: OpenOptions) -> Result<Self> {
        let data_dir = path.as_ref();
        std::fs::create_dir_all(data_dir).map_err(|e| Error::Io {
            reason: format!("Failed to create data directory: {}", e),
        })?;

        let config_path = data_dir.join(CONFIG_FILE_NAME);
        TceStoreConfig::write_default_if_missing(&config_path)?;
        let mut cfg = TceStoreConfig::from_file(&config_path)?;

        let overridden = opts.fingerprint.is_some() || opts.sync_writes.is_some();
        if let Some(fingerprint) = opts.fingerprint {
            cfg.fingerprint = fingerprint;
        }
        if let Some(sync_writes) = opts.sync_writes {
            cfg.sync_writes = sync_writes;
        }

        let db = if overridden {
            Database::open_with_config(data_dir, cfg)?
        } else {
            Database::open(data_dir)?
        };

        Ok(Self::from_database_with_mode(
            db,
            authorizer_from_env(),
            opts.access_mode,
        ))
    }

    /// Wrap an already open database.
    pub fn from_database(db: Arc<Database>, authorizer: Arc<dyn Authorizer>) -> Self {
        Self::from_database_with_mode(db, authorizer, AccessMode::ReadWrite)
    }

    fn from_database_with_mode(
        db: Arc<Database>,
        authorizer: Arc<dyn Authorizer>,
        access_mode: AccessMode,
    ) -> Self {
        Self {
            executor: Executor::new_with_mode(db, authorizer, access_mode),
        }
    }

    /// Replace the delete authorizer.
    pub fn with_authorizer(self, authorizer: Arc<dyn Authorizer>) -> Self {
        let access_mode = self.executor.access_mode();
        let db = Arc::clone(self.executor.database());
        Self::from_database_with_mode(db, authorizer, access_mode)
    }

    /// Get the underlying executor.
    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    /// Returns the access mode of this handle.
    pub fn access_mode(&self) -> AccessMode {
        self.executor.access_mode()
    }

    /// Submit a document keyed by its `idUnico` field.
    pub fn submit(&self, document: Value) -> Result<Submitted> {
        submitted(self.executor.execute(Command::Submit { document })?)
    }

    /// Submit a document under an explicit key.
    pub fn submit_keyed(&self, key: &str, document: Value) -> Result<Submitted> {
        submitted(self.executor.execute(Command::SubmitKeyed {
            key: key.to_string(),
            document,
        })?)
    }

    /// Latest version and document of a record.
    pub fn get_latest(&self, key: &str) -> Result<(u32, Value)> {
        match self.executor.execute(Command::GetLatest {
            key: key.to_string(),
        })? {
            Output::Snapshot {
                version, document, ..
            } => Ok((version, document)),
            other => Err(unexpected("GetLatest", &other)),
        }
    }

    /// One version of a record.
    pub fn get_version(&self, key: &str, version: u32) -> Result<Value> {
        match self.executor.execute(Command::GetVersion {
            key: key.to_string(),
            version,
        })? {
            Output::Snapshot { document, .. } => Ok(document),
            other => Err(unexpected("GetVersion", &other)),
        }
    }

    /// Stored versions of a record, highest first.
    pub fn list_versions(&self, key: &str) -> Result<Vec<u32>> {
        match self.executor.execute(Command::ListVersions {
            key: key.to_string(),
        })? {
            Output::Versions { versions, .. } => Ok(versions),
            other => Err(unexpected("ListVersions", &other)),
        }
    }

    /// Every index row, ordered by intern name.
    pub fn list_records(&self) -> Result<Vec<IndexRow>> {
        match self.executor.execute(Command::ListRecords)? {
            Output::Records(rows) => Ok(rows),
            other => Err(unexpected("ListRecords", &other)),
        }
    }

    /// Delete a record's history. Returns whether it existed.
    pub fn delete(&self, key: &str, credential: Option<&str>) -> Result<bool> {
        match self.executor.execute(Command::Delete {
            key: key.to_string(),
            credential: credential.map(String::from),
        })? {
            Output::Deleted { existed, .. } => Ok(existed),
            other => Err(unexpected("Delete", &other)),
        }
    }

    /// Rebuild the index from the snapshot files.
    pub fn repair(&self) -> Result<RepairReport> {
        match self.executor.execute(Command::Repair)? {
            Output::Repaired(report) => Ok(report),
            other => Err(unexpected("Repair", &other)),
        }
    }

    /// Stop accepting operations and checkpoint the index.
    pub fn shutdown(&self) -> Result<()> {
        Ok(self.executor.database().shutdown()?)
    }
}

fn submitted(output: Output) -> Result<Submitted> {
    match output {
        Output::Saved { version, .. } => Ok(Submitted::Saved(version)),
        Output::Unchanged { version, .. } => Ok(Submitted::Unchanged(version)),
        other => Err(unexpected("Submit", &other)),
    }
}

fn unexpected(command: &str, output: &Output) -> Error {
    Error::Internal {
        reason: format!("Unexpected output for {}: {:?}", command, output),
    }
}
