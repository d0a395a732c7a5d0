//! Test modules for the executor crate.


use std::sync::Arc;

use tcestore_engine::{Database, TceStoreConfig};
use tcestore_security::Authorizer;
use tempfile::TempDir;

use crate::Executor;

/// Open a scratch database. Keep the `TempDir` alive for the test.
pub(crate) fn temp_db() -> (TempDir, Arc<Database>) {
    let temp_dir = TempDir::new().unwrap();
    let cfg = TceStoreConfig {
        sync_writes: false,
        ..TceStoreConfig::default()
    };
    let db = Database::open_with_config(temp_dir.path().join("db"), cfg).unwrap();
    (temp_dir, db)
}

/// Read-write executor over a scratch database.
pub(crate) fn temp_executor(authorizer: Arc<dyn Authorizer>) -> (TempDir, Executor) {
    let (temp_dir, db) = temp_db();
    (temp_dir, Executor::new(db, authorizer))
}
