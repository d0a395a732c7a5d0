//! Index repair
//!
//! Snapshot files are the source of truth. Repair walks every record known
//! to either side and makes the index agree with the files:
//! - a record with snapshots gets a row built from its latest snapshot when
//!   the row is missing or names a different version
//! - a row whose record has no snapshots is removed

use serde::{Deserialize, Serialize};
use tcestore_core::{RecordKey, StoreResult};
use tcestore_index::RecordIndex;
use tcestore_storage::VersionStore;
use tracing::debug;

/// Summary of one repair run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairReport {
    /// Record keys examined
    pub scanned: usize,
    /// Rows inserted or refreshed from snapshots
    pub inserted_or_updated: usize,
    /// Rows removed because their record has no snapshots
    pub removed: usize,
    /// Keys already consistent
    pub unchanged: usize,
}

impl RepairReport {
    /// Fold one key's result into the report.
    pub fn record(&mut self, action: KeyRepair) {
        self.scanned += 1;
        match action {
            KeyRepair::Upserted => self.inserted_or_updated += 1,
            KeyRepair::Removed => self.removed += 1,
            KeyRepair::Unchanged => self.unchanged += 1,
        }
    }

    /// Returns true if repair changed nothing.
    pub fn is_clean(&self) -> bool {
        self.inserted_or_updated == 0 && self.removed == 0
    }
}

/// What repair did for one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRepair {
    /// Row inserted or refreshed
    Upserted,
    /// Orphan row removed
    Removed,
    /// Nothing to do
    Unchanged,
}

/// Bring the index row for `key` in line with its snapshots.
///
/// The caller must hold `key`'s lock.
pub fn repair_key(
    store: &VersionStore,
    index: &RecordIndex,
    key: &RecordKey,
) -> StoreResult<KeyRepair> {
    let latest = store.latest_snapshot(key)?;
    let row = index.get(key)?;

    let action = match (latest, row) {
        (Some(snapshot), Some(row)) if row.latest_version == snapshot.version => {
            KeyRepair::Unchanged
        }
        (Some(snapshot), _) => {
            index.upsert(key, &snapshot.document.index_fields(), snapshot.version)?;
            KeyRepair::Upserted
        }
        (None, Some(_)) => {
            index.delete(key)?;
            KeyRepair::Removed
        }
        (None, None) => KeyRepair::Unchanged,
    };

    if action != KeyRepair::Unchanged {
        debug!(target: "tcestore::repair", key = %key, action = ?action, "Index row repaired");
    }
    Ok(action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tcestore_core::{Document, IndexFields};
    use tempfile::TempDir;

    fn setup() -> (TempDir, VersionStore, RecordIndex) {
        let dir = TempDir::new().unwrap();
        let store = VersionStore::open(dir.path()).unwrap().with_sync_writes(false);
        (dir, store, RecordIndex::in_memory().unwrap())
    }

    fn write(store: &VersionStore, key: &RecordKey, version: u32, name: &str) {
        store.ensure_directory(key).unwrap();
        let document =
            Document::new(json!({"idUnico": key.as_str(), "nomeEstagiario": name})).unwrap();
        store.write_snapshot(key, version, &document).unwrap();
    }

    #[test]
    fn test_missing_row_is_inserted() {
        let (_dir, store, index) = setup();
        let key = RecordKey::new("A").unwrap();
        write(&store, &key, 1, "Maria");

        assert_eq!(repair_key(&store, &index, &key).unwrap(), KeyRepair::Upserted);
        let row = index.get(&key).unwrap().unwrap();
        assert_eq!(row.latest_version, 1);
        assert_eq!(row.intern_name.as_deref(), Some("Maria"));
    }

    #[test]
    fn test_stale_row_is_refreshed() {
        let (_dir, store, index) = setup();
        let key = RecordKey::new("A").unwrap();
        write(&store, &key, 1, "Maria");
        index.upsert(&key, &IndexFields::default(), 1).unwrap();
        write(&store, &key, 2, "Maria Silva");

        assert_eq!(repair_key(&store, &index, &key).unwrap(), KeyRepair::Upserted);
        let row = index.get(&key).unwrap().unwrap();
        assert_eq!(row.latest_version, 2);
        assert_eq!(row.intern_name.as_deref(), Some("Maria Silva"));
    }

    #[test]
    fn test_orphan_row_is_removed() {
        let (_dir, store, index) = setup();
        let key = RecordKey::new("ghost").unwrap();
        index.upsert(&key, &IndexFields::default(), 4).unwrap();

        assert_eq!(repair_key(&store, &index, &key).unwrap(), KeyRepair::Removed);
        assert!(index.get(&key).unwrap().is_none());
    }

    #[test]
    fn test_consistent_key_is_unchanged() {
        let (_dir, store, index) = setup();
        let key = RecordKey::new("A").unwrap();
        write(&store, &key, 1, "Maria");
        repair_key(&store, &index, &key).unwrap();

        assert_eq!(repair_key(&store, &index, &key).unwrap(), KeyRepair::Unchanged);
    }

    #[test]
    fn test_report_tally() {
        let mut report = RepairReport::default();
        report.record(KeyRepair::Upserted);
        report.record(KeyRepair::Unchanged);
        report.record(KeyRepair::Removed);
        report.record(KeyRepair::Unchanged);

        assert_eq!(
            report,
            RepairReport {
                scanned: 4,
                inserted_or_updated: 1,
                removed: 1,
                unchanged: 2,
            }
        );
        assert!(!report.is_clean());
    }
}
