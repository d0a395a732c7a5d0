//! Integration tests for the version store
//!
//! These tests exercise the on-disk layout directly:
//! - version numbering and ordering
//! - tolerance of foreign and leftover files
//! - crash leftovers from interrupted writes
//! - deletion and key listing

use std::fs;

use proptest::prelude::*;
use serde_json::json;
use tcestore_core::{Document, RecordKey, StoreError};
use tcestore_storage::VersionStore;
use tempfile::TempDir;

// ============================================================================
// Helper Functions
// ============================================================================

fn store(dir: &TempDir) -> VersionStore {
    VersionStore::open(dir.path()).unwrap().with_sync_writes(false)
}

fn key(s: &str) -> RecordKey {
    RecordKey::new(s).unwrap()
}

fn doc(n: u32) -> Document {
    Document::new(json!({ "idUnico": "A", "n": n })).unwrap()
}

/// Append the next version the way the reconciler does.
fn append(store: &VersionStore, key: &RecordKey, n: u32) -> u32 {
    store.ensure_directory(key).unwrap();
    let version = store.next_version_number(key).unwrap();
    store.write_snapshot(key, version, &doc(n)).unwrap();
    version
}

// ============================================================================
// Numbering
// ============================================================================

#[test]
fn test_new_key_starts_at_one() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    assert_eq!(store.next_version_number(&key("A")).unwrap(), 1);
    assert_eq!(store.latest_version(&key("A")).unwrap(), None);
}

#[test]
fn test_versions_listed_descending() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    let k = key("A");
    for n in 0..12 {
        append(&store, &k, n);
    }
    assert_eq!(store.list_versions(&k).unwrap(), (1..=12).rev().collect::<Vec<_>>());
    assert_eq!(store.latest_snapshot(&k).unwrap().unwrap().document, doc(11));
}

#[test]
fn test_numbering_past_three_digits() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    let k = key("A");
    store.ensure_directory(&k).unwrap();
    store.write_snapshot(&k, 999, &doc(999)).unwrap();

    assert_eq!(store.next_version_number(&k).unwrap(), 1000);
    let path = store.write_snapshot(&k, 1000, &doc(1000)).unwrap();
    assert!(path.ends_with("1000.json"));
    assert_eq!(store.list_versions(&k).unwrap(), vec![1000, 999]);
}

#[test]
fn test_existing_version_never_overwritten() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    let k = key("A");
    append(&store, &k, 1);

    let err = store.write_snapshot(&k, 1, &doc(2)).unwrap_err();
    assert!(matches!(err, StoreError::VersionConflict { version: 1, .. }));
    assert_eq!(store.read_snapshot(&k, 1).unwrap(), doc(1));
}

// ============================================================================
// Foreign files
// ============================================================================

#[test]
fn test_foreign_entries_skipped() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    let k = key("A");
    append(&store, &k, 1);

    let record_dir = store.record_dir(&k);
    for name in ["readme.txt", "x.json", "000.json", "1.json", "99999999999.json", "002.json.tmp"] {
        fs::write(record_dir.join(name), "{}").unwrap();
    }
    fs::create_dir(record_dir.join("003.json")).unwrap();

    assert_eq!(store.list_versions(&k).unwrap(), vec![1]);
    assert_eq!(append(&store, &k, 2), 2);
}

#[test]
fn test_directory_in_snapshot_slot_is_storage_error() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    let k = key("A");
    store.ensure_directory(&k).unwrap();
    store.write_snapshot(&k, 1, &doc(1)).unwrap();
    fs::create_dir(store.snapshot_path(&k, 2)).unwrap();

    // The directory is not a version, so version 2 is still next
    assert_eq!(store.next_version_number(&k).unwrap(), 2);

    let err = store.write_snapshot(&k, 2, &doc(2)).unwrap_err();
    match err {
        StoreError::Storage(msg) => assert!(msg.contains("002.json"), "{}", msg),
        other => panic!("expected Storage, got {:?}", other),
    }

    fs::remove_dir(store.snapshot_path(&k, 2)).unwrap();
    store.write_snapshot(&k, 2, &doc(2)).unwrap();
    assert_eq!(store.list_versions(&k).unwrap(), vec![2, 1]);
}

#[test]
fn test_corrupt_snapshot_is_serialization_error() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    let k = key("A");
    store.ensure_directory(&k).unwrap();
    fs::write(store.snapshot_path(&k, 1), "{ not json").unwrap();

    let err = store.read_snapshot(&k, 1).unwrap_err();
    assert!(matches!(err, StoreError::Serialization(_)));
}

#[test]
fn test_read_missing() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    let k = key("A");

    let err = store.read_snapshot(&k, 1).unwrap_err();
    assert!(matches!(err, StoreError::NotFound { version: None, .. }));

    append(&store, &k, 1);
    let err = store.read_snapshot(&k, 5).unwrap_err();
    assert!(matches!(err, StoreError::NotFound { version: Some(5), .. }));
}

// ============================================================================
// Deletion and key listing
// ============================================================================

#[test]
fn test_delete_all_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    let k = key("A");
    append(&store, &k, 1);
    append(&store, &k, 2);

    assert!(store.delete_all(&k).unwrap());
    assert!(!store.delete_all(&k).unwrap());
    assert!(store.list_versions(&k).unwrap().is_empty());
    assert_eq!(store.next_version_number(&k).unwrap(), 1);
}

#[test]
fn test_list_keys_skips_invalid_directories() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    append(&store, &key("b"), 1);
    append(&store, &key("a"), 1);
    store.ensure_directory(&key("empty")).unwrap();
    fs::create_dir(dir.path().join(".hidden")).unwrap();
    fs::write(dir.path().join("stray.json"), "{}").unwrap();

    let keys: Vec<String> = store
        .list_keys()
        .unwrap()
        .into_iter()
        .map(String::from)
        .collect();
    assert_eq!(keys, vec!["a", "b", "empty"]);
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Appending N snapshots yields exactly versions 1..=N, highest first.
    #[test]
    fn prop_versions_contiguous(count in 1u32..30) {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let k = key("A");
        for n in 0..count {
            prop_assert_eq!(append(&store, &k, n), n + 1);
        }
        let expected: Vec<u32> = (1..=count).rev().collect();
        prop_assert_eq!(store.list_versions(&k).unwrap(), expected);
    }
}
