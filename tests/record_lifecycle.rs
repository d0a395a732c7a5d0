//! End-to-end record lifecycle through the public `TceStore` API.

use std::sync::Arc;

use serde_json::json;
use tcestore::{
    AccessMode, AllowAll, DenyAll, Error, OpenOptions, SharedSecret, Submitted, TceStore,
};
use tempfile::TempDir;

fn open(dir: &TempDir) -> TceStore {
    TceStore::open(dir.path())
        .unwrap()
        .with_authorizer(Arc::new(DenyAll))
}

#[test]
fn submit_unchanged_change_revert() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);

    let v1 = json!({"idUnico": "A", "nomeEstagiario": "Maria", "nomeEmpresa": "Acme"});
    let v2 = json!({"idUnico": "A", "nomeEstagiario": "Maria", "nomeEmpresa": "Beta"});

    assert_eq!(store.submit(v1.clone()).unwrap(), Submitted::Saved(1));
    assert_eq!(store.submit(v1.clone()).unwrap(), Submitted::Unchanged(1));
    assert_eq!(store.submit(v2.clone()).unwrap(), Submitted::Saved(2));
    // Reverting to older content still creates a new version
    assert_eq!(store.submit(v1.clone()).unwrap(), Submitted::Saved(3));

    assert_eq!(store.list_versions("A").unwrap(), vec![3, 2, 1]);
    assert_eq!(store.get_version("A", 2).unwrap(), v2);
    let (latest, doc) = store.get_latest("A").unwrap();
    assert_eq!(latest, 3);
    assert_eq!(doc, v1);

    let rows = store.list_records().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].latest_version, 3);
    assert_eq!(rows[0].company_name.as_deref(), Some("Acme"));
    assert!(rows[0].created_at <= rows[0].updated_at);
}

#[test]
fn key_order_does_not_create_versions() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);

    store
        .submit(json!({"idUnico": "K", "a": 1, "b": {"x": 1, "y": 2}}))
        .unwrap();
    let again = store
        .submit(json!({"b": {"y": 2, "x": 1}, "a": 1, "idUnico": "K"}))
        .unwrap();
    assert_eq!(again, Submitted::Unchanged(1));
}

#[test]
fn snapshot_files_are_pretty_json() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    store.submit(json!({"idUnico": "A", "n": 1})).unwrap();

    let path = dir.path().join("tce").join("A").join("001.json");
    let text = std::fs::read_to_string(path).unwrap();
    assert!(text.contains('\n'));
    let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed, json!({"idUnico": "A", "n": 1}));
}

#[test]
fn list_records_orders_by_intern_name() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    store
        .submit(json!({"idUnico": "1", "nomeEstagiario": "Zelia"}))
        .unwrap();
    store
        .submit(json!({"idUnico": "2", "nomeEstagiario": "Ana"}))
        .unwrap();

    let names: Vec<_> = store
        .list_records()
        .unwrap()
        .into_iter()
        .map(|r| r.intern_name)
        .collect();
    assert_eq!(names, vec![Some("Ana".to_string()), Some("Zelia".to_string())]);
}

#[test]
fn invalid_input_is_rejected() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);

    let missing = store.submit(json!({"nome": "x"})).unwrap_err();
    assert_eq!(missing.status_code(), 400);

    let traversal = store.submit_keyed("../etc", json!({"a": 1})).unwrap_err();
    assert!(matches!(traversal, Error::InvalidInput { .. }));

    let not_object = store.submit_keyed("A", json!([1, 2, 3])).unwrap_err();
    assert!(matches!(not_object, Error::InvalidInput { .. }));

    // Nothing was written for rejected input
    assert!(store.list_records().unwrap().is_empty());
}

#[test]
fn missing_records_and_versions() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    store.submit(json!({"idUnico": "A"})).unwrap();

    assert_eq!(
        store.get_latest("B").unwrap_err(),
        Error::RecordNotFound { key: "B".into() }
    );
    assert_eq!(
        store.get_version("A", 9).unwrap_err(),
        Error::VersionNotFound {
            key: "A".into(),
            version: 9
        }
    );
}

#[test]
fn delete_requires_authorization() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    store.submit(json!({"idUnico": "A"})).unwrap();

    let err = store.delete("A", Some("anything")).unwrap_err();
    assert_eq!(err.status_code(), 403);
    assert_eq!(store.list_versions("A").unwrap(), vec![1]);

    let store = store.with_authorizer(Arc::new(SharedSecret::new("s3cret").unwrap()));
    assert!(store.delete("A", Some("wrong")).is_err());
    assert!(store.delete("A", Some("s3cret")).unwrap());
    assert!(!dir.path().join("tce").join("A").exists());
    assert!(store.list_records().unwrap().is_empty());

    // Deleting again is not an error
    assert!(!store.delete("A", Some("s3cret")).unwrap());

    // A fresh submission starts over at version 1
    assert_eq!(
        store.submit(json!({"idUnico": "A"})).unwrap(),
        Submitted::Saved(1)
    );
}

#[test]
fn repair_restores_lost_index() {
    let dir = TempDir::new().unwrap();
    {
        let store = open(&dir);
        store
            .submit(json!({"idUnico": "A", "nomeEstagiario": "Maria"}))
            .unwrap();
        store
            .submit(json!({"idUnico": "A", "nomeEstagiario": "Maria B"}))
            .unwrap();
        store.submit(json!({"idUnico": "B"})).unwrap();
        store.shutdown().unwrap();
    }
    for name in ["index.sqlite", "index.sqlite-wal", "index.sqlite-shm"] {
        let _ = std::fs::remove_file(dir.path().join(name));
    }

    let store = open(&dir);
    assert!(store.list_records().unwrap().is_empty());

    let report = store.repair().unwrap();
    assert_eq!(report.scanned, 2);
    assert_eq!(report.inserted_or_updated, 2);

    let rows = store.list_records().unwrap();
    assert_eq!(rows.len(), 2);
    let a = rows.iter().find(|r| r.record_key == "A").unwrap();
    assert_eq!(a.latest_version, 2);
    assert_eq!(a.intern_name.as_deref(), Some("Maria B"));

    assert!(store.repair().unwrap().is_clean());
}

#[test]
fn read_only_handle_rejects_writes() {
    let dir = TempDir::new().unwrap();
    {
        let store = open(&dir);
        store.submit(json!({"idUnico": "A"})).unwrap();
    }

    let store = TceStore::open_with(
        dir.path(),
        OpenOptions::new().access_mode(AccessMode::ReadOnly),
    )
    .unwrap()
    .with_authorizer(Arc::new(AllowAll));
    assert_eq!(store.access_mode(), AccessMode::ReadOnly);

    assert!(matches!(
        store.submit(json!({"idUnico": "B"})).unwrap_err(),
        Error::AccessDenied { .. }
    ));
    assert!(matches!(
        store.delete("A", None).unwrap_err(),
        Error::AccessDenied { .. }
    ));
    assert!(matches!(
        store.repair().unwrap_err(),
        Error::AccessDenied { .. }
    ));
    assert_eq!(store.get_latest("A").unwrap().0, 1);
}

#[test]
fn exact_fingerprint_override_behaves_the_same() {
    let dir = TempDir::new().unwrap();
    let store = TceStore::open_with(dir.path(), OpenOptions::new().fingerprint("exact"))
        .unwrap()
        .with_authorizer(Arc::new(DenyAll));

    assert_eq!(
        store.submit(json!({"idUnico": "A", "x": 1})).unwrap(),
        Submitted::Saved(1)
    );
    assert_eq!(
        store.submit(json!({"x": 1, "idUnico": "A"})).unwrap(),
        Submitted::Unchanged(1)
    );

    let config = std::fs::read_to_string(dir.path().join("tcestore.toml")).unwrap();
    assert!(config.contains("exact"));
}

#[test]
fn operations_after_shutdown_fail() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    store.submit(json!({"idUnico": "A"})).unwrap();
    store.shutdown().unwrap();

    let err = store.submit(json!({"idUnico": "A", "n": 2})).unwrap_err();
    assert_eq!(err, Error::ShuttingDown);
    assert_eq!(err.status_code(), 503);
}
