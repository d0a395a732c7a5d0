//! Fingerprint and submit benchmarks.
//!
//! - `fingerprint/*`: canonical serialization plus hashing, no I/O
//! - `submit_unchanged/*`: full submit path when the document matches the
//!   latest snapshot (read + fingerprint, no write)
//!
//! ```bash
//! cargo bench --bench fingerprint
//! ```

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::{json, Value};
use tcestore::{DenyAll, Document, FingerprintStrategy, OpenOptions, TceStore};
use tempfile::TempDir;

/// Document with `fields` extra string fields, shaped like a real record.
fn make_document(fields: usize) -> Value {
    let mut obj = serde_json::Map::new();
    obj.insert("idUnico".into(), json!("bench-0001"));
    obj.insert("nomeEstagiario".into(), json!("Maria Souza"));
    obj.insert("nomeEmpresa".into(), json!("Acme Ltda"));
    for i in 0..fields {
        obj.insert(format!("campo{:04}", i), json!(format!("valor {}", i)));
    }
    Value::Object(obj)
}

fn bench_fingerprint(c: &mut Criterion) {
    let mut group = c.benchmark_group("fingerprint");
    for fields in [10usize, 100, 1_000] {
        let doc = Document::new(make_document(fields)).unwrap();
        group.throughput(Throughput::Bytes(doc.to_compact_string().len() as u64));
        for strategy in [FingerprintStrategy::Exact, FingerprintStrategy::Sha256] {
            group.bench_with_input(
                BenchmarkId::new(strategy.as_str(), fields),
                &doc,
                |b, doc| b.iter(|| black_box(strategy.fingerprint(black_box(doc)))),
            );
        }
    }
    group.finish();
}

fn bench_submit_unchanged(c: &mut Criterion) {
    let mut group = c.benchmark_group("submit_unchanged");
    for strategy in ["exact", "sha256"] {
        let dir = TempDir::new().unwrap();
        let store = TceStore::open_with(
            dir.path(),
            OpenOptions::new().fingerprint(strategy).sync_writes(false),
        )
        .unwrap()
        .with_authorizer(Arc::new(DenyAll));
        let doc = make_document(100);
        store.submit(doc.clone()).unwrap();

        group.bench_function(strategy, |b| {
            b.iter(|| black_box(store.submit(doc.clone()).unwrap()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_fingerprint, bench_submit_unchanged);
criterion_main!(benches);
