//! Micro-benchmarks for B+tree operations.
//!
//! Focuses on profiling individual operations (insert, search, cursor scan)
//! to identify performance bottlenecks in isolation from end-to-end workloads.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ridgedb::{Database, EnvBuilder};
use std::sync::Arc;
use tempfile::TempDir;

fn bench_insert_sequential(c: &mut Criterion) {
    let mut group = c.benchmark_group("btree_insert_sequential");

    for size in [10, 50, 100, 200] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter_batched(
                || {
                    let dir = TempDir::new().unwrap();
                    let env = Arc::new(
                        EnvBuilder::new().map_size(100 * 1024 * 1024).open(dir.path()).unwrap(),
                    );
                    let mut txn = env.write_txn().unwrap();
                    let db: Database<Vec<u8>, Vec<u8>> =
                        env.create_database(&mut txn, None).unwrap();
                    txn.commit().unwrap();
                    (env, db, dir)
                },
                |(env, db, _dir)| {
                    let mut txn = env.write_txn().unwrap();
                    for i in 0..size {
                        let key = format!("key_{:08}", i).into_bytes();
                        let value = vec![42u8; 100];
                        db.put(&mut txn, key, value).unwrap();
                    }
                    txn.commit().unwrap();
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_search_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("btree_search");

    let dir = TempDir::new().unwrap();
    let env = Arc::new(EnvBuilder::new().map_size(100 * 1024 * 1024).open(dir.path()).unwrap());

    let mut txn = env.write_txn().unwrap();
    let db: Database<Vec<u8>, Vec<u8>> = env.create_database(&mut txn, None).unwrap();
    for i in 0..1000 {
        let key = format!("key_{:08}", i).into_bytes();
        let value = vec![42u8; 100];
        db.put(&mut txn, key, value).unwrap();
    }
    txn.commit().unwrap();

    group.bench_function("search_existing", |b| {
        b.iter(|| {
            let txn = env.read_txn().unwrap();
            let key = format!("key_{:08}", 500).into_bytes();
            black_box(db.get(&txn, &key).unwrap());
        });
    });

    group.bench_function("search_non_existing", |b| {
        b.iter(|| {
            let txn = env.read_txn().unwrap();
            let key = b"non_existing_key".to_vec();
            black_box(db.get(&txn, &key).unwrap());
        });
    });

    group.finish();
}

fn bench_cursor_scan(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let env = Arc::new(EnvBuilder::new().map_size(100 * 1024 * 1024).open(dir.path()).unwrap());

    let mut txn = env.write_txn().unwrap();
    let db: Database<Vec<u8>, Vec<u8>> = env.create_database(&mut txn, None).unwrap();
    for i in 0..1000 {
        let key = format!("key_{:08}", i).into_bytes();
        db.put(&mut txn, key, vec![7u8; 32]).unwrap();
    }
    txn.commit().unwrap();

    c.bench_function("cursor_full_scan", |b| {
        b.iter(|| {
            let txn = env.read_txn().unwrap();
            let mut cursor = db.cursor(&txn).unwrap();
            let mut count = 0;
            while cursor.next().unwrap().is_some() {
                count += 1;
            }
            black_box(count);
        });
    });
}

criterion_group!(benches, bench_insert_sequential, bench_search_operations, bench_cursor_scan);
criterion_main!(benches);
