//! Quick ops/sec benchmark without full criterion setup.

use ridgedb::{Database, EnvBuilder};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn format_duration(d: Duration) -> String {
    if d.as_secs() > 0 {
        format!("{:.2}s", d.as_secs_f64())
    } else if d.as_millis() > 0 {
        format!("{:.2}ms", d.as_millis() as f64)
    } else {
        format!("{:.2}\u{3bc}s", d.as_micros() as f64)
    }
}

fn bench_sequential_writes() {
    println!("\n=== Sequential Write Benchmark ===");
    println!("Writing 100,000 key-value pairs (16 byte keys, 100 byte values)");

    let data: Vec<(Vec<u8>, Vec<u8>)> = (0..100_000)
        .map(|i| {
            let key = format!("key_{:08}", i).into_bytes();
            let value = vec![i as u8; 100];
            (key, value)
        })
        .collect();

    let dir = TempDir::new().unwrap();
    let env =
        Arc::new(EnvBuilder::new().map_size(512 * 1024 * 1024).open(dir.path()).unwrap());

    let start = Instant::now();
    let mut txn = env.write_txn().unwrap();
    let db: Database<Vec<u8>, Vec<u8>> = env.create_database(&mut txn, None).unwrap();
    for (key, value) in &data {
        db.put(&mut txn, key.clone(), value.clone()).unwrap();
    }
    txn.commit().unwrap();
    let duration = start.elapsed();

    println!(
        "ridgedb: {} ({:.0} ops/sec)",
        format_duration(duration),
        100_000.0 / duration.as_secs_f64()
    );
}

fn bench_random_reads() {
    println!("\n=== Random Read Benchmark ===");

    let dir = TempDir::new().unwrap();
    let env =
        Arc::new(EnvBuilder::new().map_size(512 * 1024 * 1024).open(dir.path()).unwrap());

    let mut txn = env.write_txn().unwrap();
    let db: Database<Vec<u8>, Vec<u8>> = env.create_database(&mut txn, None).unwrap();
    for i in 0..10_000 {
        let key = format!("key_{:08}", i).into_bytes();
        db.put(&mut txn, key, vec![1u8; 100]).unwrap();
    }
    txn.commit().unwrap();

    let rtxn = env.read_txn().unwrap();
    let start = Instant::now();
    for i in 0..10_000 {
        let key = format!("key_{:08}", (i * 7919) % 10_000).into_bytes();
        db.get(&rtxn, &key).unwrap();
    }
    let duration = start.elapsed();

    println!(
        "ridgedb: {} ({:.0} ops/sec)",
        format_duration(duration),
        10_000.0 / duration.as_secs_f64()
    );
}

fn main() {
    bench_sequential_writes();
    bench_random_reads();
}
