//! Multi-reader/single-writer isolation across the public API.

use ridgedb::{Database, EnvBuilder};
use std::sync::Arc;
use tempfile::TempDir;

#[test]
fn readers_do_not_see_uncommitted_writes() {
    let dir = TempDir::new().unwrap();
    let env = Arc::new(EnvBuilder::new().map_size(10 * 1024 * 1024).open(dir.path()).unwrap());

    let db: Database<String, String> = {
        let mut txn = env.write_txn().unwrap();
        let db = env.create_database(&mut txn, None).unwrap();
        db.put(&mut txn, "k".to_string(), "v0".to_string()).unwrap();
        txn.commit().unwrap();
        db
    };

    let reader = env.read_txn().unwrap();

    let mut writer = env.write_txn().unwrap();
    db.put(&mut writer, "k".to_string(), "v1".to_string()).unwrap();
    // Uncommitted: the existing reader must still see v0.
    assert_eq!(db.get(&reader, &"k".to_string()).unwrap(), Some("v0".to_string()));
    writer.commit().unwrap();

    // Still the old snapshot even after commit, since the reader started earlier.
    assert_eq!(db.get(&reader, &"k".to_string()).unwrap(), Some("v0".to_string()));

    let fresh_reader = env.read_txn().unwrap();
    assert_eq!(db.get(&fresh_reader, &"k".to_string()).unwrap(), Some("v1".to_string()));
}

#[test]
fn a_second_write_transaction_waits_behind_the_first() {
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    let dir = TempDir::new().unwrap();
    let env = Arc::new(EnvBuilder::new().map_size(10 * 1024 * 1024).open(dir.path()).unwrap());
    {
        let mut txn = env.write_txn().unwrap();
        let _db: Database<String, String> = env.create_database(&mut txn, None).unwrap();
        txn.commit().unwrap();
    }

    let first = env.write_txn().unwrap();
    let (tx, rx) = mpsc::channel();
    let env2 = Arc::clone(&env);
    let handle = thread::spawn(move || {
        let _second = env2.write_txn().unwrap();
        tx.send(()).unwrap();
    });

    // The second writer must not acquire the lock while the first is open.
    assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
    drop(first);
    assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
    handle.join().unwrap();
}

#[test]
fn reader_count_tracks_active_transactions() {
    let dir = TempDir::new().unwrap();
    let env = Arc::new(EnvBuilder::new().max_readers(10).open(dir.path()).unwrap());

    let r1 = env.read_txn().unwrap();
    let r2 = env.read_txn().unwrap();
    drop(r1);
    let r3 = env.read_txn().unwrap();
    drop(r2);
    drop(r3);
}
