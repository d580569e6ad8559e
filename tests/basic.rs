//! End-to-end CRUD and reopen tests against a real database file.

use ridgedb::{Database, EnvBuilder, Error};
use std::sync::Arc;
use tempfile::TempDir;

#[test]
fn put_get_delete_roundtrip() {
    let dir = TempDir::new().unwrap();
    let env = Arc::new(EnvBuilder::new().map_size(10 * 1024 * 1024).open(dir.path()).unwrap());

    let db: Database<String, String> = {
        let mut txn = env.write_txn().unwrap();
        let db = env.create_database(&mut txn, Some("test_db")).unwrap();
        db.put(&mut txn, "hello".to_string(), "world".to_string()).unwrap();
        txn.commit().unwrap();
        db
    };

    let txn = env.read_txn().unwrap();
    assert_eq!(db.get(&txn, &"hello".to_string()).unwrap(), Some("world".to_string()));
    assert_eq!(db.get(&txn, &"missing".to_string()).unwrap(), None);
    drop(txn);

    let mut txn = env.write_txn().unwrap();
    assert!(db.delete(&mut txn, &"hello".to_string()).unwrap());
    txn.commit().unwrap();

    let txn = env.read_txn().unwrap();
    assert_eq!(db.get(&txn, &"hello".to_string()).unwrap(), None);
}

#[test]
fn many_keys_survive_reopen() {
    let dir = TempDir::new().unwrap();

    {
        let env = Arc::new(EnvBuilder::new().map_size(64 * 1024 * 1024).open(dir.path()).unwrap());
        let mut txn = env.write_txn().unwrap();
        let db: Database<Vec<u8>, Vec<u8>> = env.create_database(&mut txn, None).unwrap();
        for i in 0..2_000u32 {
            let key = format!("key_{:06}", i).into_bytes();
            db.put(&mut txn, key, vec![(i % 256) as u8; 64]).unwrap();
        }
        txn.commit().unwrap();
    }

    // Reopen from scratch and verify every key is still there, in order.
    let env = Arc::new(EnvBuilder::new().map_size(64 * 1024 * 1024).open(dir.path()).unwrap());
    let txn = env.read_txn().unwrap();
    let db: Database<Vec<u8>, Vec<u8>> = env.open_database(&txn, None).unwrap();
    for i in 0..2_000u32 {
        let key = format!("key_{:06}", i).into_bytes();
        assert_eq!(db.get(&txn, &key).unwrap(), Some(vec![(i % 256) as u8; 64]));
    }
}

#[test]
fn overwrite_replaces_value() {
    let dir = TempDir::new().unwrap();
    let env = Arc::new(EnvBuilder::new().map_size(10 * 1024 * 1024).open(dir.path()).unwrap());
    let mut txn = env.write_txn().unwrap();
    let db: Database<String, String> = env.create_database(&mut txn, None).unwrap();

    db.put(&mut txn, "k".to_string(), "v1".to_string()).unwrap();
    db.put(&mut txn, "k".to_string(), "v2".to_string()).unwrap();
    txn.commit().unwrap();

    let txn = env.read_txn().unwrap();
    assert_eq!(db.get(&txn, &"k".to_string()).unwrap(), Some("v2".to_string()));
}

#[test]
fn put_no_overwrite_rejects_existing_key() {
    let dir = TempDir::new().unwrap();
    let env = Arc::new(EnvBuilder::new().map_size(10 * 1024 * 1024).open(dir.path()).unwrap());
    let mut txn = env.write_txn().unwrap();
    let db: Database<String, String> = env.create_database(&mut txn, None).unwrap();

    db.put_no_overwrite(&mut txn, "k".to_string(), "first".to_string()).unwrap();
    let err = db.put_no_overwrite(&mut txn, "k".to_string(), "second".to_string()).unwrap_err();
    assert!(matches!(err, Error::KeyExist));
    txn.commit().unwrap();

    let txn = env.read_txn().unwrap();
    assert_eq!(db.get(&txn, &"k".to_string()).unwrap(), Some("first".to_string()));
}

#[test]
fn named_databases_are_independent() {
    let dir = TempDir::new().unwrap();
    let env = Arc::new(EnvBuilder::new().map_size(10 * 1024 * 1024).open(dir.path()).unwrap());

    let mut txn = env.write_txn().unwrap();
    let a: Database<String, String> = env.create_database(&mut txn, Some("a")).unwrap();
    let b: Database<String, String> = env.create_database(&mut txn, Some("b")).unwrap();
    a.put(&mut txn, "k".to_string(), "from-a".to_string()).unwrap();
    b.put(&mut txn, "k".to_string(), "from-b".to_string()).unwrap();
    txn.commit().unwrap();

    let txn = env.read_txn().unwrap();
    assert_eq!(a.get(&txn, &"k".to_string()).unwrap(), Some("from-a".to_string()));
    assert_eq!(b.get(&txn, &"k".to_string()).unwrap(), Some("from-b".to_string()));
}
