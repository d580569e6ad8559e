//! Sorted-duplicate (DUP_SORT) database behavior.

use ridgedb::db::DatabaseFlags;
use ridgedb::{Database, EnvBuilder, Error};
use std::sync::Arc;
use tempfile::TempDir;

#[test]
fn duplicates_are_returned_in_sorted_order() {
    let dir = TempDir::new().unwrap();
    let env = Arc::new(EnvBuilder::new().map_size(10 * 1024 * 1024).open(dir.path()).unwrap());

    let db: Database<String, String> = {
        let mut txn = env.write_txn().unwrap();
        let db =
            env.create_database_with_flags(&mut txn, Some("dups"), DatabaseFlags::DUP_SORT).unwrap();
        db.put_dup(&mut txn, "k".to_string(), "charlie".to_string()).unwrap();
        db.put_dup(&mut txn, "k".to_string(), "alpha".to_string()).unwrap();
        db.put_dup(&mut txn, "k".to_string(), "bravo".to_string()).unwrap();
        txn.commit().unwrap();
        db
    };

    let txn = env.read_txn().unwrap();
    let values = db.get_all(&txn, &"k".to_string()).unwrap();
    assert_eq!(values, vec!["alpha".to_string(), "bravo".to_string(), "charlie".to_string()]);
}

#[test]
fn delete_dup_removes_only_the_matching_value() {
    let dir = TempDir::new().unwrap();
    let env = Arc::new(EnvBuilder::new().map_size(10 * 1024 * 1024).open(dir.path()).unwrap());

    let db: Database<String, String> = {
        let mut txn = env.write_txn().unwrap();
        let db =
            env.create_database_with_flags(&mut txn, Some("dups"), DatabaseFlags::DUP_SORT).unwrap();
        db.put_dup(&mut txn, "k".to_string(), "a".to_string()).unwrap();
        db.put_dup(&mut txn, "k".to_string(), "b".to_string()).unwrap();
        txn.commit().unwrap();
        db
    };

    let mut txn = env.write_txn().unwrap();
    assert!(db.delete_dup(&mut txn, &"k".to_string(), &"a".to_string()).unwrap());
    txn.commit().unwrap();

    let txn = env.read_txn().unwrap();
    assert_eq!(db.get_all(&txn, &"k".to_string()).unwrap(), vec!["b".to_string()]);
}

#[test]
fn no_dup_data_rejects_exact_duplicate_but_allows_new_value() {
    let dir = TempDir::new().unwrap();
    let env = Arc::new(EnvBuilder::new().map_size(10 * 1024 * 1024).open(dir.path()).unwrap());

    let mut txn = env.write_txn().unwrap();
    let db: Database<String, String> =
        env.create_database_with_flags(&mut txn, Some("dups"), DatabaseFlags::DUP_SORT).unwrap();
    db.put_dup(&mut txn, "k".to_string(), "a".to_string()).unwrap();
    db.put_dup(&mut txn, "k".to_string(), "b".to_string()).unwrap();

    let err = db.put_dup_no_dup_data(&mut txn, "k".to_string(), "a".to_string()).unwrap_err();
    assert!(matches!(err, Error::KeyExist));

    db.put_dup_no_dup_data(&mut txn, "k".to_string(), "c".to_string()).unwrap();
    txn.commit().unwrap();

    let txn = env.read_txn().unwrap();
    assert_eq!(
        db.get_all(&txn, &"k".to_string()).unwrap(),
        vec!["a".to_string(), "b".to_string(), "c".to_string()]
    );
}

#[test]
fn distinct_keys_keep_independent_duplicate_sets() {
    let dir = TempDir::new().unwrap();
    let env = Arc::new(EnvBuilder::new().map_size(10 * 1024 * 1024).open(dir.path()).unwrap());

    let mut txn = env.write_txn().unwrap();
    let db: Database<String, String> =
        env.create_database_with_flags(&mut txn, Some("dups"), DatabaseFlags::DUP_SORT).unwrap();
    db.put_dup(&mut txn, "key1".to_string(), "a".to_string()).unwrap();
    db.put_dup(&mut txn, "key2".to_string(), "x".to_string()).unwrap();
    db.put_dup(&mut txn, "key2".to_string(), "y".to_string()).unwrap();
    txn.commit().unwrap();

    let txn = env.read_txn().unwrap();
    assert_eq!(db.get_all(&txn, &"key1".to_string()).unwrap(), vec!["a".to_string()]);
    assert_eq!(db.get_all(&txn, &"key2".to_string()).unwrap().len(), 2);
}
