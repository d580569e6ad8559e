//! Named-database registry.
//!
//! Every named database (everything opened through
//! [`crate::env::Environment::create_database`] with a `Some(name)`) gets an
//! entry in the main database: the name is the key, and the value is its
//! [`DbInfo`] descriptor (root page, counters, flags) encoded with
//! `byteorder`. Opening a named database after a reopen is just a catalog
//! lookup followed by a normal B+Tree descent from the stored root.

use crate::btree::BTree;
use crate::comparator::LexicographicComparator;
use crate::error::{Error, PageId, Result};
use crate::meta::DbInfo;
use crate::txn::{Transaction, Write};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::Cursor;

/// Size of an encoded [`DbInfo`]: 6 `u32`/`u64` counters plus two page ids.
const DB_INFO_ENCODED_SIZE: usize = 4 + 4 + 8 + 8 + 8 + 8 + 8 + 8;

/// Database catalog stored in the main database
pub struct Catalog;

impl Catalog {
    /// Store a database in the catalog
    pub fn put_database(
        txn: &mut Transaction<'_, Write>,
        name: &str,
        info: &DbInfo,
    ) -> Result<()> {
        // Get the main database info and clone it
        let main_db = *txn.db_info(None)?;
        
        // Serialize the database name and info
        let key = name.as_bytes();
        let value = Self::serialize_db_info(info);
        
        // Insert into the main database B+Tree
        let mut root = main_db.root;
        let mut updated_info = main_db;
        BTree::<LexicographicComparator>::insert(txn, &mut root, &mut updated_info, key, &value)?;
        
        // Update the main database info if changed
        if root != main_db.root || updated_info.entries != main_db.entries {
            updated_info.root = root;
            txn.update_db_info(None, updated_info)?;
        }
        
        Ok(())
    }
    
    /// Get a database from the catalog
    pub fn get_database<M: crate::txn::mode::Mode>(
        txn: &Transaction<'_, M>,
        name: &str,
    ) -> Result<Option<DbInfo>> {
        // Get the main database info
        let main_db = txn.db_info(None)?;
        
        if main_db.root == PageId(0) {
            // Empty catalog
            return Ok(None);
        }
        
        // Search in the main database B+Tree
        let key = name.as_bytes();
        match BTree::<LexicographicComparator>::search(txn, main_db.root, key)? {
            Some(value) => Ok(Some(Self::deserialize_db_info(&value)?)),
            None => Ok(None),
        }
    }
    
    /// List all databases in the catalog
    pub fn list_databases<M: crate::txn::mode::Mode>(
        txn: &Transaction<'_, M>,
    ) -> Result<Vec<(String, DbInfo)>> {
        let main_db = txn.db_info(None)?;
        
        if main_db.root == PageId(0) {
            return Ok(Vec::new());
        }
        
        let mut databases = Vec::new();

        // Depth-first, in-order walk: push a branch's children right-to-left
        // so they pop left-to-right, with the leftmost child (which has no
        // node of its own — it lives in the branch header) pushed last.
        let mut stack = vec![main_db.root];

        while let Some(page_id) = stack.pop() {
            let page = txn.get_page(page_id)?;

            if page.header.flags.contains(crate::page::PageFlags::LEAF) {
                for i in 0..page.header.num_keys as usize {
                    let node = page.node(i)?;
                    let key = node.key()?;
                    let value = node.value()?;

                    if let Ok(name) = String::from_utf8(key.to_vec()) {
                        if let Ok(info) = Self::deserialize_db_info(&value) {
                            databases.push((name, info));
                        }
                    }
                }
            } else {
                for i in (0..page.header.num_keys as usize).rev() {
                    let node = page.node(i)?;
                    stack.push(node.page_number()?);
                }
                stack.push(crate::branch::BranchPage::get_leftmost_child(page)?);
            }
        }

        Ok(databases)
    }
    
    /// Remove a database from the catalog
    pub fn remove_database(
        txn: &mut Transaction<'_, Write>,
        name: &str,
    ) -> Result<bool> {
        // Get the main database info and clone it
        let main_db = *txn.db_info(None)?;
        
        if main_db.root == PageId(0) {
            return Ok(false);
        }
        
        // Delete from the main database B+Tree
        let key = name.as_bytes();
        let mut root = main_db.root;
        let mut updated_info = main_db;
        let result = BTree::<LexicographicComparator>::delete(txn, &mut root, &mut updated_info, key)?;
        let deleted = result.is_some();
        
        // Update the main database info if changed
        if root != main_db.root || deleted {
            updated_info.root = root;
            txn.update_db_info(None, updated_info)?;
        }
        
        Ok(deleted)
    }
    
    /// Serialize a `DbInfo` for storage as a catalog entry's value.
    pub fn serialize_db_info(info: &DbInfo) -> Vec<u8> {
        let mut buf = Vec::with_capacity(DB_INFO_ENCODED_SIZE);
        buf.write_u32::<LittleEndian>(info.flags).unwrap();
        buf.write_u32::<LittleEndian>(info.depth).unwrap();
        buf.write_u64::<LittleEndian>(info.branch_pages).unwrap();
        buf.write_u64::<LittleEndian>(info.leaf_pages).unwrap();
        buf.write_u64::<LittleEndian>(info.overflow_pages).unwrap();
        buf.write_u64::<LittleEndian>(info.entries).unwrap();
        buf.write_u64::<LittleEndian>(info.root.0).unwrap();
        buf.write_u64::<LittleEndian>(info.last_key_page.0).unwrap();
        buf
    }

    /// Deserialize a `DbInfo` previously written by [`Self::serialize_db_info`].
    pub fn deserialize_db_info(data: &[u8]) -> Result<DbInfo> {
        if data.len() < DB_INFO_ENCODED_SIZE {
            return Err(Error::Decoding("truncated DbInfo catalog entry".into()));
        }

        let mut cursor = Cursor::new(data);
        let flags = cursor.read_u32::<LittleEndian>().unwrap();
        let depth = cursor.read_u32::<LittleEndian>().unwrap();
        let branch_pages = cursor.read_u64::<LittleEndian>().unwrap();
        let leaf_pages = cursor.read_u64::<LittleEndian>().unwrap();
        let overflow_pages = cursor.read_u64::<LittleEndian>().unwrap();
        let entries = cursor.read_u64::<LittleEndian>().unwrap();
        let root = PageId(cursor.read_u64::<LittleEndian>().unwrap());
        let last_key_page = PageId(cursor.read_u64::<LittleEndian>().unwrap());

        Ok(DbInfo { flags, depth, branch_pages, leaf_pages, overflow_pages, entries, root, last_key_page })
    }
}
