//! Sorted-duplicate (`DUP_SORT`) value storage.
//!
//! A `DUP_SORT` database stores more than one value under a key, keeping the
//! values in comparator order. A lone duplicate is kept inline as a tagged
//! value in the main tree (`SINGLE_VALUE_MARKER`); once a second value is
//! inserted under the same key the pair is promoted to a nested B+Tree whose
//! keys *are* the duplicate values (`SUB_DB_MARKER`), so the existing
//! [`BTree`] machinery handles ordering, splits and merges for the sub-tree
//! without any duplicate-specific page format.

use crate::btree::BTree;
use crate::comparator::LexicographicComparator;
use crate::error::{Error, PageId, Result};
use crate::meta::DbInfo;
use crate::page::PageFlags;
use crate::txn::{Transaction, Write};

/// Tag byte stored before an inline single duplicate value.
const SINGLE_VALUE_MARKER: u8 = 0xFF;
/// Tag byte stored before an encoded [`DbInfo`] pointing at a duplicate sub-tree.
const SUB_DB_MARKER: u8 = 0xFE;

/// Free functions implementing `DUP_SORT` put/get/delete semantics on top of [`BTree`].
pub struct DupSort;

impl DupSort {
    /// Whether `flags` has `DUP_SORT` set.
    pub fn is_dupsort(flags: u32) -> bool {
        flags & crate::db::DatabaseFlags::DUP_SORT.bits() != 0
    }

    /// Whether `value` is an encoded sub-database descriptor.
    pub fn is_sub_db(value: &[u8]) -> bool {
        !value.is_empty()
            && value[0] == SUB_DB_MARKER
            && value.len() == 1 + std::mem::size_of::<DbInfo>()
    }

    /// Whether `value` is an inline single duplicate.
    pub fn is_single_value(value: &[u8]) -> bool {
        !value.is_empty() && value[0] == SINGLE_VALUE_MARKER
    }

    fn encode_single_value(value: &[u8]) -> Vec<u8> {
        let mut encoded = Vec::with_capacity(1 + value.len());
        encoded.push(SINGLE_VALUE_MARKER);
        encoded.extend_from_slice(value);
        encoded
    }

    /// Strip the marker byte from an inline single duplicate.
    pub fn decode_single_value(data: &[u8]) -> Result<&[u8]> {
        if !data.is_empty() && data[0] == SINGLE_VALUE_MARKER {
            Ok(&data[1..])
        } else {
            Err(Error::Custom("not an inline duplicate value".into()))
        }
    }

    fn new_sub_db(root: PageId) -> DbInfo {
        DbInfo {
            flags: crate::db::DatabaseFlags::DUP_SORT.bits(),
            depth: 0,
            branch_pages: 0,
            leaf_pages: 1,
            overflow_pages: 0,
            entries: 0,
            root,
            last_key_page: PageId(0),
        }
    }

    fn promote_to_sub_db(
        txn: &mut Transaction<'_, Write>,
        db_info: &mut DbInfo,
        key: &[u8],
        first_value: &[u8],
        second_value: &[u8],
    ) -> Result<()> {
        let (sub_root, _) = txn.alloc_page(PageFlags::LEAF)?;
        let mut sub_db = Self::new_sub_db(sub_root);

        let mut sub_root = sub_db.root;
        BTree::<LexicographicComparator>::insert(
            txn,
            &mut sub_root,
            &mut sub_db,
            first_value,
            &[],
        )?;
        BTree::<LexicographicComparator>::insert(
            txn,
            &mut sub_root,
            &mut sub_db,
            second_value,
            &[],
        )?;
        sub_db.root = sub_root;

        let encoded = Self::encode_sub_db(&sub_db);
        let mut root = db_info.root;
        BTree::<LexicographicComparator>::delete(txn, &mut root, db_info, key)?;
        BTree::<LexicographicComparator>::insert(txn, &mut root, db_info, key, &encoded)?;
        db_info.root = root;
        Ok(())
    }

    /// Insert `(key, value)`, promoting an inline single value to a sub-tree
    /// on the second distinct duplicate. Returns `true` if `key` was not
    /// present at all before this call.
    pub fn insert(
        txn: &mut Transaction<'_, Write>,
        db_info: &mut DbInfo,
        key: &[u8],
        value: &[u8],
    ) -> Result<bool> {
        let search_result = BTree::<LexicographicComparator>::search(
            txn as &Transaction<'_, Write>,
            db_info.root,
            key,
        )?;

        let existing_data = match search_result {
            Some(existing) => existing.into_owned(),
            None => {
                let encoded = Self::encode_single_value(value);
                let mut root = db_info.root;
                BTree::<LexicographicComparator>::insert(txn, &mut root, db_info, key, &encoded)?;
                db_info.root = root;
                return Ok(true);
            }
        };

        if Self::is_single_value(&existing_data) {
            let existing_value = Self::decode_single_value(&existing_data)?;
            if existing_value == value {
                return Ok(false);
            }
            Self::promote_to_sub_db(txn, db_info, key, existing_value, value)?;
        } else if Self::is_sub_db(&existing_data) {
            let mut sub_db = Self::decode_sub_db(&existing_data)?;
            let mut sub_root = sub_db.root;
            BTree::<LexicographicComparator>::insert(txn, &mut sub_root, &mut sub_db, value, &[])?;
            sub_db.root = sub_root;

            let encoded = Self::encode_sub_db(&sub_db);
            BTree::<LexicographicComparator>::update_value(txn, db_info.root, key, &encoded)?;
        } else {
            // Pre-existing plain value (database had entries before DUP_SORT
            // was turned on for it): treat it as the first duplicate.
            Self::promote_to_sub_db(txn, db_info, key, &existing_data, value)?;
        }

        Ok(false)
    }

    /// Collect every duplicate value stored under `key`, in sort order.
    pub fn get_all<'txn>(
        txn: &Transaction<'txn, impl crate::txn::mode::Mode>,
        root: PageId,
        key: &[u8],
    ) -> Result<Vec<Vec<u8>>> {
        let value = match BTree::<LexicographicComparator>::search(txn, root, key)? {
            Some(value) => value,
            None => return Ok(Vec::new()),
        };

        if Self::is_single_value(&value) {
            return Ok(vec![Self::decode_single_value(&value)?.to_vec()]);
        }
        if !Self::is_sub_db(&value) {
            return Ok(vec![value.into_owned()]);
        }

        let sub_db = Self::decode_sub_db(&value)?;
        let mut values = Vec::with_capacity(sub_db.entries as usize);
        let mut stack = vec![sub_db.root];
        while let Some(page_id) = stack.pop() {
            let page = txn.get_page(page_id)?;
            if page.header.flags.contains(PageFlags::LEAF) {
                for i in 0..page.header.num_keys as usize {
                    values.push(page.node(i)?.key()?.to_vec());
                }
            } else {
                for i in (0..page.header.num_keys as usize).rev() {
                    stack.push(page.node(i)?.page_number()?);
                }
                if let Ok(leftmost) = crate::branch::BranchPage::get_leftmost_child(page) {
                    stack.push(leftmost);
                }
            }
        }
        values.sort();
        Ok(values)
    }

    /// Whether the exact pair `(key, value)` is present.
    pub fn contains<'txn>(
        txn: &Transaction<'txn, impl crate::txn::mode::Mode>,
        root: PageId,
        key: &[u8],
        value: &[u8],
    ) -> Result<bool> {
        let existing = match BTree::<LexicographicComparator>::search(txn, root, key)? {
            Some(existing) => existing,
            None => return Ok(false),
        };

        if Self::is_single_value(&existing) {
            return Ok(Self::decode_single_value(&existing)? == value);
        }
        if Self::is_sub_db(&existing) {
            let sub_db = Self::decode_sub_db(&existing)?;
            return Ok(BTree::<LexicographicComparator>::search(txn, sub_db.root, value)?.is_some());
        }
        Ok(existing.as_ref() == value)
    }

    /// Remove a single `(key, value)` pair, collapsing the sub-tree back to
    /// an inline value (or removing `key` entirely) when it empties out.
    pub fn delete(
        txn: &mut Transaction<'_, Write>,
        db_info: &mut DbInfo,
        key: &[u8],
        value: &[u8],
    ) -> Result<bool> {
        let existing_value = match BTree::<LexicographicComparator>::search(txn, db_info.root, key)?
        {
            Some(existing) => existing,
            None => return Ok(false),
        };

        if Self::is_single_value(&existing_value) {
            if Self::decode_single_value(&existing_value)? != value {
                return Ok(false);
            }
            let mut root = db_info.root;
            BTree::<LexicographicComparator>::delete(txn, &mut root, db_info, key)?;
            db_info.root = root;
            return Ok(true);
        }

        if !Self::is_sub_db(&existing_value) {
            if existing_value.as_ref() != value {
                return Ok(false);
            }
            let mut root = db_info.root;
            BTree::<LexicographicComparator>::delete(txn, &mut root, db_info, key)?;
            db_info.root = root;
            return Ok(true);
        }

        let mut sub_db = Self::decode_sub_db(&existing_value)?;
        let mut sub_root = sub_db.root;
        let removed =
            BTree::<LexicographicComparator>::delete(txn, &mut sub_root, &mut sub_db, value)?;
        if removed.is_none() {
            return Ok(false);
        }
        sub_db.root = sub_root;

        if sub_db.entries == 0 {
            let mut root = db_info.root;
            BTree::<LexicographicComparator>::delete(txn, &mut root, db_info, key)?;
            db_info.root = root;
        } else if sub_db.entries == 1 {
            let page = txn.get_page(sub_db.root)?;
            let remaining_value = if page.header.num_keys > 0 {
                page.node(0)?.key()?.to_vec()
            } else {
                return Err(Error::Corruption {
                    details: "duplicate sub-tree reports 1 entry but has no keys".into(),
                    page_id: Some(sub_db.root),
                });
            };

            Self::free_sub_db_pages(txn, sub_db.root)?;

            let encoded = Self::encode_single_value(&remaining_value);
            let mut root = db_info.root;
            BTree::<LexicographicComparator>::delete(txn, &mut root, db_info, key)?;
            BTree::<LexicographicComparator>::insert(txn, &mut root, db_info, key, &encoded)?;
            db_info.root = root;
        } else {
            let encoded = Self::encode_sub_db(&sub_db);
            BTree::<LexicographicComparator>::update_value(txn, db_info.root, key, &encoded)?;
        }

        Ok(true)
    }

    /// Remove every duplicate stored under `key`.
    pub fn delete_all(
        txn: &mut Transaction<'_, Write>,
        db_info: &mut DbInfo,
        key: &[u8],
    ) -> Result<bool> {
        let mut root = db_info.root;
        match BTree::<LexicographicComparator>::delete(txn, &mut root, db_info, key)? {
            Some(value) => {
                db_info.root = root;
                if Self::is_sub_db(&value) {
                    let sub_db = Self::decode_sub_db(&value)?;
                    Self::free_sub_db_pages(txn, sub_db.root)?;
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn free_sub_db_pages(txn: &mut Transaction<'_, Write>, root: PageId) -> Result<()> {
        let mut stack = vec![root];
        while let Some(page_id) = stack.pop() {
            let page = txn.get_page(page_id)?;
            if !page.header.flags.contains(PageFlags::LEAF) {
                for i in 0..page.header.num_keys as usize {
                    stack.push(page.node(i)?.page_number()?);
                }
                if let Ok(leftmost) = crate::branch::BranchPage::get_leftmost_child(page) {
                    stack.push(leftmost);
                }
            }
            txn.free_page(page_id)?;
        }
        Ok(())
    }

    /// Number of duplicates stored under `key` (0 if the key is absent).
    pub fn count_values<'txn>(
        txn: &Transaction<'txn, impl crate::txn::mode::Mode>,
        root: PageId,
        key: &[u8],
    ) -> Result<usize> {
        match BTree::<LexicographicComparator>::search(txn, root, key)? {
            Some(value) => {
                if Self::is_single_value(&value) {
                    Ok(1)
                } else if Self::is_sub_db(&value) {
                    Ok(Self::decode_sub_db(&value)?.entries as usize)
                } else {
                    Ok(1)
                }
            }
            None => Ok(0),
        }
    }

    fn encode_sub_db(db_info: &DbInfo) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(1 + std::mem::size_of::<DbInfo>());
        bytes.push(SUB_DB_MARKER);
        unsafe {
            let ptr = db_info as *const _ as *const u8;
            bytes.extend_from_slice(std::slice::from_raw_parts(ptr, std::mem::size_of::<DbInfo>()));
        }
        bytes
    }

    /// Decode a sub-database descriptor previously produced by [`Self::encode_sub_db`].
    pub fn decode_sub_db(bytes: &[u8]) -> Result<DbInfo> {
        if bytes.len() != 1 + std::mem::size_of::<DbInfo>() || bytes[0] != SUB_DB_MARKER {
            return Err(Error::Corruption {
                details: "malformed duplicate sub-database descriptor".into(),
                page_id: None,
            });
        }

        let mut db_info = DbInfo::default();
        unsafe {
            std::ptr::copy_nonoverlapping(
                bytes.as_ptr().add(1),
                &mut db_info as *mut _ as *mut u8,
                std::mem::size_of::<DbInfo>(),
            );
        }
        Ok(db_info)
    }
}

/// Cursor over the duplicate values stored under one key.
///
/// Walks the full duplicate sub-tree (branch and leaf pages alike, following
/// leaf sibling pointers the same way the main [`crate::cursor::Cursor`]
/// does), so it supports `FIRST_DUP`/`NEXT_DUP`/`PREV_DUP`/`LAST_DUP`
/// regardless of how many pages the sub-tree spans.
pub struct DupCursor<'txn, M: crate::txn::mode::Mode> {
    txn: &'txn Transaction<'txn, M>,
    sub_db: Option<DbInfo>,
    /// Path from the sub-tree root to the current leaf: `(page, index)`.
    /// `usize::MAX` on a branch page means "positioned at the leftmost child".
    stack: Vec<(PageId, usize)>,
}

impl<'txn, M: crate::txn::mode::Mode> DupCursor<'txn, M> {
    /// Build a cursor over the duplicates of `key`, if any exist as a sub-tree.
    pub fn new(txn: &'txn Transaction<'txn, M>, root: PageId, key: &[u8]) -> Result<Self> {
        let sub_db = match BTree::<LexicographicComparator>::search(txn, root, key)? {
            Some(value) if DupSort::is_sub_db(&value) => Some(DupSort::decode_sub_db(&value)?),
            _ => None,
        };
        Ok(Self { txn, sub_db, stack: Vec::new() })
    }

    fn current_value(&self) -> Result<Option<Vec<u8>>> {
        match self.stack.last() {
            Some(&(page_id, index)) => {
                let page = self.txn.get_page(page_id)?;
                if index >= page.header.num_keys as usize {
                    return Ok(None);
                }
                Ok(Some(page.node(index)?.key()?.to_vec()))
            }
            None => Ok(None),
        }
    }

    fn push_descend_first(&mut self, mut page_id: PageId) -> Result<()> {
        loop {
            let page = self.txn.get_page(page_id)?;
            if page.header.flags.contains(PageFlags::LEAF) {
                self.stack.push((page_id, 0));
                return Ok(());
            }
            self.stack.push((page_id, usize::MAX));
            page_id = crate::branch::BranchPage::get_leftmost_child(page)?;
        }
    }

    fn push_descend_last(&mut self, mut page_id: PageId) -> Result<()> {
        loop {
            let page = self.txn.get_page(page_id)?;
            let last = page.header.num_keys.saturating_sub(1) as usize;
            self.stack.push((page_id, last));
            if page.header.flags.contains(PageFlags::LEAF) {
                return Ok(());
            }
            page_id = page.node(last)?.page_number()?;
        }
    }

    /// Move to the smallest duplicate value (`FIRST_DUP`).
    pub fn first(&mut self) -> Result<Option<Vec<u8>>> {
        let sub_db = match self.sub_db {
            Some(sub_db) => sub_db,
            None => return Ok(None),
        };
        if sub_db.entries == 0 {
            return Ok(None);
        }
        self.stack.clear();
        self.push_descend_first(sub_db.root)?;
        self.current_value()
    }

    /// Move to the largest duplicate value (`LAST_DUP`).
    pub fn last(&mut self) -> Result<Option<Vec<u8>>> {
        let sub_db = match self.sub_db {
            Some(sub_db) => sub_db,
            None => return Ok(None),
        };
        if sub_db.entries == 0 {
            return Ok(None);
        }
        self.stack.clear();
        self.push_descend_last(sub_db.root)?;
        self.current_value()
    }

    /// Advance to the next duplicate value (`NEXT_DUP`).
    pub fn next(&mut self) -> Result<Option<Vec<u8>>> {
        if self.stack.is_empty() {
            return self.first();
        }

        let leaf_level = self.stack.len() - 1;
        let (leaf_page_id, leaf_index) = self.stack[leaf_level];
        let leaf_page = self.txn.get_page(leaf_page_id)?;
        let advanced = leaf_index + 1;

        if advanced < leaf_page.header.num_keys as usize {
            self.stack[leaf_level].1 = advanced;
            return self.current_value();
        }

        if leaf_page.header.flags.contains(PageFlags::LEAF) && leaf_page.header.next_pgno != 0 {
            let next_page_id = PageId(leaf_page.header.next_pgno);
            let next_page = self.txn.get_page(next_page_id)?;
            if next_page.header.num_keys > 0 {
                self.stack.clear();
                self.stack.push((next_page_id, 0));
                return self.current_value();
            }
        }

        self.stack.pop();
        while let Some(&(page_id, index)) = self.stack.last() {
            let page = self.txn.get_page(page_id)?;
            let advanced = if index == usize::MAX { 0 } else { index + 1 };
            if advanced < page.header.num_keys as usize {
                let level = self.stack.len() - 1;
                self.stack[level].1 = advanced;
                let child = crate::branch::BranchPage::get_child_at(page, advanced)?;
                self.push_descend_first(child)?;
                return self.current_value();
            }
            self.stack.pop();
        }

        Ok(None)
    }

    /// Step back to the previous duplicate value (`PREV_DUP`).
    pub fn prev(&mut self) -> Result<Option<Vec<u8>>> {
        if self.stack.is_empty() {
            return self.last();
        }

        let leaf_level = self.stack.len() - 1;
        let (leaf_page_id, leaf_index) = self.stack[leaf_level];

        if leaf_index > 0 {
            self.stack[leaf_level].1 = leaf_index - 1;
            return self.current_value();
        }

        let leaf_page = self.txn.get_page(leaf_page_id)?;
        if leaf_page.header.flags.contains(PageFlags::LEAF) && leaf_page.header.prev_pgno != 0 {
            let prev_page_id = PageId(leaf_page.header.prev_pgno);
            let prev_page = self.txn.get_page(prev_page_id)?;
            if prev_page.header.num_keys > 0 {
                self.stack.clear();
                self.stack.push((prev_page_id, prev_page.header.num_keys as usize - 1));
                return self.current_value();
            }
        }

        self.stack.pop();
        while let Some(&(page_id, index)) = self.stack.last() {
            if index != usize::MAX {
                let page = self.txn.get_page(page_id)?;
                let retreated = if index == 0 { usize::MAX } else { index - 1 };
                let level = self.stack.len() - 1;
                self.stack[level].1 = retreated;

                let child = if retreated == usize::MAX {
                    crate::branch::BranchPage::get_leftmost_child(page)?
                } else {
                    crate::branch::BranchPage::get_child_at(page, retreated)?
                };
                self.push_descend_last(child)?;
                return self.current_value();
            }
            self.stack.pop();
        }

        Ok(None)
    }

    /// Seek to the smallest duplicate value `>= value` (`GET_BOTH_RANGE`'s
    /// dup-cursor half: positioning within one key's duplicate set).
    pub fn seek(&mut self, value: &[u8]) -> Result<Option<Vec<u8>>> {
        let sub_db = match self.sub_db {
            Some(sub_db) => sub_db,
            None => return Ok(None),
        };
        if sub_db.entries == 0 {
            return Ok(None);
        }

        self.stack.clear();
        let mut current_page_id = sub_db.root;
        loop {
            let page = self.txn.get_page(current_page_id)?;
            match page.search_key_with_comparator::<LexicographicComparator>(value)? {
                crate::page::SearchResult::Found { index } => {
                    self.stack.push((current_page_id, index));
                    if page.header.flags.contains(PageFlags::LEAF) {
                        return self.current_value();
                    }
                    current_page_id = page.node(index)?.page_number()?;
                }
                crate::page::SearchResult::NotFound { insert_pos } => {
                    if page.header.flags.contains(PageFlags::LEAF) {
                        self.stack.push((current_page_id, insert_pos));
                        if insert_pos < page.header.num_keys as usize {
                            return self.current_value();
                        }
                        return self.next();
                    }
                    let child_index = insert_pos.saturating_sub(1);
                    self.stack.push((current_page_id, child_index));
                    current_page_id = page.node(child_index)?.page_number()?;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DatabaseFlags;
    use crate::env::EnvBuilder;
    use std::sync::Arc;
    use tempfile::TempDir;

    // These tests drive `DupSort`/`DupCursor` directly against a raw
    // `DbInfo` (rather than through `Database<K, V>`) so they can reach
    // internal states, like a still-inline single value, that the typed
    // API collapses away.
    fn dup_db_info(
        env: &Arc<crate::env::Environment<crate::env::state::Open>>,
        txn: &mut Transaction<'_, Write>,
    ) -> DbInfo {
        let _db: crate::db::Database<Vec<u8>, Vec<u8>> = env
            .create_database_with_flags(txn, Some("dups"), DatabaseFlags::DUP_SORT)
            .unwrap();
        *txn.db_info(Some("dups")).unwrap()
    }

    #[test]
    fn insert_promotes_single_value_to_sub_tree_on_second_duplicate() {
        let dir = TempDir::new().unwrap();
        let env = Arc::new(EnvBuilder::new().map_size(10 * 1024 * 1024).open(dir.path()).unwrap());

        let mut txn = env.write_txn().unwrap();
        let mut db_info = dup_db_info(&env, &mut txn);

        assert!(DupSort::insert(&mut txn, &mut db_info, b"key1", b"value1").unwrap());
        assert!(!DupSort::insert(&mut txn, &mut db_info, b"key1", b"value2").unwrap());
        assert!(!DupSort::insert(&mut txn, &mut db_info, b"key1", b"value3").unwrap());
        txn.commit().unwrap();

        let txn = env.read_txn().unwrap();
        let mut values = DupSort::get_all(&txn, db_info.root, b"key1").unwrap();
        values.sort();
        assert_eq!(values, vec![b"value1".to_vec(), b"value2".to_vec(), b"value3".to_vec()]);
        assert_eq!(DupSort::count_values(&txn, db_info.root, b"key1").unwrap(), 3);
    }

    #[test]
    fn delete_single_duplicate_leaves_the_rest() {
        let dir = TempDir::new().unwrap();
        let env = Arc::new(EnvBuilder::new().map_size(10 * 1024 * 1024).open(dir.path()).unwrap());

        let mut txn = env.write_txn().unwrap();
        let mut db_info = dup_db_info(&env, &mut txn);

        DupSort::insert(&mut txn, &mut db_info, b"key1", b"value1").unwrap();
        DupSort::insert(&mut txn, &mut db_info, b"key1", b"value2").unwrap();
        DupSort::insert(&mut txn, &mut db_info, b"key1", b"value3").unwrap();

        assert!(DupSort::delete(&mut txn, &mut db_info, b"key1", b"value2").unwrap());

        let values = DupSort::get_all(&txn, db_info.root, b"key1").unwrap();
        assert_eq!(values.len(), 2);
        assert!(values.contains(&b"value1".to_vec()));
        assert!(!values.contains(&b"value2".to_vec()));
        assert!(values.contains(&b"value3".to_vec()));

        txn.commit().unwrap();
    }

    #[test]
    fn dup_cursor_walks_all_duplicates_forward_and_backward() {
        let dir = TempDir::new().unwrap();
        let env = Arc::new(EnvBuilder::new().map_size(10 * 1024 * 1024).open(dir.path()).unwrap());

        let mut txn = env.write_txn().unwrap();
        let mut db_info = dup_db_info(&env, &mut txn);
        for v in [b"c".as_slice(), b"a".as_slice(), b"b".as_slice()] {
            DupSort::insert(&mut txn, &mut db_info, b"key", v).unwrap();
        }
        txn.commit().unwrap();

        let txn = env.read_txn().unwrap();
        let mut cursor = DupCursor::new(&txn, db_info.root, b"key").unwrap();

        assert_eq!(cursor.first().unwrap(), Some(b"a".to_vec()));
        assert_eq!(cursor.next().unwrap(), Some(b"b".to_vec()));
        assert_eq!(cursor.next().unwrap(), Some(b"c".to_vec()));
        assert_eq!(cursor.next().unwrap(), None);

        assert_eq!(cursor.last().unwrap(), Some(b"c".to_vec()));
        assert_eq!(cursor.prev().unwrap(), Some(b"b".to_vec()));
        assert_eq!(cursor.prev().unwrap(), Some(b"a".to_vec()));
        assert_eq!(cursor.prev().unwrap(), None);

        assert_eq!(cursor.seek(b"b").unwrap(), Some(b"b".to_vec()));
        assert_eq!(cursor.seek(b"ba").unwrap(), Some(b"c".to_vec()));
    }

    #[test]
    fn contains_checks_exact_pair() {
        let dir = TempDir::new().unwrap();
        let env = Arc::new(EnvBuilder::new().map_size(10 * 1024 * 1024).open(dir.path()).unwrap());

        let mut txn = env.write_txn().unwrap();
        let mut db_info = dup_db_info(&env, &mut txn);
        DupSort::insert(&mut txn, &mut db_info, b"key", b"a").unwrap();
        DupSort::insert(&mut txn, &mut db_info, b"key", b"b").unwrap();
        txn.commit().unwrap();

        let txn = env.read_txn().unwrap();
        assert!(DupSort::contains(&txn, db_info.root, b"key", b"a").unwrap());
        assert!(!DupSort::contains(&txn, db_info.root, b"key", b"z").unwrap());
        assert!(!DupSort::contains(&txn, db_info.root, b"missing", b"a").unwrap());
    }
}
