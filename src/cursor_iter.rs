//! `Iterator`-based wrappers over [`Cursor`] for callers that want `for`-loop
//! and combinator (`map`/`filter`/`collect`) ergonomics instead of driving
//! `next()`/`current()` by hand.

use crate::{
    comparator::Comparator,
    cursor::Cursor,
    db::{Database, Key, Value},
    error::Result,
    txn::{mode::Mode, Transaction},
};
use std::ops::Range;

/// Simple iterator wrapper - user must ensure database outlives the iterator
pub struct Iter<'txn, K, V, C>
where
    K: Key,
    V: Value,
    C: Comparator,
{
    cursor: Cursor<'txn, K, V, C>,
}

impl<'txn, K, V, C> Iter<'txn, K, V, C>
where
    K: Key,
    V: Value,
    C: Comparator,
{
    /// Create a new iterator
    /// 
    /// # Safety
    /// The database must outlive the transaction and iterator
    pub fn new<M: Mode>(db: &'txn Database<K, V, C>, txn: &'txn Transaction<'txn, M>) -> Result<Self> {
        let cursor = db.cursor(txn)?;
        Ok(Self { cursor })
    }
}

impl<'txn, K, V, C> Iterator for Iter<'txn, K, V, C>
where
    K: Key,
    V: Value,
    C: Comparator,
{
    type Item = Result<(Vec<u8>, V)>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.cursor.next() {
            Ok(Some((key, value))) => Some(Ok((key, value))),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

/// Convenience function to create an iterator
/// 
/// This provides a heed-compatible API for iteration.
/// 
/// # Example
/// ```ignore
/// // Instead of using cursors directly:
/// let mut cursor = db.cursor(&txn)?;
/// while let Some((key, value)) = cursor.next()? {
///     // process
/// }
/// 
/// // You can use iterators:
/// for result in iter(&db, &txn)? {
///     let (key, value) = result?;
///     // process
/// }
/// ```
pub fn iter<'txn, K, V, C, M>(
    db: &'txn Database<K, V, C>,
    txn: &'txn Transaction<'txn, M>,
) -> Result<Iter<'txn, K, V, C>>
where
    K: Key,
    V: Value,
    C: Comparator,
    M: Mode,
{
    Iter::new(db, txn)
}

/// Create an iterator starting from a specific key
pub fn iter_from<'txn, K, V, C, M>(
    db: &'txn Database<K, V, C>,
    txn: &'txn Transaction<'txn, M>,
    start_key: &K,
) -> Result<Iter<'txn, K, V, C>>
where
    K: Key,
    V: Value,
    C: Comparator,
    M: Mode,
{
    let mut cursor = db.cursor(txn)?;
    cursor.seek(start_key)?;
    Ok(Iter { cursor })
}

/// Create a range iterator
pub fn range<'txn, K, V, C, M>(
    db: &'txn Database<K, V, C>,
    txn: &'txn Transaction<'txn, M>,
    range: Range<&K>,
) -> Result<impl Iterator<Item = Result<(Vec<u8>, V)>> + 'txn>
where
    K: Key + PartialOrd,
    V: Value + 'txn,
    C: Comparator,
    M: Mode,
{
    let mut cursor = db.cursor(txn)?;
    cursor.seek(range.start)?;
    
    // Pre-encode the end key to avoid repeated encoding
    let end_bytes = range.end.encode()?;
    
    Ok(std::iter::from_fn(move || {
        match cursor.current() {
            Ok(Some((key, value))) => {
                // Check if we're past the range
                if key >= end_bytes {
                    return None;
                }
                
                // Move to next for subsequent calls
                let result = Some(Ok((key.clone(), value)));
                let _ = cursor.next();
                result
            }
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }))
}
