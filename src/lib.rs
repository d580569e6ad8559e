//! An embedded, single-file key/value store with ordered access, multi-reader
//! single-writer transactions, and crash-consistent durability.
//!
//! Keys and values are sorted byte strings stored in a copy-on-write B+tree
//! backed by a memory-mapped data file. Readers always observe a consistent
//! snapshot without taking locks; a single writer appends new page versions
//! and swaps an alternating meta page at commit.

#![warn(missing_docs)]
#![cfg_attr(not(test), warn(clippy::unwrap_used))]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod branch;
pub mod btree;
pub mod catalog;
pub mod comparator;
pub mod cursor;
pub mod cursor_iter;
pub mod db;
pub mod dupsort;
pub mod env;
pub mod error;
pub mod freelist;
pub mod io;
pub mod meta;
pub mod node;
pub mod node_utils;
pub mod overflow;
pub mod page;
pub mod reader;
pub mod tree_utils;
pub mod txn;

#[cfg(test)]
mod btree_tests;

// Re-exports
pub use db::{Database, DatabaseFlags, Key, Value};
pub use env::{EnvBuilder, Environment};
pub use error::{Error, Result};
pub use txn::{ReadTransaction, Transaction, WriteTransaction};

// Type aliases for common use cases
/// A read-only transaction
pub type RoTxn<'env> = Transaction<'env, txn::Read>;
/// A read-write transaction
pub type RwTxn<'env> = Transaction<'env, txn::Write>;

/// The default page size (4KB)
pub const DEFAULT_PAGE_SIZE: usize = 4096;

/// Maximum key size in bytes.
pub const MAX_KEY_SIZE: usize = 511;

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
