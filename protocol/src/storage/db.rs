//! # LedgerDb — Persistent Storage Handle
//!
//! A thin wrapper over an embedded sled database. sled organizes data into
//! named trees (the equivalent of buckets), each an independent keyspace
//! with its own atomic transactions. The public-key index lives in one of
//! those trees; which one is decided by [`IndexConfig`](crate::config::IndexConfig).
//!
//! ## Thread Safety
//!
//! sled is thread-safe: readers see consistent snapshots and transactions
//! on a tree are serialized. `LedgerDb` is `Clone` (the handle is
//! reference-counted) and can be shared across threads freely.

use sled::{Db, Tree};
use std::path::Path;

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),
}

pub type DbResult<T> = Result<T, DbError>;

/// Handle to the node's embedded database.
#[derive(Debug, Clone)]
pub struct LedgerDb {
    db: Db,
}

impl LedgerDb {
    /// Open or create a database at the given filesystem path.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        Ok(Self {
            db: sled::open(path)?,
        })
    }

    /// Create a temporary database that is cleaned up automatically when
    /// the last handle is dropped. Ideal for tests.
    pub fn open_temporary() -> DbResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }

    /// Open (creating if needed) a named tree.
    pub fn open_tree(&self, name: &str) -> DbResult<Tree> {
        Ok(self.db.open_tree(name)?)
    }

    /// Whether a tree with this name currently exists.
    pub fn has_tree(&self, name: &str) -> bool {
        self.db
            .tree_names()
            .iter()
            .any(|existing| existing.as_ref() == name.as_bytes())
    }

    /// Force all pending writes to disk.
    pub fn flush(&self) -> DbResult<()> {
        self.db.flush()?;
        Ok(())
    }

    /// The underlying sled handle, for components that manage their own
    /// trees (tree drop/recreate, transactions).
    pub(crate) fn raw(&self) -> &Db {
        &self.db
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_temporary_database() {
        let db = LedgerDb::open_temporary().expect("should create temp db");
        assert!(!db.has_tree("chainstate"));
        db.open_tree("chainstate").unwrap();
        assert!(db.has_tree("chainstate"));
    }

    #[test]
    fn open_persistent_database_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let db = LedgerDb::open(dir.path()).expect("should open db");
            db.open_tree("t").unwrap().insert(b"k", b"v".to_vec()).unwrap();
            db.flush().unwrap();
        }

        let db = LedgerDb::open(dir.path()).expect("should reopen db");
        let value = db.open_tree("t").unwrap().get(b"k").unwrap();
        assert_eq!(value.as_deref(), Some(&b"v"[..]));
    }
}
