//! # Public-Key Index
//!
//! A persistent cache mapping an address to the full public key first
//! published for it. Post-quantum public keys are large (a Falcon-1024 key
//! is 1793 bytes), so a spender who has already revealed their key once may
//! omit it from later inputs and let verifiers resolve it here.
//!
//! ## Keys and values
//!
//! | key                          | value                 |
//! |------------------------------|-----------------------|
//! | base58 address (UTF-8 bytes) | raw public key bytes  |
//!
//! ## Maintenance
//!
//! - [`PubKeyIndex::apply_block`] folds a newly accepted block in, in one
//!   atomic sled transaction. Existing entries are never overwritten.
//! - [`PubKeyIndex::reindex`] drops the tree and rebuilds it from a
//!   [`Ledger`]. Drop-and-recreate is one step, the bulk write is a second;
//!   a crash between them leaves an empty index that the next reindex
//!   repairs.
//!
//! Both paths apply the same first-seen rule, so rebuilding from scratch
//! yields exactly what incremental updates would have produced.

use std::collections::BTreeMap;
use std::time::Instant;

use sled::transaction::{TransactionError, TransactionResult};
use sled::Tree;
use thiserror::Error;
use tracing::{debug, info};

use super::block::Block;
use super::db::{DbError, LedgerDb};
use crate::config::IndexConfig;
use crate::identity::address::pubkey_hash_to_address;
use crate::transaction::PubKeyResolver;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("database error: {0}")]
    Db(#[from] DbError),

    #[error("index transaction aborted")]
    Aborted,
}

impl From<TransactionError<()>> for IndexError {
    fn from(err: TransactionError<()>) -> Self {
        match err {
            TransactionError::Abort(()) => IndexError::Aborted,
            TransactionError::Storage(e) => IndexError::Sled(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// Address → first-seen public key, in address order.
pub type AddressBook = BTreeMap<String, Vec<u8>>;

/// A full view of the chain, as far as the index cares.
///
/// `address_book` must walk every block from genesis to tip and, for every
/// non-coinbase input whose embedded public key hashes to its
/// `pubkey_hash`, record `address(input.pubkey_hash) → public key` unless
/// that address is already present. [`Chain`](super::Chain) is the in-memory implementation.
pub trait Ledger {
    fn address_book(&self) -> AddressBook;
}

impl<L: Ledger + ?Sized> Ledger for &L {
    fn address_book(&self) -> AddressBook {
        (**self).address_book()
    }
}

// ---------------------------------------------------------------------------
// PubKeyIndex
// ---------------------------------------------------------------------------

/// Persistent `address → public key` cache over one sled tree.
///
/// The tree handle is reopened per operation rather than cached, since
/// [`reindex`](Self::reindex) drops and recreates the tree underneath.
#[derive(Debug, Clone)]
pub struct PubKeyIndex {
    db: LedgerDb,
    tree_name: String,
}

impl PubKeyIndex {
    /// Binds an index to `db` using the tree named in `config`. The tree is
    /// created lazily on first use.
    pub fn new(db: &LedgerDb, config: &IndexConfig) -> Self {
        Self {
            db: db.clone(),
            tree_name: config.tree_name.clone(),
        }
    }

    pub fn tree_name(&self) -> &str {
        &self.tree_name
    }

    fn tree(&self) -> Result<Tree, IndexError> {
        Ok(self.db.open_tree(&self.tree_name)?)
    }

    /// Returns the public key recorded for `address`.
    ///
    /// `Ok(None)` means no entry exists. A storage failure is an `Err` and
    /// is never reported as absence.
    pub fn lookup(&self, address: &str) -> Result<Option<Vec<u8>>, IndexError> {
        let value = self.tree()?.get(address.as_bytes())?;
        Ok(value.map(|v| v.to_vec()))
    }

    /// Discards all entries and rebuilds the index from `ledger`.
    ///
    /// Returns the number of entries written.
    pub fn reindex<L: Ledger + ?Sized>(&self, ledger: &L) -> Result<usize, IndexError> {
        let start = Instant::now();

        // Phase 1: drop and recreate. A missing tree is fine.
        self.db.raw().drop_tree(self.tree_name.as_bytes())?;
        let tree = self.tree()?;

        // Phase 2: bulk populate in one transaction.
        let book = ledger.address_book();
        let result: TransactionResult<(), ()> = tree.transaction(|t| {
            for (address, public_key) in &book {
                t.insert(address.as_bytes(), public_key.as_slice())?;
            }
            Ok(())
        });
        result?;
        self.db.flush()?;

        info!(
            tree = %self.tree_name,
            entries = book.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "public-key index rebuilt"
        );
        Ok(book.len())
    }

    /// Records every public key first published in `block`.
    ///
    /// Coinbase transactions, inputs without an embedded key, and inputs
    /// whose embedded key does not hash to their `pubkey_hash` are skipped
    /// (see [`TxInput::published_pubkey`](crate::transaction::TxInput::published_pubkey)).
    /// An address that already has an entry keeps it, including
    /// when the same address appears twice within `block`: the earlier
    /// input wins. All writes for the block commit atomically.
    ///
    /// Returns the number of new entries.
    pub fn apply_block(&self, block: &Block) -> Result<usize, IndexError> {
        let start = Instant::now();

        let candidates: Vec<(String, &[u8])> = block
            .transactions
            .iter()
            .filter(|tx| !tx.is_coinbase())
            .flat_map(|tx| tx.inputs.iter())
            .filter_map(|input| {
                input
                    .published_pubkey()
                    .map(|pk| (pubkey_hash_to_address(&input.pubkey_hash), pk))
            })
            .collect();

        if candidates.is_empty() {
            debug!(height = block.height, "block publishes no public keys");
            return Ok(0);
        }

        let tree = self.tree()?;
        let result: TransactionResult<usize, ()> = tree.transaction(|t| {
            let mut inserted = 0;
            for (address, public_key) in &candidates {
                if t.get(address.as_bytes())?.is_none() {
                    t.insert(address.as_bytes(), *public_key)?;
                    inserted += 1;
                }
            }
            Ok(inserted)
        });
        let inserted = result?;
        self.db.flush()?;

        debug!(
            height = block.height,
            candidates = candidates.len(),
            inserted,
            elapsed_us = start.elapsed().as_micros() as u64,
            "public-key index updated"
        );
        Ok(inserted)
    }

    /// Number of entries.
    pub fn len(&self) -> Result<usize, IndexError> {
        Ok(self.tree()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, IndexError> {
        Ok(self.tree()?.is_empty())
    }

    /// All entries, in address order.
    pub fn entries(&self) -> Result<AddressBook, IndexError> {
        let mut book = AddressBook::new();
        for item in self.tree()?.iter() {
            let (key, value) = item?;
            book.insert(String::from_utf8_lossy(&key).into_owned(), value.to_vec());
        }
        Ok(book)
    }
}

impl PubKeyResolver for PubKeyIndex {
    fn lookup(&self, address: &str) -> Result<Option<Vec<u8>>, IndexError> {
        PubKeyIndex::lookup(self, address)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
