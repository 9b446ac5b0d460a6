//! # Chain
//!
//! An in-memory, append-only sequence of accepted blocks. It answers the
//! three questions the authorization core asks of a ledger:
//!
//! - which transaction has this id ([`Chain::find_transaction`]),
//! - which previous transactions does this spend reference
//!   ([`Chain::prev_transactions`]),
//! - which public key did each address publish first
//!   ([`Ledger::address_book`], consumed by
//!   [`PubKeyIndex::reindex`](super::PubKeyIndex::reindex)).
//!
//! Lookups scan linearly. That is fine at the sizes this type is used for
//! (tests, tooling, small devnets).

use std::collections::btree_map::Entry;

use tracing::debug;

use super::block::Block;
use super::pubkey_index::{AddressBook, Ledger};
use crate::identity::address::pubkey_hash_to_address;
use crate::transaction::{AuthError, PrevTransactions, Transaction};

/// Ordered chain of accepted blocks.
#[derive(Debug, Clone, Default)]
pub struct Chain {
    blocks: Vec<Block>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an accepted block to the chain tip.
    pub fn append(&mut self, block: Block) {
        debug!(
            height = block.height,
            txs = block.transactions.len(),
            "block appended"
        );
        self.blocks.push(block);
    }

    /// Returns the latest block, if any.
    pub fn tip(&self) -> Option<&Block> {
        self.blocks.last()
    }

    /// Returns the chain height (number of blocks).
    pub fn height(&self) -> u64 {
        self.blocks.len() as u64
    }

    /// Finds a transaction anywhere in the chain by id.
    pub fn find_transaction(&self, id: &[u8]) -> Option<&Transaction> {
        self.blocks.iter().find_map(|block| block.find_transaction(id))
    }

    /// Collects every previous transaction `tx`'s inputs reference, keyed
    /// by hex id, ready for signing or verification.
    ///
    /// A coinbase references nothing and yields an empty map.
    pub fn prev_transactions(&self, tx: &Transaction) -> Result<PrevTransactions, AuthError> {
        let mut prev_txs = PrevTransactions::new();
        if tx.is_coinbase() {
            return Ok(prev_txs);
        }

        for input in &tx.inputs {
            let key = hex::encode(&input.prev_txid);
            if prev_txs.contains_key(&key) {
                continue;
            }
            let prev = self
                .find_transaction(&input.prev_txid)
                .ok_or_else(|| AuthError::MissingPrevTransaction { txid: key.clone() })?;
            prev_txs.insert(key, prev.clone());
        }
        Ok(prev_txs)
    }
}

impl Ledger for Chain {
    fn address_book(&self) -> AddressBook {
        let mut book = AddressBook::new();
        let inputs = self
            .blocks
            .iter()
            .flat_map(|block| block.transactions.iter())
            .filter(|tx| !tx.is_coinbase())
            .flat_map(|tx| tx.inputs.iter());

        for input in inputs {
            let Some(public_key) = input.published_pubkey() else {
                continue;
            };
            if let Entry::Vacant(slot) = book.entry(pubkey_hash_to_address(&input.pubkey_hash)) {
                slot.insert(public_key.to_vec());
            }
        }
        book
    }
}
