//! # Block Structure
//!
//! The slice of a block the authorization core needs: where it sits in the
//! chain and the ordered transactions it carries. Consensus fields (parent
//! hash, proof of work, timestamps) are someone else's concern and are not
//! modelled here.
//!
//! Transaction order inside a block matters. When two inputs in the same
//! block publish a key for the same address, the earlier one is what the
//! public-key index records.

use serde::{Deserialize, Serialize};

use crate::transaction::Transaction;

/// An accepted block: height plus ordered transaction list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Block height (0-indexed, genesis = 0).
    pub height: u64,
    /// Ordered list of transactions included in this block.
    pub transactions: Vec<Transaction>,
}

impl Block {
    pub fn new(height: u64, transactions: Vec<Transaction>) -> Self {
        Self {
            height,
            transactions,
        }
    }

    /// The block's coinbase, if its first transaction is one.
    pub fn coinbase(&self) -> Option<&Transaction> {
        self.transactions.first().filter(|tx| tx.is_coinbase())
    }

    /// Finds a transaction in this block by id.
    pub fn find_transaction(&self, id: &[u8]) -> Option<&Transaction> {
        self.transactions.iter().find(|tx| tx.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::derive_address;

    #[test]
    fn coinbase_is_first_transaction() {
        let cb = Transaction::new_coinbase(&derive_address(b"miner"), "reward").unwrap();
        let block = Block::new(0, vec![cb.clone()]);
        assert_eq!(block.coinbase(), Some(&cb));
        assert_eq!(block.find_transaction(&cb.id), Some(&cb));
        assert_eq!(block.find_transaction(b"nope"), None);
    }

    #[test]
    fn empty_block_has_no_coinbase() {
        assert!(Block::new(3, Vec::new()).coinbase().is_none());
    }
}
