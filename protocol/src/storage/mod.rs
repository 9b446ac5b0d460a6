//! # Storage Module
//!
//! The persistent half of the authorization core, plus the minimal ledger
//! shapes that drive it.
//!
//! ## Architecture
//!
//! ```text
//! db.rs           — sled database handle (open / temporary / trees / flush)
//! pubkey_index.rs — address → public key cache with rebuild + per-block update
//! block.rs        — the block shape the index consumes: an ordered tx list
//! chain.rs        — in-memory ledger: address book, tx lookup, prev-tx assembly
//! ```
//!
//! ## Data Flow
//!
//! ```text
//! Block ──► PubKeyIndex::apply_block ──► sled tree (one transaction per block)
//! Chain ──► PubKeyIndex::reindex     ──► drop + recreate tree, then one bulk write
//! ```
//!
//! The index is a cache. Anything it holds can be re-derived from the chain,
//! and `reindex` is exactly that derivation.

pub mod block;
pub mod chain;
pub mod db;
pub mod pubkey_index;

pub use block::Block;
pub use chain::Chain;
pub use db::{DbError, LedgerDb};
pub use pubkey_index::{AddressBook, IndexError, Ledger, PubKeyIndex};
