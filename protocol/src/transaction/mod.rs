//! # Transaction Module
//!
//! Canonical representation, construction, signing and verification of
//! value transfers.
//!
//! ## Architecture
//!
//! ```text
//! types.rs        — Transaction / TxInput / TxOutput, canonical bytes, ids, trimmed copy
//! builder.rs      — Coinbase minting and the TransferBuilder
//! signing.rs      — Per-input signing over the trimmed copy
//! verification.rs — Key resolution and per-input signature checks
//! error.rs        — Fatal errors shared by signing and verification
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Build** — [`Transaction::new_coinbase`] or [`TransferBuilder`]; the
//!    id is stamped at this point.
//! 2. **Sign** — [`sign_transaction`] fills in one signature per input.
//! 3. **Verify** — [`verify_transaction`] with the previous transactions and
//!    a [`PubKeyResolver`] (normally the public-key index).
//!
//! ## Design Decisions
//!
//! - Ids are SHA-256 of a hand-rolled canonical encoding, not of a serde
//!   format. Field order is fixed in code.
//! - Each signature covers the whole trimmed transaction, not just its own
//!   input, so signatures cannot be transplanted between transactions.
//! - Verification failures are values ([`VerifyOutcome`]); only malformed
//!   requests and storage failures are errors ([`AuthError`]).

pub mod builder;
pub mod error;
pub mod signing;
pub mod types;
pub mod verification;

pub use builder::{BuildError, KeyEmbedding, TransferBuilder};
pub use error::AuthError;
pub use signing::{sign_transaction, PrevTransactions};
pub use types::{CodecError, Transaction, TxInput, TxOutput};
pub use verification::{
    resolve_public_key, verify_transaction, EmbeddedKeysOnly, PubKeyResolver, RejectReason,
    VerifyOutcome,
};
