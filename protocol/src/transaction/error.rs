//! Errors shared by signing and verification.
//!
//! These are the *fatal* outcomes: the caller assembled a request that
//! cannot be processed, or the backing store failed underneath us. An
//! untrusted transaction that simply fails to verify is not an error; see
//! [`VerifyOutcome`](super::verification::VerifyOutcome).

use thiserror::Error;

use crate::crypto::signatures::SignatureError;
use crate::storage::pubkey_index::IndexError;

#[derive(Debug, Error)]
pub enum AuthError {
    /// An input references a transaction that is not in `prev_txs`.
    #[error("previous transaction {txid} is missing from the supplied set")]
    MissingPrevTransaction { txid: String },

    /// An input references an output index the previous transaction lacks.
    #[error("previous transaction {txid} has {outputs} outputs, input references index {index}")]
    PrevOutputOutOfRange {
        txid: String,
        index: i64,
        outputs: usize,
    },

    /// The signature capability refused to sign.
    #[error("signing failed: {0}")]
    Signature(#[from] SignatureError),

    /// The public-key index could not be read.
    #[error("public-key index failure: {0}")]
    Index(#[from] IndexError),
}
