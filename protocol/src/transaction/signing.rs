//! Per-input transaction signing.
//!
//! Each input gets its own signature, but every signature covers the whole
//! trimmed copy (all inputs and all outputs), so a signature cannot be
//! lifted onto a transaction with different inputs or outputs.
//!
//! For input `i` the message is built from one running trimmed copy:
//!
//! 1. clear input `i`'s signature,
//! 2. set input `i`'s `pubkey_hash` to the hash locking the output it spends,
//! 3. serialize the entire copy with [`Transaction::canonical_bytes`],
//! 4. sign,
//! 5. clear input `i`'s embedded public key before moving on.
//!
//! Step 5 means later inputs never see earlier inputs' keys in their
//! messages. [`verify_transaction`](super::verification::verify_transaction)
//! rebuilds the copy with exactly the same steps.

use std::collections::HashMap;
use std::time::Instant;

use tracing::debug;

use super::error::AuthError;
use super::types::{Transaction, TxOutput};
use crate::crypto::signatures::SignatureScheme;

/// Previous transactions keyed by hex-encoded id.
pub type PrevTransactions = HashMap<String, Transaction>;

/// Signs every input of `tx` in place.
///
/// Coinbase transactions are left untouched. Every input's previous
/// transaction must be in `prev_txs`; a missing one is a caller bug and
/// fails with [`AuthError::MissingPrevTransaction`] before any signature is
/// produced. If the scheme fails part-way, `tx` is left unsigned.
///
/// # Example
///
/// ```rust,no_run
/// use spendauth_protocol::crypto::Ed25519Scheme;
/// use spendauth_protocol::identity::Wallet;
/// use spendauth_protocol::transaction::{sign_transaction, PrevTransactions, Transaction};
///
/// let scheme = Ed25519Scheme;
/// let wallet = Wallet::generate(&scheme).unwrap();
/// let funding = Transaction::new_coinbase(&wallet.address(), "reward").unwrap();
/// # let mut tx = funding.clone();
/// let mut prev_txs = PrevTransactions::new();
/// prev_txs.insert(funding.id_hex(), funding);
///
/// sign_transaction(&scheme, &mut tx, wallet.private_key(), &prev_txs).unwrap();
/// ```
pub fn sign_transaction<S: SignatureScheme>(
    scheme: &S,
    tx: &mut Transaction,
    private_key: &[u8],
    prev_txs: &PrevTransactions,
) -> Result<(), AuthError> {
    if tx.is_coinbase() {
        return Ok(());
    }

    let started = Instant::now();
    let spent = referenced_outputs(tx, prev_txs)?;
    let mut copy = tx.trimmed_copy();
    let mut signatures = Vec::with_capacity(spent.len());

    for (index, output) in spent.iter().enumerate() {
        copy.inputs[index].signature = None;
        copy.inputs[index].pubkey_hash = output.pubkey_hash.clone();

        let message = copy.canonical_bytes();
        signatures.push(scheme.sign(&message, private_key)?);

        copy.inputs[index].pubkey = None;
    }

    for (input, signature) in tx.inputs.iter_mut().zip(signatures) {
        input.signature = Some(signature);
    }

    debug!(
        txid = %tx.id_hex(),
        inputs = tx.inputs.len(),
        scheme = scheme.name(),
        elapsed_us = started.elapsed().as_micros() as u64,
        "signed transaction"
    );
    Ok(())
}

/// Looks up the output each input of `tx` spends.
///
/// Checks every input up front so callers never do partial work against
/// an incomplete `prev_txs`.
pub(crate) fn referenced_outputs<'p>(
    tx: &Transaction,
    prev_txs: &'p PrevTransactions,
) -> Result<Vec<&'p TxOutput>, AuthError> {
    tx.inputs
        .iter()
        .map(|input| {
            let txid = hex::encode(&input.prev_txid);
            let prev = prev_txs
                .get(&txid)
                .ok_or_else(|| AuthError::MissingPrevTransaction { txid: txid.clone() })?;
            usize::try_from(input.prev_out_index)
                .ok()
                .and_then(|i| prev.outputs.get(i))
                .ok_or(AuthError::PrevOutputOutOfRange {
                    txid,
                    index: input.prev_out_index,
                    outputs: prev.outputs.len(),
                })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
