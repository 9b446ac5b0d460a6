//! Transaction verification.
//!
//! The verifier rebuilds, input by input, the exact trimmed copy the signer
//! signed (see [`super::signing`]) and checks each signature against a
//! public key it resolves itself. Key resolution is where the public-key
//! index comes in: spenders who already published their key may omit it
//! from the input and let the verifier look it up by address.
//!
//! ## Key resolution
//!
//! | embedded key | indexed key      | result                         |
//! |--------------|------------------|--------------------------------|
//! | absent       | absent           | reject: unknown public key     |
//! | absent       | present          | use indexed key                |
//! | present      | present, differs | reject: conflicting public key |
//! | present      | present, equal   | use embedded key               |
//! | present      | absent           | use embedded key               |
//!
//! Whatever key is resolved must hash to the `pubkey_hash` locking the
//! spent output. A key for some other identity is rejected before its
//! signature is even looked at.
//!
//! Rejections are ordinary return values. Only a malformed request (missing
//! previous transaction) or a storage failure is an [`AuthError`].

use std::collections::HashMap;
use std::fmt;
use std::time::Instant;

use tracing::{debug, warn};

use super::error::AuthError;
use super::signing::{referenced_outputs, PrevTransactions};
use super::types::Transaction;
use crate::crypto::hash::hash_pubkey;
use crate::crypto::signatures::SignatureScheme;
use crate::identity::address::pubkey_hash_to_address;
use crate::storage::pubkey_index::IndexError;

// ---------------------------------------------------------------------------
// Key resolution
// ---------------------------------------------------------------------------

/// Source of previously published `address → public key` mappings.
///
/// Implemented by [`PubKeyIndex`](crate::storage::PubKeyIndex). `Ok(None)`
/// means "no entry"; `Err` means the lookup itself failed, and the two must
/// never be confused.
pub trait PubKeyResolver {
    fn lookup(&self, address: &str) -> Result<Option<Vec<u8>>, IndexError>;
}

impl<R: PubKeyResolver + ?Sized> PubKeyResolver for &R {
    fn lookup(&self, address: &str) -> Result<Option<Vec<u8>>, IndexError> {
        (**self).lookup(address)
    }
}

impl PubKeyResolver for HashMap<String, Vec<u8>> {
    fn lookup(&self, address: &str) -> Result<Option<Vec<u8>>, IndexError> {
        Ok(self.get(address).cloned())
    }
}

/// A resolver that knows nothing. Verification then relies solely on keys
/// embedded in the inputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedKeysOnly;

impl PubKeyResolver for EmbeddedKeysOnly {
    fn lookup(&self, _address: &str) -> Result<Option<Vec<u8>>, IndexError> {
        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Why an input failed verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// No embedded key and nothing in the index for the address.
    UnknownPublicKey { address: String },
    /// Embedded key disagrees with the key already indexed for the address.
    ConflictingPublicKey { address: String },
    /// The resolved key does not hash to the spent output's `pubkey_hash`.
    KeyHashMismatch { address: String },
    /// The input carries no signature at all.
    MissingSignature,
    /// The signature does not verify under the resolved key.
    InvalidSignature,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownPublicKey { address } => {
                write!(f, "public key for {address} is unknown")
            }
            Self::ConflictingPublicKey { address } => {
                write!(f, "embedded public key conflicts with the key indexed for {address}")
            }
            Self::KeyHashMismatch { address } => {
                write!(f, "resolved public key does not belong to {address}")
            }
            Self::MissingSignature => write!(f, "input is not signed"),
            Self::InvalidSignature => write!(f, "signature verification failed"),
        }
    }
}

/// Result of verifying a well-formed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// Every input verified (or the transaction is coinbase).
    Valid,
    /// The first input that failed, and why.
    Rejected { input: usize, reason: RejectReason },
}

impl VerifyOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    pub fn reason(&self) -> Option<&RejectReason> {
        match self {
            Self::Valid => None,
            Self::Rejected { reason, .. } => Some(reason),
        }
    }
}

/// Apply the key-resolution table from the module docs.
pub fn resolve_public_key(
    address: &str,
    embedded: Option<&[u8]>,
    indexed: Option<Vec<u8>>,
) -> Result<Vec<u8>, RejectReason> {
    match (embedded, indexed) {
        (None, None) => Err(RejectReason::UnknownPublicKey {
            address: address.to_string(),
        }),
        (None, Some(indexed)) => Ok(indexed),
        (Some(embedded), Some(indexed)) if embedded != indexed.as_slice() => {
            Err(RejectReason::ConflictingPublicKey {
                address: address.to_string(),
            })
        }
        (Some(embedded), _) => Ok(embedded.to_vec()),
    }
}

/// Copy `key` into a zero-filled buffer of exactly `len` bytes.
fn sized_public_key(key: &[u8], len: usize) -> Vec<u8> {
    let mut sized = vec![0u8; len];
    let n = key.len().min(len);
    sized[..n].copy_from_slice(&key[..n]);
    sized
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Verifies every input signature of `tx`.
///
/// Coinbase transactions are valid without looking at `prev_txs`. For
/// everything else each input's previous transaction must be present in
/// `prev_txs` (keyed by hex id); a missing one is
/// [`AuthError::MissingPrevTransaction`]. The first failing input
/// short-circuits with [`VerifyOutcome::Rejected`].
pub fn verify_transaction<S, R>(
    scheme: &S,
    tx: &Transaction,
    prev_txs: &PrevTransactions,
    resolver: &R,
) -> Result<VerifyOutcome, AuthError>
where
    S: SignatureScheme,
    R: PubKeyResolver + ?Sized,
{
    if tx.is_coinbase() {
        return Ok(VerifyOutcome::Valid);
    }

    let started = Instant::now();
    let spent = referenced_outputs(tx, prev_txs)?;
    let mut copy = tx.trimmed_copy();

    for (index, (input, output)) in tx.inputs.iter().zip(spent).enumerate() {
        copy.inputs[index].signature = None;
        copy.inputs[index].pubkey_hash = output.pubkey_hash.clone();
        copy.inputs[index].pubkey = input.pubkey.clone();

        let address = pubkey_hash_to_address(&output.pubkey_hash);
        let indexed = resolver.lookup(&address)?;
        let public_key = match resolve_public_key(&address, input.embedded_pubkey(), indexed) {
            Ok(key) => key,
            Err(reason) => return Ok(reject(tx, index, reason)),
        };
        if hash_pubkey(&public_key).as_slice() != output.pubkey_hash.as_slice() {
            return Ok(reject(tx, index, RejectReason::KeyHashMismatch { address }));
        }

        let Some(signature) = input.signature.as_deref() else {
            return Ok(reject(tx, index, RejectReason::MissingSignature));
        };

        let message = copy.canonical_bytes();
        let public_key = sized_public_key(&public_key, S::PUBLIC_KEY_LENGTH);
        match scheme.verify(&message, signature, &public_key) {
            Ok(true) => {}
            Ok(false) => return Ok(reject(tx, index, RejectReason::InvalidSignature)),
            Err(e) => {
                debug!(txid = %tx.id_hex(), input = index, error = %e, "scheme rejected key");
                return Ok(reject(tx, index, RejectReason::InvalidSignature));
            }
        }

        copy.inputs[index].pubkey = None;
    }

    debug!(
        txid = %tx.id_hex(),
        inputs = tx.inputs.len(),
        scheme = scheme.name(),
        elapsed_us = started.elapsed().as_micros() as u64,
        "verified transaction"
    );
    Ok(VerifyOutcome::Valid)
}

fn reject(tx: &Transaction, input: usize, reason: RejectReason) -> VerifyOutcome {
    warn!(txid = %tx.id_hex(), input, reason = %reason, "transaction rejected");
    VerifyOutcome::Rejected { input, reason }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::signatures::Ed25519Scheme;
    use crate::identity::Wallet;
    use crate::transaction::signing::sign_transaction;
    use crate::transaction::types::{TxInput, TxOutput};

    const SCHEME: Ed25519Scheme = Ed25519Scheme;

    struct Fixture {
        wallet: Wallet,
        prev: PrevTransactions,
        funding_id: Vec<u8>,
    }

    fn fixture() -> Fixture {
        let wallet = Wallet::generate(&SCHEME).unwrap();
        let funding = Transaction::new(
            vec![TxInput::new(vec![], -1, vec![0; 20], Some(b"reward".to_vec()))],
            vec![
                TxOutput::new(6, wallet.pubkey_hash().to_vec()),
                TxOutput::new(4, wallet.pubkey_hash().to_vec()),
            ],
        );
        let funding_id = funding.id.clone();
        let mut prev = PrevTransactions::new();
        prev.insert(funding.id_hex(), funding);
        Fixture {
            wallet,
            prev,
            funding_id,
        }
    }

    impl Fixture {
        fn spend(&self, embed: bool) -> Transaction {
            let pubkey = embed.then(|| self.wallet.public_key().to_vec());
            let mut tx = Transaction::new(
                vec![
                    TxInput::new(
                        self.funding_id.clone(),
                        0,
                        self.wallet.pubkey_hash().to_vec(),
                        pubkey.clone(),
                    ),
                    TxInput::new(
                        self.funding_id.clone(),
                        1,
                        self.wallet.pubkey_hash().to_vec(),
                        pubkey,
                    ),
                ],
                vec![TxOutput::new(10, vec![0x42; 20])],
            );
            sign_transaction(&SCHEME, &mut tx, self.wallet.private_key(), &self.prev).unwrap();
            tx
        }

        fn index_with(&self, key: &[u8]) -> HashMap<String, Vec<u8>> {
            let mut index = HashMap::new();
            index.insert(self.wallet.address(), key.to_vec());
            index
        }
    }

    #[test]
    fn coinbase_is_valid_without_prev_txs() {
        let cb = Transaction::new(
            vec![TxInput::new(vec![], -1, vec![0; 20], Some(b"reward".to_vec()))],
            vec![TxOutput::new(10, vec![1; 20])],
        );
        let outcome =
            verify_transaction(&SCHEME, &cb, &PrevTransactions::new(), &EmbeddedKeysOnly).unwrap();
        assert!(outcome.is_valid());
    }

    #[test]
    fn embedded_key_without_index_verifies() {
        let fx = fixture();
        let tx = fx.spend(true);
        let outcome = verify_transaction(&SCHEME, &tx, &fx.prev, &EmbeddedKeysOnly).unwrap();
        assert_eq!(outcome, VerifyOutcome::Valid);
    }

    #[test]
    fn embedded_key_matching_index_verifies() {
        let fx = fixture();
        let tx = fx.spend(true);
        let index = fx.index_with(fx.wallet.public_key());
        assert!(verify_transaction(&SCHEME, &tx, &fx.prev, &index)
            .unwrap()
            .is_valid());
    }

    #[test]
    fn indexed_key_verifies_when_not_embedded() {
        let fx = fixture();
        let tx = fx.spend(false);
        let index = fx.index_with(fx.wallet.public_key());
        assert!(verify_transaction(&SCHEME, &tx, &fx.prev, &index)
            .unwrap()
            .is_valid());
    }

    #[test]
    fn unknown_key_is_rejected() {
        let fx = fixture();
        let tx = fx.spend(false);
        let outcome = verify_transaction(&SCHEME, &tx, &fx.prev, &EmbeddedKeysOnly).unwrap();
        assert_eq!(
            outcome,
            VerifyOutcome::Rejected {
                input: 0,
                reason: RejectReason::UnknownPublicKey {
                    address: fx.wallet.address()
                },
            }
        );
    }

    #[test]
    fn conflicting_key_is_rejected() {
        let fx = fixture();
        let tx = fx.spend(true);
        let other = Wallet::generate(&SCHEME).unwrap();
        let index = fx.index_with(other.public_key());
        let outcome = verify_transaction(&SCHEME, &tx, &fx.prev, &index).unwrap();
        assert!(matches!(
            outcome.reason(),
            Some(RejectReason::ConflictingPublicKey { .. })
        ));
    }

    #[test]
    fn tampered_output_is_rejected() {
        let fx = fixture();
        let mut tx = fx.spend(true);
        tx.outputs[0].value = 11;
        let outcome = verify_transaction(&SCHEME, &tx, &fx.prev, &EmbeddedKeysOnly).unwrap();
        assert_eq!(
            outcome,
            VerifyOutcome::Rejected {
                input: 0,
                reason: RejectReason::InvalidSignature
            }
        );
    }

    #[test]
    fn swapped_signatures_are_rejected() {
        let fx = fixture();
        let mut tx = fx.spend(true);
        let first = tx.inputs[0].signature.take();
        tx.inputs[0].signature = tx.inputs[1].signature.take();
        tx.inputs[1].signature = first;
        let outcome = verify_transaction(&SCHEME, &tx, &fx.prev, &EmbeddedKeysOnly).unwrap();
        assert_eq!(outcome.reason(), Some(&RejectReason::InvalidSignature));
    }

    #[test]
    fn second_input_failure_reports_its_index() {
        let fx = fixture();
        let mut tx = fx.spend(true);
        if let Some(sig) = tx.inputs[1].signature.as_mut() {
            sig[0] ^= 0x01;
        }
        let outcome = verify_transaction(&SCHEME, &tx, &fx.prev, &EmbeddedKeysOnly).unwrap();
        assert_eq!(
            outcome,
            VerifyOutcome::Rejected {
                input: 1,
                reason: RejectReason::InvalidSignature
            }
        );
    }

    #[test]
    fn unsigned_input_is_rejected() {
        let fx = fixture();
        let mut tx = fx.spend(true);
        tx.inputs[0].signature = None;
        let outcome = verify_transaction(&SCHEME, &tx, &fx.prev, &EmbeddedKeysOnly).unwrap();
        assert_eq!(outcome.reason(), Some(&RejectReason::MissingSignature));
    }

    #[test]
    fn wrong_signer_is_rejected() {
        let fx = fixture();
        let mut tx = fx.spend(false);
        let thief = Wallet::generate(&SCHEME).unwrap();
        for input in &mut tx.inputs {
            input.signature = None;
        }
        sign_transaction(&SCHEME, &mut tx, thief.private_key(), &fx.prev).unwrap();
        let index = fx.index_with(fx.wallet.public_key());
        let outcome = verify_transaction(&SCHEME, &tx, &fx.prev, &index).unwrap();
        assert_eq!(outcome.reason(), Some(&RejectReason::InvalidSignature));
    }

    #[test]
    fn missing_prev_transaction_is_an_error() {
        let fx = fixture();
        let tx = fx.spend(true);
        let err =
            verify_transaction(&SCHEME, &tx, &PrevTransactions::new(), &EmbeddedKeysOnly)
                .unwrap_err();
        assert!(matches!(err, AuthError::MissingPrevTransaction { .. }));
    }

    #[test]
    fn resolution_truth_table() {
        let a = vec![1u8; 32];
        let b = vec![2u8; 32];

        assert!(matches!(
            resolve_public_key("addr", None, None),
            Err(RejectReason::UnknownPublicKey { .. })
        ));
        assert_eq!(resolve_public_key("addr", None, Some(a.clone())), Ok(a.clone()));
        assert!(matches!(
            resolve_public_key("addr", Some(a.as_slice()), Some(b.clone())),
            Err(RejectReason::ConflictingPublicKey { .. })
        ));
        assert_eq!(resolve_public_key("addr", Some(a.as_slice()), Some(a.clone())), Ok(a.clone()));
        assert_eq!(resolve_public_key("addr", Some(b.as_slice()), None), Ok(b));
    }

    #[test]
    fn substituted_embedded_key_is_rejected() {
        let fx = fixture();
        let thief = Wallet::generate(&SCHEME).unwrap();
        let mut tx = fx.spend(false);
        for input in &mut tx.inputs {
            input.signature = None;
            input.pubkey = Some(thief.public_key().to_vec());
        }
        sign_transaction(&SCHEME, &mut tx, thief.private_key(), &fx.prev).unwrap();

        let outcome = verify_transaction(&SCHEME, &tx, &fx.prev, &EmbeddedKeysOnly).unwrap();
        assert_eq!(
            outcome,
            VerifyOutcome::Rejected {
                input: 0,
                reason: RejectReason::KeyHashMismatch {
                    address: fx.wallet.address()
                },
            }
        );
    }

    #[test]
    fn overlong_embedded_key_is_rejected() {
        let fx = fixture();
        let mut padded = fx.wallet.public_key().to_vec();
        padded.extend_from_slice(&[0xee; 8]);

        let mut tx = fx.spend(false);
        for input in &mut tx.inputs {
            input.signature = None;
            input.pubkey = Some(padded.clone());
        }
        sign_transaction(&SCHEME, &mut tx, fx.wallet.private_key(), &fx.prev).unwrap();

        // The first 32 bytes are the real key, so only the hash check can
        // tell the difference.
        let outcome = verify_transaction(&SCHEME, &tx, &fx.prev, &EmbeddedKeysOnly).unwrap();
        assert!(matches!(
            outcome.reason(),
            Some(RejectReason::KeyHashMismatch { .. })
        ));
    }

    #[test]
    fn sized_public_key_pads_and_truncates() {
        assert_eq!(sized_public_key(&[1, 2], 4), vec![1, 2, 0, 0]);
        assert_eq!(sized_public_key(&[1, 2, 3, 4, 5], 4), vec![1, 2, 3, 4]);
    }

    #[test]
    fn reject_reasons_read_well() {
        let reason = RejectReason::UnknownPublicKey {
            address: "1abc".to_string(),
        };
        assert_eq!(reason.to_string(), "public key for 1abc is unknown");
        assert_eq!(
            RejectReason::InvalidSignature.to_string(),
            "signature verification failed"
        );
    }
}
