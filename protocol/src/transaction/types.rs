//! Core transaction model.
//!
//! A [`Transaction`] moves value from previously created outputs to new
//! ones. Inputs point at earlier outputs by `(prev_txid, prev_out_index)`;
//! outputs lock a value to a public-key hash.
//!
//! # Canonical Byte Format
//!
//! [`Transaction::canonical_bytes`] is the only encoding that is ever
//! hashed or signed. It is a fixed-order, length-prefixed concatenation:
//!
//! ```text
//! bytes(id)
//! u32 input count
//!   per input:  bytes(prev_txid) i64(prev_out_index) opt(signature)
//!               bytes(pubkey_hash) opt(pubkey)
//! u32 output count
//!   per output: u64(value) bytes(pubkey_hash)
//!
//! bytes(x) = u32 LE length ‖ x
//! opt(x)   = 0x00            (absent)
//!          | 0x01 ‖ bytes(x) (present)
//! ```
//!
//! All integers are little-endian. serde is not involved, so a derive or
//! serializer version change cannot move a txid.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::config::COINBASE_OUT_INDEX;
use crate::crypto::hash::{hash_pubkey, sha256};
use crate::identity::address::{address_to_pubkey_hash, pubkey_hash_to_address, AddressError};

/// Failure to encode or decode the storage form of a transaction.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("transaction encoding failed: {0}")]
    Encode(String),

    #[error("transaction decoding failed: {0}")]
    Decode(String),
}

// ---------------------------------------------------------------------------
// TxInput
// ---------------------------------------------------------------------------

/// A reference to a previous output plus the proof of the right to spend it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxInput {
    /// Id of the transaction holding the spent output. Empty for coinbase.
    pub prev_txid: Vec<u8>,
    /// Index of the spent output, `-1` for coinbase.
    pub prev_out_index: i64,
    /// `None` until [`sign_transaction`](super::signing::sign_transaction) runs.
    pub signature: Option<Vec<u8>>,
    /// The hashed identity this input claims to satisfy.
    pub pubkey_hash: Vec<u8>,
    /// Spender's public key. Omitted when the spender expects verifiers to
    /// find it in the public-key index. For coinbase, the arbitrary data.
    pub pubkey: Option<Vec<u8>>,
}

impl TxInput {
    /// Unsigned input spending `prev_txid:prev_out_index`.
    pub fn new(
        prev_txid: Vec<u8>,
        prev_out_index: i64,
        pubkey_hash: Vec<u8>,
        pubkey: Option<Vec<u8>>,
    ) -> Self {
        Self {
            prev_txid,
            prev_out_index,
            signature: None,
            pubkey_hash,
            pubkey,
        }
    }

    /// Whether this input claims to be authorized by `pubkey_hash`.
    pub fn uses_key(&self, pubkey_hash: &[u8]) -> bool {
        self.pubkey_hash == pubkey_hash
    }

    /// The embedded public key, if one is present and non-empty.
    pub fn embedded_pubkey(&self) -> Option<&[u8]> {
        self.pubkey.as_deref().filter(|pk| !pk.is_empty())
    }

    /// The embedded public key, but only if it hashes to this input's
    /// `pubkey_hash`. This is the key the input publishes for its address;
    /// anything else is not that address's key and must not be indexed.
    pub fn published_pubkey(&self) -> Option<&[u8]> {
        self.embedded_pubkey().filter(|pk| self.uses_key(&hash_pubkey(pk)))
    }

    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }
}

// ---------------------------------------------------------------------------
// TxOutput
// ---------------------------------------------------------------------------

/// A value locked to a public-key hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    pub value: u64,
    pub pubkey_hash: Vec<u8>,
}

impl TxOutput {
    pub fn new(value: u64, pubkey_hash: Vec<u8>) -> Self {
        Self { value, pubkey_hash }
    }

    /// Output of `value` payable to `address`.
    pub fn lock_to(value: u64, address: &str) -> Result<Self, AddressError> {
        Ok(Self::new(value, address_to_pubkey_hash(address)?))
    }

    pub fn is_locked_with_key(&self, pubkey_hash: &[u8]) -> bool {
        self.pubkey_hash == pubkey_hash
    }

    /// Address this output pays to.
    pub fn address(&self) -> String {
        pubkey_hash_to_address(&self.pubkey_hash)
    }
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A transfer of value.
///
/// `id` is `SHA-256(canonical_bytes)` computed with `id` cleared, so the id
/// never covers itself. Once a transaction is built only input signatures
/// change, and only during signing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Vec<u8>,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
}

impl Transaction {
    /// Assemble a transaction and stamp its id.
    pub fn new(inputs: Vec<TxInput>, outputs: Vec<TxOutput>) -> Self {
        let mut tx = Self {
            id: Vec::new(),
            inputs,
            outputs,
        };
        tx.id = tx.canonical_id();
        tx
    }

    /// `true` iff there is exactly one input, with an empty `prev_txid` and
    /// `prev_out_index == -1`.
    pub fn is_coinbase(&self) -> bool {
        matches!(
            self.inputs.as_slice(),
            [only] if only.prev_txid.is_empty() && only.prev_out_index == COINBASE_OUT_INDEX
        )
    }

    /// Deterministic byte encoding of every field, `id` included.
    ///
    /// See the module docs for the layout.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(128 + self.inputs.len() * 96);

        put_bytes(&mut buf, &self.id);

        buf.extend_from_slice(&(self.inputs.len() as u32).to_le_bytes());
        for input in &self.inputs {
            put_bytes(&mut buf, &input.prev_txid);
            buf.extend_from_slice(&input.prev_out_index.to_le_bytes());
            put_optional(&mut buf, input.signature.as_deref());
            put_bytes(&mut buf, &input.pubkey_hash);
            put_optional(&mut buf, input.pubkey.as_deref());
        }

        buf.extend_from_slice(&(self.outputs.len() as u32).to_le_bytes());
        for output in &self.outputs {
            buf.extend_from_slice(&output.value.to_le_bytes());
            put_bytes(&mut buf, &output.pubkey_hash);
        }

        buf
    }

    /// `SHA-256` of the canonical bytes with `id` cleared.
    ///
    /// Covers signatures: a transaction's id is fixed when it is built,
    /// before signing, and recomputing it afterwards gives a different
    /// value. Compare against [`Transaction::id`] only on unsigned copies.
    pub fn canonical_id(&self) -> Vec<u8> {
        let mut unidentified = self.clone();
        unidentified.id.clear();
        sha256(&unidentified.canonical_bytes())
    }

    /// Copy with every input signature cleared.
    ///
    /// `pubkey_hash` and any embedded `pubkey` survive, outputs are copied
    /// verbatim. Signer and verifier both start from this projection.
    pub fn trimmed_copy(&self) -> Transaction {
        let inputs = self
            .inputs
            .iter()
            .map(|input| TxInput {
                signature: None,
                ..input.clone()
            })
            .collect();

        Transaction {
            id: self.id.clone(),
            inputs,
            outputs: self.outputs.clone(),
        }
    }

    /// Hex form of `id`, the key used for previous-transaction maps.
    pub fn id_hex(&self) -> String {
        hex::encode(&self.id)
    }

    /// Sum of all output values, `None` on overflow.
    pub fn total_output_value(&self) -> Option<u64> {
        self.outputs
            .iter()
            .try_fold(0u64, |acc, out| acc.checked_add(out.value))
    }

    /// Storage/transport encoding (bincode). Not used for hashing.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        bincode::serialize(self).map_err(|e| CodecError::Encode(e.to_string()))
    }

    /// Inverse of [`Transaction::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        bincode::deserialize(bytes).map_err(|e| CodecError::Decode(e.to_string()))
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Transaction {}:", self.id_hex())?;
        for (i, input) in self.inputs.iter().enumerate() {
            writeln!(f, "     Input {i}:")?;
            writeln!(f, "       TXID:       {}", hex::encode(&input.prev_txid))?;
            writeln!(f, "       Out:        {}", input.prev_out_index)?;
            writeln!(
                f,
                "       Signature:  {}",
                hex::encode(input.signature.as_deref().unwrap_or_default())
            )?;
            writeln!(f, "       PubKeyHash: {}", hex::encode(&input.pubkey_hash))?;
            writeln!(
                f,
                "       PubKey:     {}",
                hex::encode(input.pubkey.as_deref().unwrap_or_default())
            )?;
        }
        for (i, output) in self.outputs.iter().enumerate() {
            writeln!(f, "     Output {i}:")?;
            writeln!(f, "       Value:  {}", output.value)?;
            write!(f, "       Script: {}", hex::encode(&output.pubkey_hash))?;
            if i + 1 < self.outputs.len() {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

fn put_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    buf.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
    buf.extend_from_slice(bytes);
}

fn put_optional(buf: &mut Vec<u8>, bytes: Option<&[u8]>) {
    match bytes {
        Some(bytes) => {
            buf.push(0x01);
            put_bytes(buf, bytes);
        }
        None => buf.push(0x00),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
