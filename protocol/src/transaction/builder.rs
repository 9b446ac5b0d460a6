//! Transaction construction.
//!
//! Two ways in:
//!
//! - [`Transaction::new_coinbase`] mints the block subsidy to an address.
//! - [`TransferBuilder`] assembles a spend from outputs the caller has
//!   already chosen. Choosing *which* outputs to spend is the wallet's
//!   problem, not ours.
//!
//! The builder also decides whether the spender's public key goes into
//! each input. A key that is already in the public-key index can be left
//! out: verifiers will find it, and the transaction gets smaller.

use thiserror::Error;

use super::error::AuthError;
use super::signing::{sign_transaction, PrevTransactions};
use super::types::{Transaction, TxInput, TxOutput};
use super::verification::PubKeyResolver;
use crate::config::{COINBASE_OUT_INDEX, COINBASE_RANDOM_DATA_LEN, COINBASE_SUBSIDY};
use crate::crypto::hash::hash_pubkey;
use crate::crypto::signatures::SignatureScheme;
use crate::identity::address::AddressError;
use crate::identity::Wallet;
use crate::storage::pubkey_index::IndexError;

/// Errors while assembling a transaction.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid address: {0}")]
    Address(#[from] AddressError),

    #[error("transaction has no inputs")]
    NoInputs,

    #[error("transaction has no outputs")]
    NoOutputs,

    #[error("output values overflow u64")]
    ValueOverflow,

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl Transaction {
    /// Mint [`COINBASE_SUBSIDY`] to `to_address`.
    ///
    /// The single input carries `data` both as its embedded "public key"
    /// and, hashed, as its `pubkey_hash`. Empty `data` is replaced with
    /// random bytes so two coinbases to the same address never share an id.
    pub fn new_coinbase(to_address: &str, data: &str) -> Result<Self, BuildError> {
        let data = if data.is_empty() {
            hex::encode(rand::random::<[u8; COINBASE_RANDOM_DATA_LEN]>())
        } else {
            data.to_string()
        };
        let data = data.into_bytes();

        let input = TxInput::new(
            Vec::new(),
            COINBASE_OUT_INDEX,
            hash_pubkey(&data).to_vec(),
            Some(data),
        );
        let output = TxOutput::lock_to(COINBASE_SUBSIDY, to_address)?;

        Ok(Transaction::new(vec![input], vec![output]))
    }
}

/// Whether the spender's public key is embedded in each input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyEmbedding {
    /// Always embed. Verifiable without any index.
    #[default]
    Always,
    /// Never embed. Only verifiable once the key is indexed.
    Never,
    /// Embed unless the resolver already knows the spender's address.
    IfUnindexed,
}

/// Fluent builder for spends out of a single wallet.
///
/// ```rust,no_run
/// use spendauth_protocol::crypto::Ed25519Scheme;
/// use spendauth_protocol::identity::Wallet;
/// use spendauth_protocol::transaction::{EmbeddedKeysOnly, TransferBuilder};
///
/// let wallet = Wallet::generate(&Ed25519Scheme).unwrap();
/// let tx = TransferBuilder::new(&wallet)
///     .spend(&[0xAB; 32], 0)
///     .pay(7, "1EHNa6Q4Jz2uvNExL497mE43ikXhwF6kZm")
///     .unwrap()
///     .build(&EmbeddedKeysOnly)
///     .unwrap();
/// assert_eq!(tx.inputs.len(), 1);
/// ```
#[derive(Debug)]
pub struct TransferBuilder<'w> {
    wallet: &'w Wallet,
    spends: Vec<(Vec<u8>, i64)>,
    outputs: Vec<TxOutput>,
    embedding: KeyEmbedding,
}

impl<'w> TransferBuilder<'w> {
    pub fn new(wallet: &'w Wallet) -> Self {
        Self {
            wallet,
            spends: Vec::new(),
            outputs: Vec::new(),
            embedding: KeyEmbedding::default(),
        }
    }

    /// Spend output `out_index` of transaction `prev_txid`.
    pub fn spend(mut self, prev_txid: &[u8], out_index: i64) -> Self {
        self.spends.push((prev_txid.to_vec(), out_index));
        self
    }

    /// Pay `value` to `address`.
    pub fn pay(mut self, value: u64, address: &str) -> Result<Self, BuildError> {
        self.outputs.push(TxOutput::lock_to(value, address)?);
        Ok(self)
    }

    /// Append a pre-built output, e.g. change back to the spender.
    pub fn output(mut self, output: TxOutput) -> Self {
        self.outputs.push(output);
        self
    }

    pub fn key_embedding(mut self, embedding: KeyEmbedding) -> Self {
        self.embedding = embedding;
        self
    }

    /// Assemble the unsigned transaction and stamp its id.
    ///
    /// `resolver` is only consulted for [`KeyEmbedding::IfUnindexed`].
    pub fn build<R: PubKeyResolver + ?Sized>(self, resolver: &R) -> Result<Transaction, BuildError> {
        if self.spends.is_empty() {
            return Err(BuildError::NoInputs);
        }
        if self.outputs.is_empty() {
            return Err(BuildError::NoOutputs);
        }
        let embed = match self.embedding {
            KeyEmbedding::Always => true,
            KeyEmbedding::Never => false,
            KeyEmbedding::IfUnindexed => resolver.lookup(&self.wallet.address())?.is_none(),
        };
        let pubkey = embed.then(|| self.wallet.public_key().to_vec());
        let pubkey_hash = self.wallet.pubkey_hash().to_vec();

        let inputs = self
            .spends
            .into_iter()
            .map(|(prev_txid, out_index)| {
                TxInput::new(prev_txid, out_index, pubkey_hash.clone(), pubkey.clone())
            })
            .collect();

        let tx = Transaction::new(inputs, self.outputs);
        if tx.total_output_value().is_none() {
            return Err(BuildError::ValueOverflow);
        }
        Ok(tx)
    }

    /// [`build`](Self::build), then sign every input with the wallet's key.
    pub fn build_and_sign<S, R>(
        self,
        scheme: &S,
        resolver: &R,
        prev_txs: &PrevTransactions,
    ) -> Result<Transaction, BuildError>
    where
        S: SignatureScheme,
        R: PubKeyResolver + ?Sized,
    {
        let wallet = self.wallet;
        let mut tx = self.build(resolver)?;
        sign_transaction(scheme, &mut tx, wallet.private_key(), prev_txs)?;
        Ok(tx)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
