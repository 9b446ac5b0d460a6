//! Wallets: a key pair plus the address derived from it.
//!
//! A wallet is the unit that produces public keys (into transactions and,
//! eventually, the public-key index) and consumes private keys (when
//! signing). Storing wallets on disk is out of scope for this crate.

use std::fmt;

use crate::config::PUBKEY_HASH_LEN;
use crate::crypto::hash::hash_pubkey;
use crate::crypto::signatures::{KeyPair, SignatureError, SignatureScheme};
use crate::identity::address::derive_address;

/// A spender identity.
///
/// Key bytes are in the generating scheme's native encoding. The wallet
/// does not remember which scheme produced it; pairing a wallet with the
/// wrong scheme shows up as a signing error, not silent garbage.
#[derive(Clone, PartialEq, Eq)]
pub struct Wallet {
    private_key: Vec<u8>,
    public_key: Vec<u8>,
}

impl Wallet {
    /// Generate a fresh wallet using the scheme's key generator.
    pub fn generate<S: SignatureScheme>(scheme: &S) -> Result<Self, SignatureError> {
        Ok(Self::from_keypair(scheme.keygen()?))
    }

    /// Wrap an existing key pair.
    pub fn from_keypair(keypair: KeyPair) -> Self {
        Self {
            private_key: keypair.private_key,
            public_key: keypair.public_key,
        }
    }

    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    /// Raw private key bytes. Don't log them.
    pub fn private_key(&self) -> &[u8] {
        &self.private_key
    }

    /// `RIPEMD160(SHA256(public_key))`: what outputs paying this wallet
    /// are locked to.
    pub fn pubkey_hash(&self) -> [u8; PUBKEY_HASH_LEN] {
        hash_pubkey(&self.public_key)
    }

    /// The wallet's address.
    pub fn address(&self) -> String {
        derive_address(&self.public_key)
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Wallet({})", self.address())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::signatures::Ed25519Scheme;
    use crate::identity::address::{address_to_pubkey_hash, validate_address};

    #[test]
    fn generated_wallet_has_valid_address() {
        let wallet = Wallet::generate(&Ed25519Scheme).unwrap();
        assert!(validate_address(&wallet.address()));
        assert_eq!(wallet.public_key().len(), Ed25519Scheme::PUBLIC_KEY_LENGTH);
    }

    #[test]
    fn address_commits_to_pubkey_hash() {
        let wallet = Wallet::generate(&Ed25519Scheme).unwrap();
        let decoded = address_to_pubkey_hash(&wallet.address()).unwrap();
        assert_eq!(decoded, wallet.pubkey_hash().to_vec());
    }

    #[test]
    fn wallets_are_distinct() {
        let a = Wallet::generate(&Ed25519Scheme).unwrap();
        let b = Wallet::generate(&Ed25519Scheme).unwrap();
        assert_ne!(a.address(), b.address());
    }

    #[test]
    fn debug_shows_address_only() {
        let wallet = Wallet::from_keypair(KeyPair {
            private_key: vec![0xEE; 32],
            public_key: vec![0x11; 32],
        });
        let debug = format!("{:?}", wallet);
        assert!(debug.contains(&wallet.address()));
        assert!(!debug.contains(&hex::encode(wallet.private_key())));
    }
}
