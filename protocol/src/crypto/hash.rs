//! # Hashing Utilities
//!
//! The authorization core uses exactly three constructions:
//!
//! - **SHA-256** — transaction ids.
//! - **double SHA-256** — address checksums.
//! - **RIPEMD160(SHA256(x))** — public-key hashes, the identity an output
//!   is locked to. Twenty bytes is short enough to keep addresses typeable
//!   and still far beyond brute-force range.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

use crate::config::PUBKEY_HASH_LEN;

/// Compute the SHA-256 hash of the input data.
///
/// # Example
///
/// ```
/// use spendauth_protocol::crypto::sha256;
///
/// let hash = sha256(b"spendauth");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// Compute the SHA-256 hash and return a fixed-size array.
pub fn sha256_array(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute `SHA-256(SHA-256(data))`.
pub fn double_sha256(data: &[u8]) -> Vec<u8> {
    sha256(&sha256(data))
}

/// Hash a public key down to the 20-byte identity used in outputs and
/// addresses: `RIPEMD160(SHA256(public_key))`.
///
/// Also applied to coinbase data, which is why the argument is plain bytes
/// rather than a typed key.
pub fn hash_pubkey(public_key: &[u8]) -> [u8; PUBKEY_HASH_LEN] {
    let sha = sha256_array(public_key);
    let mut ripemd = Ripemd160::new();
    ripemd.update(sha);
    ripemd.finalize().into()
}
