//! Address codec.
//!
//! An address is `base58(version ‖ pubkey_hash ‖ checksum)` where the
//! checksum is the first four bytes of `SHA256(SHA256(version ‖ pubkey_hash))`.
//! Addresses routinely arrive from untrusted input, so nothing in this
//! module panics on malformed strings.

use thiserror::Error;

use crate::config::{ADDRESS_CHECKSUM_LEN, ADDRESS_VERSION, PUBKEY_HASH_LEN};
use crate::crypto::hash::{double_sha256, hash_pubkey};

/// Why an address string could not be decoded.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("address is not valid base58: {0}")]
    Base58(String),

    #[error("address payload too short: {len} bytes")]
    TooShort { len: usize },

    #[error("address checksum mismatch")]
    ChecksumMismatch,

    #[error("unsupported address version 0x{0:02x}")]
    UnsupportedVersion(u8),

    #[error("embedded public-key hash has {actual} bytes, expected {expected}")]
    HashLength { expected: usize, actual: usize },
}

/// Four-byte checksum over a versioned payload.
fn checksum(versioned_payload: &[u8]) -> [u8; ADDRESS_CHECKSUM_LEN] {
    let digest = double_sha256(versioned_payload);
    let mut out = [0u8; ADDRESS_CHECKSUM_LEN];
    out.copy_from_slice(&digest[..ADDRESS_CHECKSUM_LEN]);
    out
}

/// Derive the address of a public key.
///
/// # Example
///
/// ```
/// use spendauth_protocol::identity::{derive_address, validate_address};
///
/// let address = derive_address(&[42u8; 32]);
/// assert!(validate_address(&address));
/// ```
pub fn derive_address(public_key: &[u8]) -> String {
    pubkey_hash_to_address(&hash_pubkey(public_key))
}

/// Encode an already-computed public-key hash as an address.
///
/// Used when only the hash is at hand, e.g. when reading an output or an
/// input's `pubkey_hash`.
pub fn pubkey_hash_to_address(pubkey_hash: &[u8]) -> String {
    let mut payload = Vec::with_capacity(1 + pubkey_hash.len() + ADDRESS_CHECKSUM_LEN);
    payload.push(ADDRESS_VERSION);
    payload.extend_from_slice(pubkey_hash);
    let sum = checksum(&payload);
    payload.extend_from_slice(&sum);
    bs58::encode(payload).into_string()
}

/// Check an address's checksum.
///
/// Decodes, splits off the version byte and the trailing checksum, and
/// recomputes the checksum over `version ‖ hash`. Any decode failure is
/// simply `false`. The version byte is checksummed but not required to
/// equal [`ADDRESS_VERSION`]; see [`address_to_pubkey_hash`] for the strict
/// decoder.
pub fn validate_address(address: &str) -> bool {
    split_address(address).is_ok()
}

/// Decode an address into the public-key hash it commits to.
///
/// Stricter than [`validate_address`]: the version must be ours and the
/// hash must be exactly [`PUBKEY_HASH_LEN`] bytes, since the result is about
/// to be used to lock an output.
pub fn address_to_pubkey_hash(address: &str) -> Result<Vec<u8>, AddressError> {
    let (version, hash) = split_address(address)?;
    if version != ADDRESS_VERSION {
        return Err(AddressError::UnsupportedVersion(version));
    }
    if hash.len() != PUBKEY_HASH_LEN {
        return Err(AddressError::HashLength {
            expected: PUBKEY_HASH_LEN,
            actual: hash.len(),
        });
    }
    Ok(hash)
}

/// Decode and checksum-verify, returning `(version, hash)`.
fn split_address(address: &str) -> Result<(u8, Vec<u8>), AddressError> {
    let decoded = bs58::decode(address)
        .into_vec()
        .map_err(|e| AddressError::Base58(e.to_string()))?;

    if decoded.len() < 1 + ADDRESS_CHECKSUM_LEN {
        return Err(AddressError::TooShort { len: decoded.len() });
    }

    let (versioned, actual_checksum) = decoded.split_at(decoded.len() - ADDRESS_CHECKSUM_LEN);
    if checksum(versioned) != actual_checksum {
        return Err(AddressError::ChecksumMismatch);
    }

    Ok((versioned[0], versioned[1..].to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_address_validates() {
        for seed in 0u8..16 {
            let address = derive_address(&[seed; 32]);
            assert!(validate_address(&address), "address for seed {seed}");
        }
    }

    #[test]
    fn derive_matches_hash_path() {
        let pk = [9u8; 32];
        assert_eq!(derive_address(&pk), pubkey_hash_to_address(&hash_pubkey(&pk)));
    }

    #[test]
    fn zero_version_encodes_as_leading_one() {
        // base58 preserves the leading 0x00 version byte as a '1'.
        let address = derive_address(&[1u8; 32]);
        assert!(address.starts_with('1'));
    }

    #[test]
    fn known_address_vector() {
        // Hash160 of the uncompressed secp256k1 generator, the textbook example.
        let hash = hex::decode("91b24bf9f5288532960ac687abb035127b1d28a5").unwrap();
        assert_eq!(
            pubkey_hash_to_address(&hash),
            "1EHNa6Q4Jz2uvNExL497mE43ikXhwF6kZm"
        );
    }

    #[test]
    fn decode_round_trips_hash() {
        let hash = hash_pubkey(b"some key");
        let address = pubkey_hash_to_address(&hash);
        assert_eq!(address_to_pubkey_hash(&address).unwrap(), hash.to_vec());
    }

    #[test]
    fn single_byte_flip_invalidates() {
        let address = derive_address(&[3u8; 32]);
        let mut decoded = bs58::decode(&address).into_vec().unwrap();
        for i in 0..decoded.len() {
            decoded[i] ^= 0x01;
            let tampered = bs58::encode(&decoded).into_string();
            assert!(!validate_address(&tampered), "flip at byte {i} went unnoticed");
            decoded[i] ^= 0x01;
        }
    }

    #[test]
    fn malformed_input_is_invalid_not_panic() {
        assert!(!validate_address(""));
        assert!(!validate_address("0OIl"));
        assert!(!validate_address("1"));
        assert!(!validate_address("not an address at all!"));
        assert!(matches!(
            address_to_pubkey_hash("0OIl"),
            Err(AddressError::Base58(_))
        ));
        assert!(matches!(
            address_to_pubkey_hash("11"),
            Err(AddressError::TooShort { len: 2 })
        ));
    }

    #[test]
    fn foreign_version_validates_but_does_not_decode() {
        let mut payload = vec![0x05];
        payload.extend_from_slice(&[0xAB; 20]);
        let sum = checksum(&payload);
        payload.extend_from_slice(&sum);
        let address = bs58::encode(payload).into_string();

        assert!(validate_address(&address));
        assert_eq!(
            address_to_pubkey_hash(&address),
            Err(AddressError::UnsupportedVersion(0x05))
        );
    }
}
