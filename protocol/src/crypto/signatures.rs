//! # Digital Signatures
//!
//! The signature capability the authorization protocol is built on.
//!
//! The protocol never names a concrete algorithm. It asks a
//! [`SignatureScheme`] for three things: make me a key pair, sign these
//! bytes, check this signature. Key and signature material crosses the
//! trait boundary as opaque byte strings, because that is how it is stored
//! in transactions and in the public-key index.
//!
//! ## Public-key length
//!
//! Every scheme declares a fixed [`SignatureScheme::PUBLIC_KEY_LENGTH`].
//! The verifier copies the resolved key into a zero-initialized buffer of
//! exactly that length before calling [`SignatureScheme::verify`], so keys
//! pulled out of storage are always handed over at the size the algorithm
//! expects. Ed25519 declares 32; a Falcon-1024 backend would declare 1793.
//!
//! ## Strictness
//!
//! [`Ed25519Scheme`] uses `ed25519-dalek`'s strict verification. We reject
//! some edge-case signatures that lenient implementations accept, and we
//! don't need to be compatible with anything that gets the cofactor wrong.

use ed25519_dalek::{Signature as DalekSignature, Signer, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use std::fmt;
use thiserror::Error;

/// Errors during signature operations.
///
/// A signature that simply doesn't verify is *not* an error; that is
/// `Ok(false)`. Errors mean the inputs could not be interpreted at all.
#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("invalid private key: expected {expected} bytes, got {actual}")]
    InvalidPrivateKey { expected: usize, actual: usize },

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("key generation failed: {0}")]
    KeyGeneration(String),
}

/// A freshly generated key pair in the scheme's native byte encoding.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPair {
    pub private_key: Vec<u8>,
    pub public_key: Vec<u8>,
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print secret key material in debug output.
        write!(f, "KeyPair(pub={})", hex::encode(&self.public_key))
    }
}

/// The pluggable asymmetric signature capability.
///
/// Implementations must be deterministic about sizes: every public key a
/// scheme produces is exactly `PUBLIC_KEY_LENGTH` bytes.
pub trait SignatureScheme {
    /// Fixed public-key size for this algorithm, in bytes.
    const PUBLIC_KEY_LENGTH: usize;

    /// Human-readable algorithm name, used in logs.
    fn name(&self) -> &'static str;

    /// Generate a fresh key pair.
    fn keygen(&self) -> Result<KeyPair, SignatureError>;

    /// Sign `message` with `private_key`.
    fn sign(&self, message: &[u8], private_key: &[u8]) -> Result<Vec<u8>, SignatureError>;

    /// Check `signature` over `message` against `public_key`.
    ///
    /// Returns `Ok(false)` for a well-formed but wrong signature and
    /// `Err(..)` only when the public key itself cannot be parsed.
    fn verify(
        &self,
        message: &[u8],
        signature: &[u8],
        public_key: &[u8],
    ) -> Result<bool, SignatureError>;
}

// ---------------------------------------------------------------------------
// Ed25519
// ---------------------------------------------------------------------------

/// Ed25519 via `ed25519-dalek`.
///
/// Private keys are the 32-byte seed; public keys the 32-byte compressed
/// point; signatures 64 bytes. Signing is deterministic (RFC 8032), which
/// makes signatures over identical trimmed copies reproducible in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Scheme;

impl Ed25519Scheme {
    pub const PRIVATE_KEY_LENGTH: usize = ed25519_dalek::SECRET_KEY_LENGTH;
    pub const SIGNATURE_LENGTH: usize = ed25519_dalek::SIGNATURE_LENGTH;

    fn signing_key(private_key: &[u8]) -> Result<SigningKey, SignatureError> {
        let seed: [u8; ed25519_dalek::SECRET_KEY_LENGTH] =
            private_key
                .try_into()
                .map_err(|_| SignatureError::InvalidPrivateKey {
                    expected: Self::PRIVATE_KEY_LENGTH,
                    actual: private_key.len(),
                })?;
        Ok(SigningKey::from_bytes(&seed))
    }
}

impl SignatureScheme for Ed25519Scheme {
    const PUBLIC_KEY_LENGTH: usize = ed25519_dalek::PUBLIC_KEY_LENGTH;

    fn name(&self) -> &'static str {
        "Ed25519"
    }

    fn keygen(&self) -> Result<KeyPair, SignatureError> {
        let signing_key = SigningKey::generate(&mut OsRng);
        Ok(KeyPair {
            private_key: signing_key.to_bytes().to_vec(),
            public_key: signing_key.verifying_key().to_bytes().to_vec(),
        })
    }

    fn sign(&self, message: &[u8], private_key: &[u8]) -> Result<Vec<u8>, SignatureError> {
        let signing_key = Self::signing_key(private_key)?;
        Ok(signing_key.sign(message).to_bytes().to_vec())
    }

    fn verify(
        &self,
        message: &[u8],
        signature: &[u8],
        public_key: &[u8],
    ) -> Result<bool, SignatureError> {
        let key_bytes: [u8; ed25519_dalek::PUBLIC_KEY_LENGTH] = public_key
            .try_into()
            .map_err(|_| SignatureError::InvalidPublicKey)?;
        let verifying_key =
            VerifyingKey::from_bytes(&key_bytes).map_err(|_| SignatureError::InvalidPublicKey)?;

        let Ok(sig_bytes) = <[u8; ed25519_dalek::SIGNATURE_LENGTH]>::try_from(signature) else {
            return Ok(false);
        };
        let signature = DalekSignature::from_bytes(&sig_bytes);
        Ok(verifying_key.verify_strict(message, &signature).is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_and_verify() {
        let scheme = Ed25519Scheme;
        let kp = scheme.keygen().unwrap();
        let sig = scheme.sign(b"hello, world", &kp.private_key).unwrap();
        assert!(scheme.verify(b"hello, world", &sig, &kp.public_key).unwrap());
    }

    #[test]
    fn test_key_sizes_match_declared_constants() {
        let kp = Ed25519Scheme.keygen().unwrap();
        assert_eq!(kp.public_key.len(), Ed25519Scheme::PUBLIC_KEY_LENGTH);
        assert_eq!(kp.private_key.len(), Ed25519Scheme::PRIVATE_KEY_LENGTH);
    }

    #[test]
    fn test_wrong_message_fails() {
        let scheme = Ed25519Scheme;
        let kp = scheme.keygen().unwrap();
        let sig = scheme.sign(b"correct message", &kp.private_key).unwrap();
        assert!(!scheme.verify(b"wrong message", &sig, &kp.public_key).unwrap());
    }

    #[test]
    fn test_wrong_key_fails() {
        let scheme = Ed25519Scheme;
        let kp1 = scheme.keygen().unwrap();
        let kp2 = scheme.keygen().unwrap();
        let sig = scheme.sign(b"test message", &kp1.private_key).unwrap();
        assert!(!scheme.verify(b"test message", &sig, &kp2.public_key).unwrap());
    }

    #[test]
    fn test_deterministic_signatures() {
        let scheme = Ed25519Scheme;
        let kp = scheme.keygen().unwrap();
        let sig1 = scheme.sign(b"same bytes", &kp.private_key).unwrap();
        let sig2 = scheme.sign(b"same bytes", &kp.private_key).unwrap();
        assert_eq!(sig1, sig2);
        assert_eq!(sig1.len(), Ed25519Scheme::SIGNATURE_LENGTH);
    }

    #[test]
    fn test_truncated_signature_is_false_not_error() {
        let scheme = Ed25519Scheme;
        let kp = scheme.keygen().unwrap();
        let sig = scheme.sign(b"msg", &kp.private_key).unwrap();
        assert!(!scheme.verify(b"msg", &sig[..63], &kp.public_key).unwrap());
        assert!(!scheme.verify(b"msg", &[], &kp.public_key).unwrap());
    }

    #[test]
    fn test_short_private_key_rejected() {
        let err = Ed25519Scheme.sign(b"msg", &[1u8; 16]).unwrap_err();
        assert!(matches!(
            err,
            SignatureError::InvalidPrivateKey {
                expected: 32,
                actual: 16
            }
        ));
    }

    #[test]
    fn test_malformed_public_key_is_error() {
        let scheme = Ed25519Scheme;
        assert!(scheme.verify(b"msg", &[0u8; 64], &[1u8; 5]).is_err());
    }

    #[test]
    fn test_debug_hides_private_key() {
        let kp = Ed25519Scheme.keygen().unwrap();
        let debug = format!("{:?}", kp);
        assert!(debug.contains(&hex::encode(&kp.public_key)));
        assert!(!debug.contains(&hex::encode(&kp.private_key)));
    }
}
