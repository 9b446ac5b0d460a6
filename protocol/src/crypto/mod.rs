//! # Cryptographic Primitives
//!
//! Two concerns live here and nothing else:
//!
//! - **hash** — SHA-256 based helpers for transaction ids, address
//!   checksums and public-key hashes.
//! - **signatures** — the pluggable signature capability. The authorization
//!   protocol only ever sees the [`SignatureScheme`] trait, so swapping
//!   Ed25519 for a post-quantum scheme is a matter of implementing three
//!   methods and a length constant.
//!
//! Everything here wraps audited implementations. Nothing here is clever.

pub mod hash;
pub mod signatures;

pub use hash::{double_sha256, hash_pubkey, sha256};
pub use signatures::{Ed25519Scheme, KeyPair, SignatureError, SignatureScheme};
