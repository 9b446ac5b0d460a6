//! # Identity
//!
//! Who can spend. An identity here is nothing more than a key pair and the
//! address derived from its public key:
//!
//! ```text
//! public key ──► RIPEMD160(SHA256(pk)) ──► version ‖ hash ‖ checksum ──► base58
//! ```
//!
//! - **address** — derive, decode, and validate address strings.
//! - **wallet** — a key pair produced by a [`SignatureScheme`](crate::crypto::SignatureScheme)
//!   together with its address. Persisting wallets is somebody else's job.

pub mod address;
pub mod wallet;

pub use address::{
    address_to_pubkey_hash, derive_address, pubkey_hash_to_address, validate_address,
    AddressError,
};
pub use wallet::Wallet;
