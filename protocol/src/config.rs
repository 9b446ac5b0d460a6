//! # Protocol Configuration & Constants
//!
//! Every magic number the authorization core relies on lives here. The
//! address constants are consensus-critical: change them and every address
//! ever handed out stops validating.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Address Format
// ---------------------------------------------------------------------------

/// Version byte prepended to the public-key hash before checksumming.
pub const ADDRESS_VERSION: u8 = 0x00;

/// Number of trailing checksum bytes in a decoded address.
pub const ADDRESS_CHECKSUM_LEN: usize = 4;

/// Length of `RIPEMD160(SHA256(public_key))`.
pub const PUBKEY_HASH_LEN: usize = 20;

// ---------------------------------------------------------------------------
// Coinbase
// ---------------------------------------------------------------------------

/// Value minted by a coinbase transaction.
pub const COINBASE_SUBSIDY: u64 = 10;

/// Output index carried by the single input of a coinbase transaction.
pub const COINBASE_OUT_INDEX: i64 = -1;

/// Bytes of randomness used as coinbase data when the caller supplies none.
/// Hex-encoded before embedding, so the data ends up twice this long.
pub const COINBASE_RANDOM_DATA_LEN: usize = 20;

// ---------------------------------------------------------------------------
// Public-Key Index
// ---------------------------------------------------------------------------

/// Default sled tree backing the public-key index.
pub const DEFAULT_PUBKEY_INDEX_TREE: &str = "chainstate";

/// Storage configuration for [`crate::storage::PubKeyIndex`].
///
/// The tree name is injected rather than hard-coded: deployments have used
/// more than one name for what is logically the same index, and pointing two
/// nodes at different names is how you end up with two half-populated caches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Name of the sled tree that holds `address → public key` entries.
    pub tree_name: String,
}

impl IndexConfig {
    /// Creates a configuration pointing at a specific tree.
    pub fn new(tree_name: impl Into<String>) -> Self {
        Self {
            tree_name: tree_name.into(),
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PUBKEY_INDEX_TREE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_index_config_uses_chainstate() {
        assert_eq!(IndexConfig::default().tree_name, "chainstate");
    }

    #[test]
    fn custom_index_config() {
        let cfg = IndexConfig::new("pubkeys-v2");
        assert_eq!(cfg.tree_name, "pubkeys-v2");
        assert_ne!(cfg, IndexConfig::default());
    }

    #[test]
    fn address_layout_matches_parameters() {
        let address = crate::identity::derive_address(b"any key");
        let raw = bs58::decode(&address).into_vec().unwrap();
        assert_eq!(raw.len(), 1 + PUBKEY_HASH_LEN + ADDRESS_CHECKSUM_LEN);
        assert_eq!(raw[0], ADDRESS_VERSION);
        assert_eq!(
            &raw[1..1 + PUBKEY_HASH_LEN],
            crate::crypto::hash_pubkey(b"any key").as_slice()
        );
    }
}
