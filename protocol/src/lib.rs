// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # spendauth — Transaction Authorization Core
//!
//! This crate decides who is allowed to spend what. It owns four things:
//!
//! - how a transfer of value is represented byte-for-byte,
//! - how the creator of a transfer authorizes each input with a signature,
//! - how anyone else checks that authorization,
//! - and the index that remembers which public key spends from which address.
//!
//! Block production, mining, gossip, coin selection and wallet files live
//! elsewhere. They talk to this crate through [`storage::Ledger`],
//! [`storage::Block`], and the [`crypto::SignatureScheme`] capability.
//!
//! ## Architecture
//!
//! - **config** — Protocol constants and the injectable index configuration.
//! - **crypto** — Hash helpers and the pluggable signature capability.
//! - **identity** — Address codec and wallets (key pairs with an address).
//! - **transaction** — Canonical model, construction, signing, verification.
//! - **storage** — sled-backed public-key index plus the minimal block/chain
//!   shapes the index is driven by.
//!
//! ## Data Flow
//!
//! ```text
//! build tx ──► id = sha256(canonical bytes, id cleared)
//!    │
//!    ▼
//! sign_transaction ──► one signature per input over the trimmed copy
//!    │
//!    ▼
//! verify_transaction ──► resolve key (embedded / PubKeyIndex) ──► scheme.verify
//!    │
//!    ▼
//! block applied ──► PubKeyIndex::apply_block records new address → key pairs
//! ```

pub mod config;
pub mod crypto;
pub mod identity;
pub mod storage;
pub mod transaction;
