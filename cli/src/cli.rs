//! # CLI Interface
//!
//! Defines the command-line argument structure for `spendauth` using
//! `clap` derive. Subcommands cover key generation, the address codec, and
//! read-only queries against a node's public-key index.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use spendauth_protocol::config::DEFAULT_PUBKEY_INDEX_TREE;

/// Spend-authorization toolkit.
///
/// Generates wallets, encodes and checks addresses, and inspects the
/// address → public key index stored in a node database.
#[derive(Parser, Debug)]
#[command(
    name = "spendauth",
    about = "Spend-authorization toolkit: wallets, addresses, public-key index",
    version,
    propagate_version = true
)]
pub struct SpendAuthCli {
    /// Log output format. Logs go to stderr; stdout carries results only.
    #[arg(long, global = true, value_enum, env = "SPENDAUTH_LOG_FORMAT", default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable output. Suitable for local use.
    Pretty,
    /// Machine-parseable JSON lines.
    Json,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a fresh wallet and print it as JSON.
    Keygen,
    /// Derive an address from a public key or a public-key hash.
    Address(AddressArgs),
    /// Check an address's checksum. Exits 1 when invalid.
    Validate(ValidateArgs),
    /// Look up the public key an address published, in a node database.
    Lookup(LookupArgs),
}

/// Arguments for the `address` subcommand.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct AddressArgs {
    /// Hex-encoded public key.
    #[arg(long)]
    pub pubkey: Option<String>,

    /// Hex-encoded 20-byte public-key hash.
    #[arg(long)]
    pub pubkey_hash: Option<String>,
}

/// Arguments for the `validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Base58 address to check.
    pub address: String,
}

/// Arguments for the `lookup` subcommand.
#[derive(Args, Debug)]
pub struct LookupArgs {
    /// Path to the node database directory.
    #[arg(long, env = "SPENDAUTH_DB")]
    pub db: PathBuf,

    /// Name of the sled tree holding the index.
    #[arg(long, env = "SPENDAUTH_INDEX_NAME", default_value = DEFAULT_PUBKEY_INDEX_TREE)]
    pub index_name: String,

    /// Base58 address to resolve.
    pub address: String,
}
