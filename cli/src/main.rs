// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # spendauth
//!
//! Entry point for the `spendauth` binary. Parses CLI arguments,
//! initializes logging, and dispatches to one of:
//!
//! - `keygen`   — generate a wallet, print it as JSON
//! - `address`  — derive an address from a public key or its hash
//! - `validate` — check an address checksum (exit status 1 if invalid)
//! - `lookup`   — resolve an address in a node's public-key index

mod cli;
mod logging;

use std::process::ExitCode;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use serde::Serialize;

use spendauth_protocol::config::{IndexConfig, PUBKEY_HASH_LEN};
use spendauth_protocol::crypto::{Ed25519Scheme, SignatureScheme};
use spendauth_protocol::identity::{
    derive_address, pubkey_hash_to_address, validate_address, Wallet,
};
use spendauth_protocol::storage::{LedgerDb, PubKeyIndex};

use cli::{AddressArgs, Commands, LookupArgs, SpendAuthCli, ValidateArgs};

fn main() -> Result<ExitCode> {
    let cli = SpendAuthCli::parse();
    logging::init_logging(logging::DEFAULT_LOG_FILTER, cli.log_format);

    match cli.command {
        Commands::Keygen => keygen(),
        Commands::Address(args) => address(args),
        Commands::Validate(args) => Ok(validate(args)),
        Commands::Lookup(args) => lookup(args),
    }
}

/// Wallet as printed by `keygen`. All byte fields are hex.
#[derive(Serialize)]
struct WalletJson {
    scheme: &'static str,
    address: String,
    pubkey_hash: String,
    public_key: String,
    private_key: String,
}

fn keygen() -> Result<ExitCode> {
    let scheme = Ed25519Scheme;
    let wallet = Wallet::generate(&scheme).context("key generation failed")?;

    let out = WalletJson {
        scheme: scheme.name(),
        address: wallet.address(),
        pubkey_hash: hex::encode(wallet.pubkey_hash()),
        public_key: hex::encode(wallet.public_key()),
        private_key: hex::encode(wallet.private_key()),
    };
    println!("{}", serde_json::to_string_pretty(&out)?);

    tracing::info!(address = %out.address, scheme = out.scheme, "wallet generated");
    Ok(ExitCode::SUCCESS)
}

fn address(args: AddressArgs) -> Result<ExitCode> {
    let address = match (args.pubkey, args.pubkey_hash) {
        (Some(pubkey), _) => {
            let bytes = hex::decode(pubkey.trim()).context("--pubkey is not valid hex")?;
            derive_address(&bytes)
        }
        (None, Some(hash)) => {
            let bytes = hex::decode(hash.trim()).context("--pubkey-hash is not valid hex")?;
            ensure!(
                bytes.len() == PUBKEY_HASH_LEN,
                "--pubkey-hash must be {} bytes, got {}",
                PUBKEY_HASH_LEN,
                bytes.len()
            );
            pubkey_hash_to_address(&bytes)
        }
        // clap's argument group guarantees one of the two.
        (None, None) => anyhow::bail!("one of --pubkey or --pubkey-hash is required"),
    };

    println!("{address}");
    Ok(ExitCode::SUCCESS)
}

fn validate(args: ValidateArgs) -> ExitCode {
    if validate_address(&args.address) {
        println!("valid");
        ExitCode::SUCCESS
    } else {
        println!("invalid");
        ExitCode::FAILURE
    }
}

fn lookup(args: LookupArgs) -> Result<ExitCode> {
    ensure!(
        validate_address(&args.address),
        "not a valid address: {}",
        args.address
    );

    let db = LedgerDb::open(&args.db)
        .with_context(|| format!("failed to open database at {}", args.db.display()))?;
    let index = PubKeyIndex::new(&db, &IndexConfig::new(args.index_name));

    let found = index
        .lookup(&args.address)
        .with_context(|| format!("index lookup failed for {}", args.address))?;

    tracing::debug!(
        tree = index.tree_name(),
        address = %args.address,
        found = found.is_some(),
        "index lookup"
    );

    match found {
        Some(public_key) => println!("{}", hex::encode(public_key)),
        None => println!("absent"),
    }
    Ok(ExitCode::SUCCESS)
}
