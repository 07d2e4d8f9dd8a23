// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # FanSphere CLI
//!
//! Entry point for the `fansphere` binary. Parses CLI arguments, initializes
//! logging, and runs one subcommand. Results are printed to stdout as JSON.
//!
//! - `derive`        — vault address and bump for a maker and seed
//! - `encode-create` — CreateVault instruction as JSON
//! - `decode`        — vault account bytes to record
//! - `simulate`      — full create/read flow on an in-memory ledger
//! - `version`       — print build version information

mod cli;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use fansphere_protocol::client::{InMemoryLedger, VaultClient};
use fansphere_protocol::config::{ProgramConfig, LAMPORTS_PER_SOL};
use fansphere_protocol::crypto::Keypair;
use fansphere_protocol::instruction::vault::create_vault;
use fansphere_protocol::pda::derive_vault_address;
use fansphere_protocol::state::VaultAccountRecord;

use cli::{Commands, FanSphereCli, GlobalArgs};
use logging::LogFormat;

fn main() -> Result<()> {
    let cli = FanSphereCli::parse();
    logging::init_logging(
        &cli.global.log_level,
        LogFormat::from_str_lossy(&cli.global.log_format),
    );

    let config = program_config(&cli.global)?;
    tracing::debug!(
        program_id = %config.program_id,
        vault_space = config.vault_space,
        "configuration resolved"
    );

    match cli.command {
        Commands::Derive(args) => {
            let vault = derive_vault_address(&args.maker, args.seed, &config.program_id)
                .context("vault address derivation failed")?;
            print_json(&vault)
        }
        Commands::EncodeCreate(args) => {
            let content_hash = decode_hex(&args.content_hash, "content hash")?;
            let ix = create_vault(
                &config,
                &args.maker,
                &args.mint,
                args.seed,
                args.price,
                &content_hash,
            )
            .context("failed to encode CreateVault")?;
            print_json(&ix)
        }
        Commands::Decode(args) => {
            let data = decode_hex(&args.data, "account data")?;
            let record =
                VaultAccountRecord::decode(&data).context("failed to decode account data")?;
            print_json(&record)
        }
        Commands::Simulate(args) => simulate(config, args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Merges CLI/env overrides onto the default deployment.
fn program_config(global: &GlobalArgs) -> Result<ProgramConfig> {
    let defaults = ProgramConfig::default();
    ProgramConfig::new(
        global.program_id.unwrap_or(defaults.program_id),
        global.vault_space.unwrap_or(defaults.vault_space),
    )
    .context("invalid program configuration")
}

#[derive(Serialize)]
struct SimulationReport {
    maker: String,
    vault: String,
    bump: u8,
    signature: String,
    price: Option<u64>,
    record: Option<VaultAccountRecord>,
}

/// Funds a throwaway maker, creates a vault, and reads it back.
fn simulate(config: ProgramConfig, args: cli::SimulateArgs) -> Result<()> {
    let content_hash = match &args.content_hash {
        Some(text) => decode_hex(text, "content hash")?,
        None => vec![1u8; 32],
    };

    let ledger = InMemoryLedger::new(config);
    let maker = Keypair::generate();
    ledger.airdrop(&maker.address(), LAMPORTS_PER_SOL);
    let mint = Keypair::generate().address();

    let client = VaultClient::new(config, &ledger);
    let created = client
        .create_vault(&maker, &mint, args.seed, args.price, &content_hash)
        .map_err(|e| {
            for line in e.logs() {
                tracing::warn!(log = %line, "program log");
            }
            e
        })
        .context("vault creation failed")?;

    let record = client
        .fetch_vault(&created.vault.address)
        .context("failed to read vault back")?;

    print_json(&SimulationReport {
        maker: maker.address().to_string(),
        vault: created.vault.address.to_string(),
        bump: created.vault.bump,
        signature: created.signature.to_string(),
        price: record.as_ref().map(|r| r.price),
        record,
    })
}

fn decode_hex(text: &str, what: &str) -> Result<Vec<u8>> {
    let trimmed = text.trim().trim_start_matches("0x");
    hex::decode(trimmed).with_context(|| format!("{what} is not valid hex"))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{json}");
    Ok(())
}

fn print_version() {
    println!("fansphere {}", env!("CARGO_PKG_VERSION"));
    println!("program   {}", ProgramConfig::default().program_id);
    println!("rustc     {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_accepts_prefix_and_whitespace() {
        assert_eq!(decode_hex(" 0x0a0b ", "x").unwrap(), vec![0x0a, 0x0b]);
        assert!(decode_hex("zz", "x").is_err());
    }

    #[test]
    fn config_overrides_apply() {
        let global = GlobalArgs {
            program_id: None,
            vault_space: Some(200),
            log_format: "pretty".into(),
            log_level: "warn".into(),
        };
        let config = program_config(&global).unwrap();
        assert_eq!(config.vault_space, 200);
        assert_eq!(config.program_id, ProgramConfig::default().program_id);
    }

    #[test]
    fn config_rejects_small_space() {
        let global = GlobalArgs {
            program_id: None,
            vault_space: Some(81),
            log_format: "pretty".into(),
            log_level: "warn".into(),
        };
        assert!(program_config(&global).is_err());
    }
}
