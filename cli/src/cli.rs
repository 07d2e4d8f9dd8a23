//! # CLI Interface
//!
//! Defines the command-line argument structure for `fansphere` using `clap`
//! derive. Deployment parameters are global flags with environment
//! fallbacks so scripts can pin them once.

use clap::{Args, Parser, Subcommand};

use fansphere_protocol::address::Address;

/// FanSphere vault protocol tools.
///
/// Derives vault addresses, encodes and decodes vault data, and runs the
/// full create/read flow against an in-memory ledger.
#[derive(Parser, Debug)]
#[command(
    name = "fansphere",
    about = "FanSphere vault protocol tools",
    version,
    propagate_version = true
)]
pub struct FanSphereCli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Flags accepted by every subcommand.
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Address of the vault program. Defaults to the devnet deployment.
    #[arg(long, global = true, env = "FANSPHERE_PROGRAM_ID")]
    pub program_id: Option<Address>,

    /// Bytes allocated per vault account.
    #[arg(long, global = true, env = "FANSPHERE_VAULT_SPACE")]
    pub vault_space: Option<usize>,

    /// Log output format: `pretty` or `json`.
    #[arg(long, global = true, env = "FANSPHERE_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    /// Default log filter when `RUST_LOG` is unset.
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the vault address and bump for a maker and seed.
    Derive(DeriveArgs),
    /// Encode a CreateVault instruction and print it as JSON.
    EncodeCreate(EncodeCreateArgs),
    /// Decode raw vault account bytes and print the record as JSON.
    Decode(DecodeArgs),
    /// Create a vault on a fresh in-memory ledger and read its price back.
    Simulate(SimulateArgs),
    /// Print version information and exit.
    Version,
}

#[derive(Parser, Debug)]
pub struct DeriveArgs {
    /// Maker public key (base58).
    #[arg(long)]
    pub maker: Address,

    #[arg(long)]
    pub seed: u64,
}

#[derive(Parser, Debug)]
pub struct EncodeCreateArgs {
    /// Maker public key (base58).
    #[arg(long)]
    pub maker: Address,

    /// Mint public key (base58).
    #[arg(long)]
    pub mint: Address,

    #[arg(long)]
    pub seed: u64,

    /// Unlock price in token base units.
    #[arg(long)]
    pub price: u64,

    /// 32-byte content hash, hex encoded.
    #[arg(long)]
    pub content_hash: String,
}

#[derive(Parser, Debug)]
pub struct DecodeArgs {
    /// Raw account data, hex encoded.
    #[arg(long)]
    pub data: String,
}

#[derive(Parser, Debug)]
pub struct SimulateArgs {
    #[arg(long, default_value_t = 888)]
    pub seed: u64,

    #[arg(long, default_value_t = 50)]
    pub price: u64,

    /// 32-byte content hash, hex encoded. Defaults to 32 bytes of 0x01.
    #[arg(long)]
    pub content_hash: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        FanSphereCli::command().debug_assert();
    }

    #[test]
    fn parses_derive_with_global_flags() {
        let cli = FanSphereCli::try_parse_from([
            "fansphere",
            "derive",
            "--maker",
            "11111111111111111111111111111111",
            "--seed",
            "888",
            "--vault-space",
            "200",
        ])
        .unwrap();
        assert_eq!(cli.global.vault_space, Some(200));
        match cli.command {
            Commands::Derive(args) => {
                assert_eq!(args.seed, 888);
                assert_eq!(args.maker, Address::default());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_maker() {
        let result = FanSphereCli::try_parse_from([
            "fansphere",
            "derive",
            "--maker",
            "not-base58!",
            "--seed",
            "1",
        ]);
        assert!(result.is_err());
    }
}
