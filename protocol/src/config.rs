//! # Protocol Configuration & Constants
//!
//! Every magic number the vault protocol depends on lives here. The program
//! address and the allocated account space are the two values a deployment
//! may change; they travel through the codec as an explicit
//! [`ProgramConfig`] rather than as process-wide state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::address::Address;
use crate::layout::VAULT_RECORD_LEN;

// ---------------------------------------------------------------------------
// Program Identifiers
// ---------------------------------------------------------------------------

/// Devnet deployment of the FanSphere vault program
/// (`2maVZnfpRWE95P4zhrZPasUiDsMoxk7cxDtTMWb7N6u7`).
pub const FANSPHERE_PROGRAM_ID: Address = Address::new_from_array([
    26, 71, 28, 212, 203, 93, 214, 37, 194, 197, 206, 180, 80, 159, 199, 198, 202, 38, 13, 169,
    26, 220, 205, 220, 9, 97, 190, 37, 148, 30, 199, 170,
]);

/// The system program (`11111111111111111111111111111111`). Owns every
/// freshly funded wallet and is the only program that can allocate space.
pub const SYSTEM_PROGRAM_ID: Address = Address::new_from_array([0u8; 32]);

// ---------------------------------------------------------------------------
// Address Derivation
// ---------------------------------------------------------------------------

/// Domain-separation tag prepended to every vault address preimage.
pub const VAULT_SEED_PREFIX: &[u8] = b"post";

/// Suffix appended to every program-derived address preimage. Keeps PDA
/// hashes in their own domain, distinct from any other SHA-256 use.
pub const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

/// Maximum number of seeds (including the bump) in one derivation.
pub const MAX_SEEDS: usize = 16;

/// Maximum length of any single seed, in bytes.
pub const MAX_SEED_LEN: usize = 32;

// ---------------------------------------------------------------------------
// Account Space
// ---------------------------------------------------------------------------

/// Bytes allocated for each vault account by the deployed program.
pub const VAULT_ACCOUNT_SPACE: usize = 114;

// ---------------------------------------------------------------------------
// Transaction Limits & Fees
// ---------------------------------------------------------------------------

/// Largest serialized transaction the ledger accepts (IPv6 MTU minus headers).
pub const PACKET_DATA_SIZE: usize = 1232;

/// Base fee charged per required signature, in lamports.
pub const LAMPORTS_PER_SIGNATURE: u64 = 5_000;

/// One native token in lamports.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Number of recent checkpoints a transaction may reference before it is
/// considered stale.
pub const MAX_RECENT_CHECKPOINTS: usize = 150;

// ---------------------------------------------------------------------------
// Rent
// ---------------------------------------------------------------------------

/// Metadata overhead the ledger bills for every account, in bytes.
pub const ACCOUNT_STORAGE_OVERHEAD: u64 = 128;

/// Lamports charged per byte per year of storage.
pub const DEFAULT_LAMPORTS_PER_BYTE_YEAR: u64 = 3_480;

/// Years of rent an account must hold up front to be exempt.
pub const DEFAULT_EXEMPTION_THRESHOLD: u64 = 2;

// ---------------------------------------------------------------------------
// ProgramConfig
// ---------------------------------------------------------------------------

/// Errors raised while validating a [`ProgramConfig`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid input: vault space {space} is smaller than the {min}-byte record")]
    VaultSpaceTooSmall { space: usize, min: usize },
}

/// Deployment parameters injected into every encoder and client.
///
/// The codec treats both fields as opaque inputs: it never computes the
/// program address and never assumes the allocation equals the meaningful
/// record length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramConfig {
    /// Address of the deployed vault program.
    pub program_id: Address,
    /// Bytes allocated for each vault account.
    pub vault_space: usize,
}

impl ProgramConfig {
    /// Builds a config, rejecting allocations too small to hold the full
    /// record the program writes (owner, bump and mint included).
    pub fn new(program_id: Address, vault_space: usize) -> Result<Self, ConfigError> {
        if vault_space < VAULT_RECORD_LEN {
            return Err(ConfigError::VaultSpaceTooSmall {
                space: vault_space,
                min: VAULT_RECORD_LEN,
            });
        }
        Ok(Self {
            program_id,
            vault_space,
        })
    }
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            program_id: FANSPHERE_PROGRAM_ID,
            vault_space: VAULT_ACCOUNT_SPACE,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn program_id_matches_deployment() {
        assert_eq!(
            FANSPHERE_PROGRAM_ID.to_string(),
            "2maVZnfpRWE95P4zhrZPasUiDsMoxk7cxDtTMWb7N6u7"
        );
    }

    #[test]
    fn system_program_id_is_all_ones_in_base58() {
        assert_eq!(
            SYSTEM_PROGRAM_ID.to_string(),
            "11111111111111111111111111111111"
        );
    }

    #[test]
    fn default_config_uses_deployment_values() {
        let config = ProgramConfig::default();
        assert_eq!(config.program_id, FANSPHERE_PROGRAM_ID);
        assert_eq!(config.vault_space, 114);
    }

    #[test]
    fn config_rejects_space_below_record_size() {
        for space in [48usize, 49, 60, 81, 113] {
            let err = ProgramConfig::new(FANSPHERE_PROGRAM_ID, space).unwrap_err();
            assert_eq!(err, ConfigError::VaultSpaceTooSmall { space, min: 114 });
        }
        assert!(ProgramConfig::new(FANSPHERE_PROGRAM_ID, 114).is_ok());
        assert!(ProgramConfig::new(FANSPHERE_PROGRAM_ID, 200).is_ok());
    }
}
