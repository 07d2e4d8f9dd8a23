//! # Program-Derived Addresses
//!
//! A vault lives at an address computed from the maker's identity and a
//! numeric seed, hashed together with the vault program's address. Anyone
//! holding those three inputs recomputes the same address, and because the
//! result is forced off the Ed25519 curve, no private key exists for it:
//! only the program can sign on the vault's behalf.
//!
//! ## Preimage
//!
//! ```text
//! sha256( seed_0 || ... || seed_n || bump || program_id || "ProgramDerivedAddress" )
//! ```
//!
//! For vaults the seeds are `"post"`, the maker's 32 bytes, and the seed as
//! 8 little-endian bytes. The bump search walks down from 255 and stops at
//! the first hash that is not a curve point.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::address::{bytes_are_curve_point, Address};
use crate::config::{MAX_SEEDS, MAX_SEED_LEN, PDA_MARKER, VAULT_SEED_PREFIX};
use crate::crypto::hash::hashv;

/// Errors raised by address derivation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PdaError {
    /// More seeds than the ledger accepts (the bump counts as one).
    #[error("too many seeds: {count} exceeds the maximum of 16")]
    MaxSeedsExceeded { count: usize },

    /// A single seed is longer than 32 bytes.
    #[error("seed {index} is {len} bytes, the maximum is 32")]
    MaxSeedLengthExceeded { index: usize, len: usize },

    /// The candidate hash is a valid curve point, so it is not a PDA.
    #[error("derived address lies on the ed25519 curve")]
    InvalidSeeds,

    /// Every bump from 255 down to 0 produced an on-curve point.
    #[error("no bump in 0..=255 yields an off-curve address; retry with a different seed")]
    DerivationExhausted,
}

/// A derived vault address together with the bump that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultAddress {
    pub address: Address,
    pub bump: u8,
}

fn check_seeds(seeds: &[&[u8]]) -> Result<(), PdaError> {
    if seeds.len() > MAX_SEEDS {
        return Err(PdaError::MaxSeedsExceeded { count: seeds.len() });
    }
    if let Some((index, seed)) = seeds
        .iter()
        .enumerate()
        .find(|(_, seed)| seed.len() > MAX_SEED_LEN)
    {
        return Err(PdaError::MaxSeedLengthExceeded {
            index,
            len: seed.len(),
        });
    }
    Ok(())
}

fn pda_hash(seeds: &[&[u8]], program_id: &Address) -> [u8; 32] {
    let mut parts: Vec<&[u8]> = Vec::with_capacity(seeds.len() + 2);
    parts.extend_from_slice(seeds);
    parts.push(program_id.as_ref());
    parts.push(PDA_MARKER);
    hashv(&parts)
}

/// Hashes `seeds` (bump included) under `program_id` and accepts the result
/// only if it is off the curve.
pub fn create_program_address(
    seeds: &[&[u8]],
    program_id: &Address,
) -> Result<Address, PdaError> {
    check_seeds(seeds)?;
    let hash = pda_hash(seeds, program_id);
    if bytes_are_curve_point(&hash) {
        return Err(PdaError::InvalidSeeds);
    }
    Ok(Address::new_from_array(hash))
}

/// Searches bumps 255..=0 and returns the first off-curve address, or `None`
/// if all 256 candidates land on the curve.
///
/// The loop is bounded and side-effect free; two callers with the same
/// inputs always walk the same candidates and stop at the same bump.
pub fn try_find_program_address(
    seeds: &[&[u8]],
    program_id: &Address,
) -> Result<Option<(Address, u8)>, PdaError> {
    // One slot is reserved for the bump.
    if seeds.len() >= MAX_SEEDS {
        return Err(PdaError::MaxSeedsExceeded {
            count: seeds.len() + 1,
        });
    }
    check_seeds(seeds)?;

    for bump in (0..=u8::MAX).rev() {
        let bump_seed = [bump];
        let mut candidate: Vec<&[u8]> = Vec::with_capacity(seeds.len() + 1);
        candidate.extend_from_slice(seeds);
        candidate.push(&bump_seed);
        let hash = pda_hash(&candidate, program_id);
        if !bytes_are_curve_point(&hash) {
            return Ok(Some((Address::new_from_array(hash), bump)));
        }
    }
    Ok(None)
}

/// Like [`try_find_program_address`], with exhaustion reported as
/// [`PdaError::DerivationExhausted`].
pub fn find_program_address(
    seeds: &[&[u8]],
    program_id: &Address,
) -> Result<(Address, u8), PdaError> {
    try_find_program_address(seeds, program_id)?.ok_or(PdaError::DerivationExhausted)
}

/// Derives the vault address for `(maker, seed)` under `program_id`.
///
/// # Example
///
/// ```
/// use fansphere_protocol::address::Address;
/// use fansphere_protocol::config::FANSPHERE_PROGRAM_ID;
/// use fansphere_protocol::pda::derive_vault_address;
///
/// let maker = Address::new_from_array([7u8; 32]);
/// let first = derive_vault_address(&maker, 888, &FANSPHERE_PROGRAM_ID).unwrap();
/// let again = derive_vault_address(&maker, 888, &FANSPHERE_PROGRAM_ID).unwrap();
/// assert_eq!(first, again);
/// assert!(!first.address.is_on_curve());
/// ```
pub fn derive_vault_address(
    maker: &Address,
    seed: u64,
    program_id: &Address,
) -> Result<VaultAddress, PdaError> {
    let seed_bytes = seed.to_le_bytes();
    let (address, bump) = find_program_address(
        &[VAULT_SEED_PREFIX, maker.as_ref(), &seed_bytes],
        program_id,
    )?;
    Ok(VaultAddress { address, bump })
}

/// Re-derives a vault address from a known bump without searching.
///
/// Used to verify a stored `(owner, seed, bump)` triple against the account
/// it was read from.
pub fn vault_address_with_bump(
    maker: &Address,
    seed: u64,
    bump: u8,
    program_id: &Address,
) -> Result<Address, PdaError> {
    let seed_bytes = seed.to_le_bytes();
    create_program_address(
        &[VAULT_SEED_PREFIX, maker.as_ref(), &seed_bytes, &[bump]],
        program_id,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FANSPHERE_PROGRAM_ID;
    use rand::Rng;
    use std::collections::HashSet;

    fn addr(s: &str) -> Address {
        s.parse().unwrap()
    }

    // Vectors published with the ledger's reference implementation.
    #[test]
    fn create_program_address_reference_vectors() {
        let program_id = addr("BPFLoaderUpgradeab1e11111111111111111111111");
        let public_key = addr("SeedPubey1111111111111111111111111111111111");

        assert_eq!(
            create_program_address(&[b"", &[1]], &program_id).unwrap(),
            addr("BwqrghZA2htAcqq8dzP1WDAhTXYTYWj7CHxF5j7TDBAe")
        );
        assert_eq!(
            create_program_address(&["☉".as_bytes(), &[0]], &program_id).unwrap(),
            addr("13yWmRpaTR4r5nAktwLqMpRNr28tnVUZw26rTvPSSB19")
        );
        assert_eq!(
            create_program_address(&[b"Talking", b"Squirrels"], &program_id).unwrap(),
            addr("2fnQrngrQT4SeLcdToJAD96phoEjNL2man2kfRLCASVk")
        );
        assert_eq!(
            create_program_address(&[public_key.as_ref(), &[1]], &program_id).unwrap(),
            addr("976ymqVnfE32QFe6NfGDctSvVa36LWnvYxhU6G2232YL")
        );
    }

    #[test]
    fn vault_address_known_answer() {
        let maker = Address::new_from_array([7u8; 32]);

        let vault = derive_vault_address(&maker, 888, &FANSPHERE_PROGRAM_ID).unwrap();
        assert_eq!(
            vault.address,
            addr("13MkaXQv5q6L7B9HBKHvYSZftqvWfzJjPfLitEPK4dLc")
        );
        assert_eq!(vault.bump, 255);

        // Seed 1 needs one step down the bump ladder.
        let vault = derive_vault_address(&maker, 1, &FANSPHERE_PROGRAM_ID).unwrap();
        assert_eq!(
            vault.address,
            addr("CCzAV45NkeAX5W7c2MQGyth6WdaCxLBRYVZDEg8asxry")
        );
        assert_eq!(vault.bump, 254);
    }

    #[test]
    fn derived_addresses_are_off_curve() {
        let maker = Address::new_from_array([1u8; 32]);
        for seed in 0..32 {
            let vault = derive_vault_address(&maker, seed, &FANSPHERE_PROGRAM_ID).unwrap();
            assert!(!vault.address.is_on_curve());
        }
    }

    #[test]
    fn derivation_is_deterministic() {
        let maker = Address::new_from_array([5u8; 32]);
        let a = derive_vault_address(&maker, 42, &FANSPHERE_PROGRAM_ID).unwrap();
        let b = derive_vault_address(&maker, 42, &FANSPHERE_PROGRAM_ID).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn no_collisions_across_random_inputs() {
        let mut rng = rand::thread_rng();
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            let maker = Address::new_from_array(rng.gen());
            let seed: u64 = rng.gen();
            let vault = derive_vault_address(&maker, seed, &FANSPHERE_PROGRAM_ID).unwrap();
            assert!(seen.insert(vault.address), "collision for seed {seed}");
        }
    }

    #[test]
    fn seed_and_maker_both_matter() {
        let maker = Address::new_from_array([5u8; 32]);
        let other = Address::new_from_array([6u8; 32]);
        let base = derive_vault_address(&maker, 1, &FANSPHERE_PROGRAM_ID).unwrap();
        let by_seed = derive_vault_address(&maker, 2, &FANSPHERE_PROGRAM_ID).unwrap();
        let by_maker = derive_vault_address(&other, 1, &FANSPHERE_PROGRAM_ID).unwrap();
        assert_ne!(base.address, by_seed.address);
        assert_ne!(base.address, by_maker.address);
    }

    #[test]
    fn program_id_matters() {
        let maker = Address::new_from_array([5u8; 32]);
        let other_program = Address::new_from_array([9u8; 32]);
        let a = derive_vault_address(&maker, 1, &FANSPHERE_PROGRAM_ID).unwrap();
        let b = derive_vault_address(&maker, 1, &other_program).unwrap();
        assert_ne!(a.address, b.address);
    }

    #[test]
    fn known_bump_rederives_same_address() {
        let maker = Address::new_from_array([11u8; 32]);
        let vault = derive_vault_address(&maker, 777, &FANSPHERE_PROGRAM_ID).unwrap();
        let again =
            vault_address_with_bump(&maker, 777, vault.bump, &FANSPHERE_PROGRAM_ID).unwrap();
        assert_eq!(vault.address, again);
    }

    #[test]
    fn find_agrees_with_create_at_found_bump() {
        let seeds: &[&[u8]] = &[b"post", &[3u8; 32], &5u64.to_le_bytes()];
        let (address, bump) = find_program_address(seeds, &FANSPHERE_PROGRAM_ID).unwrap();
        let created =
            create_program_address(&[seeds[0], seeds[1], seeds[2], &[bump]], &FANSPHERE_PROGRAM_ID)
                .unwrap();
        assert_eq!(address, created);
    }

    #[test]
    fn on_curve_candidate_is_rejected() {
        // Bumps above the canonical one were skipped because they were on
        // the curve; asking for one of them directly must fail.
        let maker = Address::new_from_array([7u8; 32]);
        let vault = derive_vault_address(&maker, 1, &FANSPHERE_PROGRAM_ID).unwrap();
        assert_eq!(vault.bump, 254);
        assert_eq!(
            vault_address_with_bump(&maker, 1, 255, &FANSPHERE_PROGRAM_ID).unwrap_err(),
            PdaError::InvalidSeeds
        );
    }

    #[test]
    fn overlong_seed_is_rejected() {
        let long = [0u8; 33];
        assert_eq!(
            create_program_address(&[b"ok", &long], &FANSPHERE_PROGRAM_ID).unwrap_err(),
            PdaError::MaxSeedLengthExceeded { index: 1, len: 33 }
        );
        assert_eq!(
            find_program_address(&[&long], &FANSPHERE_PROGRAM_ID).unwrap_err(),
            PdaError::MaxSeedLengthExceeded { index: 0, len: 33 }
        );
    }

    #[test]
    fn too_many_seeds_is_rejected() {
        let seeds: Vec<&[u8]> = vec![&b"x"[..]; 17];
        assert_eq!(
            create_program_address(&seeds, &FANSPHERE_PROGRAM_ID).unwrap_err(),
            PdaError::MaxSeedsExceeded { count: 17 }
        );
        // Sixteen caller seeds leave no room for the bump.
        let seeds: Vec<&[u8]> = vec![&b"x"[..]; 16];
        assert_eq!(
            find_program_address(&seeds, &FANSPHERE_PROGRAM_ID).unwrap_err(),
            PdaError::MaxSeedsExceeded { count: 17 }
        );
    }
}
