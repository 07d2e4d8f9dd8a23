//! # Vault Account Record
//!
//! The bytes a vault account holds on the ledger, and the typed record they
//! decode to. The first 49 bytes mirror the create payload so encode and
//! decode share offsets (see [`crate::layout`]). The owner, bump and mint
//! follow, then a zeroed reserved tail up to the allocation size.
//!
//! Decoding is total over any buffer of at least 49 bytes. It never scans
//! for a value and never substitutes a default for missing data.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::address::Address;
use crate::instruction::ContentHash;
use crate::layout::{
    read_u64, BUMP_OFFSET, CONTENT_HASH_LEN, CONTENT_HASH_RANGE, DISCRIMINATOR_OFFSET,
    MINT_RANGE, OWNER_RANGE, PRICE_RANGE, RESERVED_OFFSET, SEED_RANGE, VAULT_AUTHORITY_LEN,
    VAULT_RECORD_LEN, VAULT_RECORD_MIN_LEN,
};

/// Account tag of a zeroed, not yet written allocation.
pub const UNINITIALIZED_ACCOUNT_TAG: u8 = 0;

/// Account tag of a written vault record.
pub const VAULT_ACCOUNT_TAG: u8 = 1;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The account exists but holds no data.
    #[error("account data is empty")]
    AccountEmpty,

    /// The account holds fewer bytes than a record needs.
    #[error("account data truncated: {len} bytes, need at least {min}")]
    TruncatedAccount { len: usize, min: usize },
}

/// Who controls the vault, as recorded by the program at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultAuthority {
    pub owner: Address,
    /// Bump of the vault PDA, or 0 for an account initialized in place.
    pub bump: u8,
}

/// Decoded vault account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultAccountRecord {
    /// Account tag: [`VAULT_ACCOUNT_TAG`] once written.
    pub discriminator: u8,
    pub seed: u64,
    pub price: u64,
    pub content_hash: ContentHash,
    /// Present only when the buffer reaches past the bump byte.
    pub authority: Option<VaultAuthority>,
    /// Token mint the vault is priced in. Present only when the buffer
    /// holds the full record.
    pub mint: Option<Address>,
    /// Everything from the reserved offset to the end of the buffer.
    #[serde(with = "crate::hex_serde")]
    pub reserved: Vec<u8>,
}

impl VaultAccountRecord {
    /// A freshly written record for `owner`, priced in `mint`.
    pub fn new(
        seed: u64,
        price: u64,
        content_hash: ContentHash,
        owner: Address,
        bump: u8,
        mint: Address,
    ) -> Self {
        Self {
            discriminator: VAULT_ACCOUNT_TAG,
            seed,
            price,
            content_hash,
            authority: Some(VaultAuthority { owner, bump }),
            mint: Some(mint),
            reserved: Vec::new(),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.discriminator == VAULT_ACCOUNT_TAG
    }

    pub fn owner(&self) -> Option<&Address> {
        self.authority.as_ref().map(|a| &a.owner)
    }

    /// Decodes raw account bytes.
    ///
    /// # Example
    ///
    /// ```
    /// use fansphere_protocol::state::{DecodeError, VaultAccountRecord};
    ///
    /// assert_eq!(VaultAccountRecord::decode(&[]), Err(DecodeError::AccountEmpty));
    ///
    /// let mut raw = vec![0u8; 114];
    /// raw[0] = 1;
    /// raw[9..17].copy_from_slice(&50u64.to_le_bytes());
    /// assert_eq!(VaultAccountRecord::decode(&raw).unwrap().price, 50);
    /// ```
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        check_len(data)?;

        let seed = read_u64(data, SEED_RANGE).ok_or_else(|| truncated(data))?;
        let price = read_u64(data, PRICE_RANGE).ok_or_else(|| truncated(data))?;
        let mut hash = [0u8; CONTENT_HASH_LEN];
        hash.copy_from_slice(&data[CONTENT_HASH_RANGE]);

        let authority = if data.len() >= VAULT_AUTHORITY_LEN {
            let mut owner = [0u8; 32];
            owner.copy_from_slice(&data[OWNER_RANGE]);
            Some(VaultAuthority {
                owner: Address::new_from_array(owner),
                bump: data[BUMP_OFFSET],
            })
        } else {
            None
        };

        let mint = data.get(MINT_RANGE).map(|bytes| {
            let mut mint = [0u8; 32];
            mint.copy_from_slice(bytes);
            Address::new_from_array(mint)
        });

        let reserved = data.get(RESERVED_OFFSET..).unwrap_or_default().to_vec();

        Ok(Self {
            discriminator: data[DISCRIMINATOR_OFFSET],
            seed,
            price,
            content_hash: ContentHash::new(hash),
            authority,
            mint,
            reserved,
        })
    }

    /// Writes the record into `dst`, which is typically the whole account
    /// allocation.
    ///
    /// Fails without writing if `dst` cannot hold a field the record
    /// carries. Absent fields are zeroed where `dst` has room for them. The
    /// reserved region is zeroed, then overlaid with as much of
    /// `self.reserved` as fits.
    pub fn pack_into(&self, dst: &mut [u8]) -> Result<(), DecodeError> {
        check_len(dst)?;
        if self.authority.is_some() && dst.len() < VAULT_AUTHORITY_LEN {
            return Err(DecodeError::TruncatedAccount {
                len: dst.len(),
                min: VAULT_AUTHORITY_LEN,
            });
        }
        if self.mint.is_some() && dst.len() < VAULT_RECORD_LEN {
            return Err(DecodeError::TruncatedAccount {
                len: dst.len(),
                min: VAULT_RECORD_LEN,
            });
        }

        dst[DISCRIMINATOR_OFFSET] = self.discriminator;
        dst[SEED_RANGE].copy_from_slice(&self.seed.to_le_bytes());
        dst[PRICE_RANGE].copy_from_slice(&self.price.to_le_bytes());
        dst[CONTENT_HASH_RANGE].copy_from_slice(self.content_hash.as_bytes());

        if dst.len() >= VAULT_AUTHORITY_LEN {
            let authority = self.authority.unwrap_or(VaultAuthority {
                owner: Address::default(),
                bump: 0,
            });
            dst[OWNER_RANGE].copy_from_slice(authority.owner.as_bytes());
            dst[BUMP_OFFSET] = authority.bump;
        }

        if let Some(slot) = dst.get_mut(MINT_RANGE) {
            slot.copy_from_slice(self.mint.unwrap_or_default().as_bytes());
        }

        if let Some(tail) = dst.get_mut(RESERVED_OFFSET..) {
            tail.fill(0);
            let n = tail.len().min(self.reserved.len());
            tail[..n].copy_from_slice(&self.reserved[..n]);
        }
        Ok(())
    }

    /// Serializes the record into a fresh buffer of `space` bytes.
    pub fn to_bytes(&self, space: usize) -> Result<Vec<u8>, DecodeError> {
        let mut data = vec![0u8; space];
        self.pack_into(&mut data)?;
        Ok(data)
    }
}

/// Reads only the price from raw account bytes.
pub fn decode_price(data: &[u8]) -> Result<u64, DecodeError> {
    check_len(data)?;
    read_u64(data, PRICE_RANGE).ok_or_else(|| truncated(data))
}

fn check_len(data: &[u8]) -> Result<(), DecodeError> {
    if data.is_empty() {
        return Err(DecodeError::AccountEmpty);
    }
    if data.len() < VAULT_RECORD_MIN_LEN {
        return Err(truncated(data));
    }
    Ok(())
}

fn truncated(data: &[u8]) -> DecodeError {
    DecodeError::TruncatedAccount {
        len: data.len(),
        min: VAULT_RECORD_MIN_LEN,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
