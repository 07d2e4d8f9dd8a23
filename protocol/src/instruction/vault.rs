//! FanSphere vault program instructions.
//!
//! Payloads are fixed-size, little-endian, with no length prefixes. The
//! first byte selects the operation:
//!
//! | tag | operation         | payload                           | size |
//! |-----|-------------------|-----------------------------------|------|
//! | 0   | CreateVault       | seed u64, price u64, hash [u8;32] | 49   |
//! | 1   | InitVault         | seed u64, price u64, hash [u8;32] | 49   |
//! | 2   | UpdatePrice       | price u64                         | 9    |
//! | 3   | UpdateContentHash | hash [u8;32]                      | 33   |

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use super::{AccountMeta, EncodeError, Instruction, InstructionError};
use crate::address::Address;
use crate::config::{ProgramConfig, SYSTEM_PROGRAM_ID};
use crate::layout::{
    read_u64, CONTENT_HASH_LEN, CONTENT_HASH_RANGE, CREATE_VAULT_DATA_LEN,
    DISCRIMINATOR_OFFSET, PRICE_RANGE, SEED_RANGE,
};
use crate::pda::derive_vault_address;

pub const CREATE_VAULT: u8 = 0;
pub const INIT_VAULT: u8 = 1;
pub const UPDATE_PRICE: u8 = 2;
pub const UPDATE_CONTENT_HASH: u8 = 3;

const UPDATE_PRICE_DATA_LEN: usize = 1 + 8;
const UPDATE_CONTENT_HASH_DATA_LEN: usize = 1 + CONTENT_HASH_LEN;

// ---------------------------------------------------------------------------
// ContentHash
// ---------------------------------------------------------------------------

/// A 32-byte content-addressing digest supplied by the maker.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; CONTENT_HASH_LEN]);

impl ContentHash {
    pub const fn new(bytes: [u8; CONTENT_HASH_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; CONTENT_HASH_LEN] {
        &self.0
    }
}

impl TryFrom<&[u8]> for ContentHash {
    type Error = EncodeError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let array: [u8; CONTENT_HASH_LEN] = bytes
            .try_into()
            .map_err(|_| EncodeError::InvalidContentHash { len: bytes.len() })?;
        Ok(Self(array))
    }
}

impl From<[u8; CONTENT_HASH_LEN]> for ContentHash {
    fn from(bytes: [u8; CONTENT_HASH_LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self)
    }
}

impl Serialize for ContentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        let bytes = hex::decode(text).map_err(serde::de::Error::custom)?;
        ContentHash::try_from(bytes.as_slice()).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// VaultInstruction
// ---------------------------------------------------------------------------

/// A typed vault program operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VaultInstruction {
    /// Derive the vault PDA, allocate it, and write the record.
    ///
    /// Accounts:
    /// 0. `[signer, writable]` Maker (pays rent)
    /// 1. `[writable]` Vault PDA
    /// 2. `[]` Mint
    /// 3. `[]` System program
    CreateVault {
        seed: u64,
        price: u64,
        content_hash: ContentHash,
    },

    /// Write the record into an account already allocated and assigned to
    /// the program by a preceding system CreateAccount.
    ///
    /// The vault account signs, as it does for the CreateAccount. Only the
    /// holder of the vault key can initialize it.
    ///
    /// Accounts:
    /// 0. `[signer, writable]` Maker
    /// 1. `[signer, writable]` Vault account
    /// 2. `[]` Mint
    InitVault {
        seed: u64,
        price: u64,
        content_hash: ContentHash,
    },

    /// Change the unlock price.
    ///
    /// Accounts:
    /// 0. `[signer]` Maker (must be the stored owner)
    /// 1. `[writable]` Vault account
    UpdatePrice { price: u64 },

    /// Replace the content hash.
    ///
    /// Accounts:
    /// 0. `[signer]` Maker (must be the stored owner)
    /// 1. `[writable]` Vault account
    UpdateContentHash { content_hash: ContentHash },
}

impl VaultInstruction {
    pub fn discriminator(&self) -> u8 {
        match self {
            Self::CreateVault { .. } => CREATE_VAULT,
            Self::InitVault { .. } => INIT_VAULT,
            Self::UpdatePrice { .. } => UPDATE_PRICE,
            Self::UpdateContentHash { .. } => UPDATE_CONTENT_HASH,
        }
    }

    /// Operation name as it appears in program logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateVault { .. } => "CreateVault",
            Self::InitVault { .. } => "InitVault",
            Self::UpdatePrice { .. } => "UpdatePrice",
            Self::UpdateContentHash { .. } => "UpdateContentHash",
        }
    }

    /// Serializes the operation into its fixed-size payload.
    pub fn pack(&self) -> Vec<u8> {
        match *self {
            Self::CreateVault {
                seed,
                price,
                content_hash,
            }
            | Self::InitVault {
                seed,
                price,
                content_hash,
            } => {
                let mut data = vec![0u8; CREATE_VAULT_DATA_LEN];
                data[DISCRIMINATOR_OFFSET] = self.discriminator();
                data[SEED_RANGE].copy_from_slice(&seed.to_le_bytes());
                data[PRICE_RANGE].copy_from_slice(&price.to_le_bytes());
                data[CONTENT_HASH_RANGE].copy_from_slice(content_hash.as_bytes());
                data
            }
            Self::UpdatePrice { price } => {
                let mut data = Vec::with_capacity(UPDATE_PRICE_DATA_LEN);
                data.push(UPDATE_PRICE);
                data.extend_from_slice(&price.to_le_bytes());
                data
            }
            Self::UpdateContentHash { content_hash } => {
                let mut data = Vec::with_capacity(UPDATE_CONTENT_HASH_DATA_LEN);
                data.push(UPDATE_CONTENT_HASH);
                data.extend_from_slice(content_hash.as_bytes());
                data
            }
        }
    }

    /// Parses a payload produced by [`VaultInstruction::pack`].
    ///
    /// Lengths must match exactly; trailing bytes are an error, not padding.
    pub fn unpack(data: &[u8]) -> Result<Self, InstructionError> {
        let (&tag, rest) = data.split_first().ok_or(InstructionError::Empty)?;
        let expect_len = |expected: usize| {
            if data.len() == expected {
                Ok(())
            } else {
                Err(InstructionError::InvalidLength {
                    discriminator: tag as u32,
                    expected,
                    actual: data.len(),
                })
            }
        };

        match tag {
            CREATE_VAULT | INIT_VAULT => {
                expect_len(CREATE_VAULT_DATA_LEN)?;
                let (seed, price, content_hash) = read_record_fields(data);
                Ok(if tag == CREATE_VAULT {
                    Self::CreateVault {
                        seed,
                        price,
                        content_hash,
                    }
                } else {
                    Self::InitVault {
                        seed,
                        price,
                        content_hash,
                    }
                })
            }
            UPDATE_PRICE => {
                expect_len(UPDATE_PRICE_DATA_LEN)?;
                let mut price = [0u8; 8];
                price.copy_from_slice(rest);
                Ok(Self::UpdatePrice {
                    price: u64::from_le_bytes(price),
                })
            }
            UPDATE_CONTENT_HASH => {
                expect_len(UPDATE_CONTENT_HASH_DATA_LEN)?;
                let mut hash = [0u8; CONTENT_HASH_LEN];
                hash.copy_from_slice(rest);
                Ok(Self::UpdateContentHash {
                    content_hash: ContentHash(hash),
                })
            }
            other => Err(InstructionError::UnknownDiscriminator(other as u32)),
        }
    }
}

/// Reads seed, price, and content hash from a buffer already known to hold
/// at least [`CREATE_VAULT_DATA_LEN`] bytes.
fn read_record_fields(data: &[u8]) -> (u64, u64, ContentHash) {
    let seed = read_u64(data, SEED_RANGE).unwrap_or_default();
    let price = read_u64(data, PRICE_RANGE).unwrap_or_default();
    let mut hash = [0u8; CONTENT_HASH_LEN];
    hash.copy_from_slice(&data[CONTENT_HASH_RANGE]);
    (seed, price, ContentHash(hash))
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Encodes a CreateVault instruction for the vault derived from
/// `(maker, seed)`.
///
/// The content hash is validated before the address is derived or any byte
/// is written.
///
/// # Example
///
/// ```
/// use fansphere_protocol::address::Address;
/// use fansphere_protocol::config::ProgramConfig;
/// use fansphere_protocol::instruction::vault::create_vault;
///
/// let maker = Address::new_from_array([7u8; 32]);
/// let mint = Address::new_from_array([8u8; 32]);
/// let ix = create_vault(&ProgramConfig::default(), &maker, &mint, 888, 50, &[1u8; 32]).unwrap();
/// assert_eq!(ix.data.len(), 49);
/// assert_eq!(&ix.data[1..9], &888u64.to_le_bytes());
/// ```
pub fn create_vault(
    config: &ProgramConfig,
    maker: &Address,
    mint: &Address,
    seed: u64,
    price: u64,
    content_hash: &[u8],
) -> Result<Instruction, EncodeError> {
    let content_hash = ContentHash::try_from(content_hash)?;
    let vault = derive_vault_address(maker, seed, &config.program_id)?;

    let data = VaultInstruction::CreateVault {
        seed,
        price,
        content_hash,
    }
    .pack();

    Ok(Instruction::new(
        config.program_id,
        vec![
            AccountMeta::new(*maker, true),
            AccountMeta::new(vault.address, false),
            AccountMeta::new_readonly(*mint, false),
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
        ],
        data,
    ))
}

/// Encodes an InitVault instruction targeting an explicit, already
/// allocated `vault` account.
pub fn init_vault(
    config: &ProgramConfig,
    maker: &Address,
    vault: &Address,
    mint: &Address,
    seed: u64,
    price: u64,
    content_hash: &[u8],
) -> Result<Instruction, EncodeError> {
    let content_hash = ContentHash::try_from(content_hash)?;

    let data = VaultInstruction::InitVault {
        seed,
        price,
        content_hash,
    }
    .pack();

    Ok(Instruction::new(
        config.program_id,
        vec![
            AccountMeta::new(*maker, true),
            AccountMeta::new(*vault, true),
            AccountMeta::new_readonly(*mint, false),
        ],
        data,
    ))
}

pub fn update_price(
    config: &ProgramConfig,
    maker: &Address,
    vault: &Address,
    price: u64,
) -> Instruction {
    Instruction::new(
        config.program_id,
        vec![
            AccountMeta::new_readonly(*maker, true),
            AccountMeta::new(*vault, false),
        ],
        VaultInstruction::UpdatePrice { price }.pack(),
    )
}

pub fn update_content_hash(
    config: &ProgramConfig,
    maker: &Address,
    vault: &Address,
    content_hash: &[u8],
) -> Result<Instruction, EncodeError> {
    let content_hash = ContentHash::try_from(content_hash)?;
    Ok(Instruction::new(
        config.program_id,
        vec![
            AccountMeta::new_readonly(*maker, true),
            AccountMeta::new(*vault, false),
        ],
        VaultInstruction::UpdateContentHash { content_hash }.pack(),
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FANSPHERE_PROGRAM_ID;

    fn maker() -> Address {
        Address::new_from_array([7u8; 32])
    }

    fn mint() -> Address {
        Address::new_from_array([8u8; 32])
    }

    #[test]
    fn create_vault_fixed_layout() {
        let ix = create_vault(
            &ProgramConfig::default(),
            &maker(),
            &mint(),
            888,
            50,
            &[1u8; 32],
        )
        .unwrap();

        assert_eq!(ix.data.len(), 49);
        assert_eq!(ix.data[0], 0);
        assert_eq!(u64::from_le_bytes(ix.data[1..9].try_into().unwrap()), 888);
        assert_eq!(u64::from_le_bytes(ix.data[9..17].try_into().unwrap()), 50);
        assert_eq!(&ix.data[17..49], &[1u8; 32]);
    }

    #[test]
    fn create_vault_account_order() {
        let config = ProgramConfig::default();
        let ix = create_vault(&config, &maker(), &mint(), 888, 50, &[1u8; 32]).unwrap();
        let vault = derive_vault_address(&maker(), 888, &FANSPHERE_PROGRAM_ID).unwrap();

        assert_eq!(ix.program_id, FANSPHERE_PROGRAM_ID);
        assert_eq!(
            ix.accounts,
            vec![
                AccountMeta::new(maker(), true),
                AccountMeta::new(vault.address, false),
                AccountMeta::new_readonly(mint(), false),
                AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
            ]
        );
    }

    #[test]
    fn create_vault_targets_configured_program() {
        let other = ProgramConfig::new(Address::new_from_array([42u8; 32]), 114).unwrap();
        let ix = create_vault(&other, &maker(), &mint(), 1, 1, &[0u8; 32]).unwrap();
        assert_eq!(ix.program_id, other.program_id);
        let vault = derive_vault_address(&maker(), 1, &other.program_id).unwrap();
        assert_eq!(ix.accounts[1].address, vault.address);
    }

    #[test]
    fn wide_prices_are_not_truncated() {
        let price = u64::MAX - 7;
        let ix = create_vault(
            &ProgramConfig::default(),
            &maker(),
            &mint(),
            1,
            price,
            &[0u8; 32],
        )
        .unwrap();
        assert_eq!(
            u64::from_le_bytes(ix.data[9..17].try_into().unwrap()),
            price
        );
    }

    #[test]
    fn content_hash_length_is_validated() {
        for len in [0usize, 31, 33, 64] {
            let hash = vec![0u8; len];
            let err = create_vault(&ProgramConfig::default(), &maker(), &mint(), 1, 1, &hash)
                .unwrap_err();
            assert_eq!(err, EncodeError::InvalidContentHash { len });
            assert!(err.to_string().starts_with("invalid input"));
        }
    }

    #[test]
    fn init_vault_uses_explicit_account() {
        let vault = Address::new_from_array([3u8; 32]);
        let ix = init_vault(
            &ProgramConfig::default(),
            &maker(),
            &vault,
            &mint(),
            9,
            10,
            &[2u8; 32],
        )
        .unwrap();
        assert_eq!(ix.data[0], INIT_VAULT);
        assert_eq!(ix.data.len(), 49);
        assert_eq!(ix.accounts[1], AccountMeta::new(vault, true));
        assert_eq!(ix.accounts.len(), 3);
    }

    #[test]
    fn init_vault_rejects_short_hash() {
        let vault = Address::new_from_array([3u8; 32]);
        let err = init_vault(
            &ProgramConfig::default(),
            &maker(),
            &vault,
            &mint(),
            9,
            10,
            &[2u8; 31],
        )
        .unwrap_err();
        assert_eq!(err, EncodeError::InvalidContentHash { len: 31 });
    }

    #[test]
    fn update_price_layout() {
        let vault = Address::new_from_array([3u8; 32]);
        let ix = update_price(&ProgramConfig::default(), &maker(), &vault, 1_000);
        assert_eq!(ix.data.len(), 9);
        assert_eq!(ix.data[0], UPDATE_PRICE);
        assert_eq!(u64::from_le_bytes(ix.data[1..9].try_into().unwrap()), 1_000);
        assert!(ix.accounts[0].is_signer);
        assert!(!ix.accounts[0].is_writable);
    }

    #[test]
    fn unpack_inverts_pack() {
        let hash = ContentHash::new([5u8; 32]);
        let ops = [
            VaultInstruction::CreateVault {
                seed: 888,
                price: 50,
                content_hash: hash,
            },
            VaultInstruction::InitVault {
                seed: 1,
                price: u64::MAX,
                content_hash: hash,
            },
            VaultInstruction::UpdatePrice { price: 77 },
            VaultInstruction::UpdateContentHash { content_hash: hash },
        ];
        for op in ops {
            assert_eq!(VaultInstruction::unpack(&op.pack()).unwrap(), op);
        }
    }

    #[test]
    fn unpack_rejects_bad_payloads() {
        assert_eq!(
            VaultInstruction::unpack(&[]).unwrap_err(),
            InstructionError::Empty
        );
        assert_eq!(
            VaultInstruction::unpack(&[9]).unwrap_err(),
            InstructionError::UnknownDiscriminator(9)
        );
        // The short 9-byte create layout is not accepted.
        assert_eq!(
            VaultInstruction::unpack(&[0u8; 9]).unwrap_err(),
            InstructionError::InvalidLength {
                discriminator: 0,
                expected: 49,
                actual: 9
            }
        );
        assert!(VaultInstruction::unpack(&[UPDATE_PRICE; 10]).is_err());
    }

    #[test]
    fn content_hash_serde_hex() {
        let hash = ContentHash::new([0xAB; 32]);
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{}\"", "ab".repeat(32)));
        let back: ContentHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
        assert!(serde_json::from_str::<ContentHash>("\"abcd\"").is_err());
    }
}
