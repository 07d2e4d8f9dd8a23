//! System program instructions.
//!
//! Only `CreateAccount` is needed by vault clients: it allocates a fresh
//! account, funds it, and assigns it to an owning program in one step.

use super::{AccountMeta, Instruction, InstructionError};
use crate::address::Address;
use crate::config::SYSTEM_PROGRAM_ID;

/// Discriminator of `CreateAccount` in the system program's u32 tag space.
pub const CREATE_ACCOUNT: u32 = 0;

/// tag u32 + lamports u64 + space u64 + owner [u8; 32]
pub const CREATE_ACCOUNT_DATA_LEN: usize = 4 + 8 + 8 + 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemInstruction {
    /// Accounts:
    /// 0. `[signer, writable]` Funding account
    /// 1. `[signer, writable]` New account
    CreateAccount {
        lamports: u64,
        space: u64,
        owner: Address,
    },
}

impl SystemInstruction {
    pub fn pack(&self) -> Vec<u8> {
        match self {
            Self::CreateAccount {
                lamports,
                space,
                owner,
            } => {
                let mut data = Vec::with_capacity(CREATE_ACCOUNT_DATA_LEN);
                data.extend_from_slice(&CREATE_ACCOUNT.to_le_bytes());
                data.extend_from_slice(&lamports.to_le_bytes());
                data.extend_from_slice(&space.to_le_bytes());
                data.extend_from_slice(owner.as_bytes());
                data
            }
        }
    }

    pub fn unpack(data: &[u8]) -> Result<Self, InstructionError> {
        if data.is_empty() {
            return Err(InstructionError::Empty);
        }
        let tag_bytes: [u8; 4] = data
            .get(..4)
            .and_then(|b| b.try_into().ok())
            .ok_or(InstructionError::InvalidLength {
                discriminator: CREATE_ACCOUNT,
                expected: CREATE_ACCOUNT_DATA_LEN,
                actual: data.len(),
            })?;
        let tag = u32::from_le_bytes(tag_bytes);
        if tag != CREATE_ACCOUNT {
            return Err(InstructionError::UnknownDiscriminator(tag));
        }
        if data.len() != CREATE_ACCOUNT_DATA_LEN {
            return Err(InstructionError::InvalidLength {
                discriminator: tag,
                expected: CREATE_ACCOUNT_DATA_LEN,
                actual: data.len(),
            });
        }

        let mut lamports = [0u8; 8];
        lamports.copy_from_slice(&data[4..12]);
        let mut space = [0u8; 8];
        space.copy_from_slice(&data[12..20]);
        let mut owner = [0u8; 32];
        owner.copy_from_slice(&data[20..52]);

        Ok(Self::CreateAccount {
            lamports: u64::from_le_bytes(lamports),
            space: u64::from_le_bytes(space),
            owner: Address::new_from_array(owner),
        })
    }
}

/// Builds a `CreateAccount` instruction. Both `from` and `to` must sign.
pub fn create_account(
    from: &Address,
    to: &Address,
    lamports: u64,
    space: u64,
    owner: &Address,
) -> Instruction {
    Instruction::new(
        SYSTEM_PROGRAM_ID,
        vec![AccountMeta::new(*from, true), AccountMeta::new(*to, true)],
        SystemInstruction::CreateAccount {
            lamports,
            space,
            owner: *owner,
        }
        .pack(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FANSPHERE_PROGRAM_ID;

    #[test]
    fn create_account_layout() {
        let from = Address::new_from_array([1u8; 32]);
        let to = Address::new_from_array([2u8; 32]);
        let ix = create_account(&from, &to, 1_684_800, 114, &FANSPHERE_PROGRAM_ID);

        assert_eq!(ix.program_id, SYSTEM_PROGRAM_ID);
        assert_eq!(ix.data.len(), 52);
        assert_eq!(&ix.data[0..4], &[0, 0, 0, 0]);
        assert_eq!(
            u64::from_le_bytes(ix.data[4..12].try_into().unwrap()),
            1_684_800
        );
        assert_eq!(u64::from_le_bytes(ix.data[12..20].try_into().unwrap()), 114);
        assert_eq!(&ix.data[20..52], FANSPHERE_PROGRAM_ID.as_bytes());
        assert!(ix.accounts.iter().all(|m| m.is_signer && m.is_writable));
    }

    #[test]
    fn unpack_create_account() {
        let op = SystemInstruction::CreateAccount {
            lamports: 5,
            space: 114,
            owner: FANSPHERE_PROGRAM_ID,
        };
        assert_eq!(SystemInstruction::unpack(&op.pack()).unwrap(), op);
    }

    #[test]
    fn unpack_rejects_other_tags() {
        let mut data = vec![0u8; CREATE_ACCOUNT_DATA_LEN];
        data[0] = 2;
        assert_eq!(
            SystemInstruction::unpack(&data).unwrap_err(),
            InstructionError::UnknownDiscriminator(2)
        );
        assert_eq!(
            SystemInstruction::unpack(&[]).unwrap_err(),
            InstructionError::Empty
        );
        assert!(SystemInstruction::unpack(&[0u8; 20]).is_err());
    }
}
