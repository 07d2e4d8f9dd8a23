//! Message compilation: the bytes every signer signs.
//!
//! Instructions reference accounts by address; the compiled message
//! replaces those with one-byte indices into a single deduplicated key
//! list. The list is ordered so the header can describe every key's role
//! with three counts:
//!
//! ```text
//! [ writable signers | read-only signers | writable | read-only ]
//!   ^ fee payer first                                 ^ program ids
//! ```
//!
//! Wire format (lengths are compact-u16 "short vec" prefixes):
//!
//! ```text
//! header (3 bytes) | #keys | keys (32 each) | checkpoint (32)
//!   | #instructions | { program index | #accounts | indices | #data | data }*
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::Checkpoint;
use crate::address::Address;
use crate::config::PACKET_DATA_SIZE;
use crate::instruction::Instruction;

/// Keys are addressed by a single byte.
const MAX_ACCOUNT_KEYS: usize = u8::MAX as usize + 1;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MessageError {
    #[error("message references {count} accounts, the maximum is 256")]
    TooManyAccounts { count: usize },

    #[error("instruction {index} carries {len} bytes of data, more than fits in a packet")]
    InstructionDataTooLarge { index: usize, len: usize },
}

/// Role counts for the key list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageHeader {
    pub num_required_signatures: u8,
    pub num_readonly_signed_accounts: u8,
    pub num_readonly_unsigned_accounts: u8,
}

/// An instruction with its addresses replaced by key indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub accounts: Vec<u8>,
    #[serde(with = "crate::hex_serde")]
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub header: MessageHeader,
    pub account_keys: Vec<Address>,
    pub recent_checkpoint: Checkpoint,
    pub instructions: Vec<CompiledInstruction>,
}

#[derive(Clone, Copy)]
struct KeyRole {
    address: Address,
    is_signer: bool,
    is_writable: bool,
}

impl Message {
    /// Compiles `instructions` for `fee_payer`, preserving instruction order.
    pub fn compile(
        instructions: &[Instruction],
        fee_payer: &Address,
        recent_checkpoint: Checkpoint,
    ) -> Result<Self, MessageError> {
        for (index, ix) in instructions.iter().enumerate() {
            if ix.data.len() > PACKET_DATA_SIZE {
                return Err(MessageError::InstructionDataTooLarge {
                    index,
                    len: ix.data.len(),
                });
            }
        }

        // First-seen order, roles merged across every mention of a key.
        let mut roles: Vec<KeyRole> = vec![KeyRole {
            address: *fee_payer,
            is_signer: true,
            is_writable: true,
        }];
        let mut note = |address: &Address, is_signer: bool, is_writable: bool| {
            match roles.iter_mut().find(|r| r.address == *address) {
                Some(role) => {
                    role.is_signer |= is_signer;
                    role.is_writable |= is_writable;
                }
                None => roles.push(KeyRole {
                    address: *address,
                    is_signer,
                    is_writable,
                }),
            }
        };
        for ix in instructions {
            for meta in &ix.accounts {
                note(&meta.address, meta.is_signer, meta.is_writable);
            }
            note(&ix.program_id, false, false);
        }

        if roles.len() > MAX_ACCOUNT_KEYS {
            return Err(MessageError::TooManyAccounts { count: roles.len() });
        }

        let group = |signer: bool, writable: bool| {
            roles
                .iter()
                .filter(move |r| r.is_signer == signer && r.is_writable == writable)
                .map(|r| r.address)
        };
        let writable_signers: Vec<Address> = group(true, true).collect();
        let readonly_signers: Vec<Address> = group(true, false).collect();
        let writable_unsigned: Vec<Address> = group(false, true).collect();
        let readonly_unsigned: Vec<Address> = group(false, false).collect();

        let header = MessageHeader {
            num_required_signatures: count_u8(writable_signers.len() + readonly_signers.len())?,
            num_readonly_signed_accounts: count_u8(readonly_signers.len())?,
            num_readonly_unsigned_accounts: count_u8(readonly_unsigned.len())?,
        };

        let account_keys: Vec<Address> = writable_signers
            .into_iter()
            .chain(readonly_signers)
            .chain(writable_unsigned)
            .chain(readonly_unsigned)
            .collect();

        let index_of = |address: &Address| -> Result<u8, MessageError> {
            account_keys
                .iter()
                .position(|k| k == address)
                .and_then(|p| u8::try_from(p).ok())
                .ok_or(MessageError::TooManyAccounts {
                    count: account_keys.len(),
                })
        };

        let compiled = instructions
            .iter()
            .map(|ix| -> Result<CompiledInstruction, MessageError> {
                Ok(CompiledInstruction {
                    program_id_index: index_of(&ix.program_id)?,
                    accounts: ix
                        .accounts
                        .iter()
                        .map(|meta| index_of(&meta.address))
                        .collect::<Result<_, _>>()?,
                    data: ix.data.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            header,
            account_keys,
            recent_checkpoint,
            instructions: compiled,
        })
    }

    pub fn fee_payer(&self) -> Option<&Address> {
        self.account_keys.first()
    }

    /// Keys that must sign, in signature order.
    pub fn signer_keys(&self) -> &[Address] {
        let n = usize::from(self.header.num_required_signatures).min(self.account_keys.len());
        &self.account_keys[..n]
    }

    pub fn is_signer(&self, index: usize) -> bool {
        index < usize::from(self.header.num_required_signatures)
    }

    pub fn is_writable(&self, index: usize) -> bool {
        let signed = usize::from(self.header.num_required_signatures);
        if index < signed {
            index < signed.saturating_sub(usize::from(self.header.num_readonly_signed_accounts))
        } else {
            let total = self.account_keys.len();
            index < total.saturating_sub(usize::from(self.header.num_readonly_unsigned_accounts))
        }
    }

    /// Canonical wire bytes; this is what signers sign.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(PACKET_DATA_SIZE);
        out.push(self.header.num_required_signatures);
        out.push(self.header.num_readonly_signed_accounts);
        out.push(self.header.num_readonly_unsigned_accounts);

        encode_length(&mut out, self.account_keys.len());
        for key in &self.account_keys {
            out.extend_from_slice(key.as_bytes());
        }
        out.extend_from_slice(self.recent_checkpoint.as_bytes());

        encode_length(&mut out, self.instructions.len());
        for ix in &self.instructions {
            out.push(ix.program_id_index);
            encode_length(&mut out, ix.accounts.len());
            out.extend_from_slice(&ix.accounts);
            encode_length(&mut out, ix.data.len());
            out.extend_from_slice(&ix.data);
        }
        out
    }
}

fn count_u8(n: usize) -> Result<u8, MessageError> {
    u8::try_from(n).map_err(|_| MessageError::TooManyAccounts { count: n })
}

/// Appends `len` as a compact-u16: seven bits per byte, low bits first,
/// high bit set on every byte but the last.
pub(crate) fn encode_length(out: &mut Vec<u8>, len: usize) {
    let mut rem = len;
    loop {
        let mut byte = (rem & 0x7f) as u8;
        rem >>= 7;
        if rem == 0 {
            out.push(byte);
            break;
        }
        byte |= 0x80;
        out.push(byte);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
