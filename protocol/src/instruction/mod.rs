//! # Instructions
//!
//! An [`Instruction`] is one typed operation aimed at one program: the
//! program's address, an ordered list of account references, and an opaque
//! payload. The receiving program learns each account's role from its
//! position, so the order built here is part of the wire contract.
//!
//! ```text
//! mod.rs    — AccountMeta, Instruction, and the codec error types
//! vault.rs  — FanSphere vault operations (create, init, update)
//! system.rs — system-program CreateAccount
//! ```

pub mod system;
pub mod vault;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::address::Address;
use crate::pda::PdaError;

pub use vault::{ContentHash, VaultInstruction};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors raised while building an instruction from caller input.
///
/// Every check runs before any payload byte is written, so a failed encode
/// never leaves a partial buffer behind.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    /// The content hash was not exactly 32 bytes.
    #[error("invalid input: content hash must be 32 bytes, got {len}")]
    InvalidContentHash { len: usize },

    /// The vault address could not be derived for the given inputs.
    #[error("vault address derivation failed: {0}")]
    Derivation(#[from] PdaError),
}

/// Errors raised while parsing an instruction payload back into a typed
/// operation. Used by program-side processing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InstructionError {
    #[error("instruction data is empty")]
    Empty,

    #[error("unknown instruction discriminator {0}")]
    UnknownDiscriminator(u32),

    #[error("instruction {discriminator} expects {expected} bytes, got {actual}")]
    InvalidLength {
        discriminator: u32,
        expected: usize,
        actual: usize,
    },
}

// ---------------------------------------------------------------------------
// AccountMeta
// ---------------------------------------------------------------------------

/// One entry in an instruction's account list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountMeta {
    pub address: Address,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl AccountMeta {
    /// A writable account reference.
    pub fn new(address: Address, is_signer: bool) -> Self {
        Self {
            address,
            is_signer,
            is_writable: true,
        }
    }

    /// A read-only account reference.
    pub fn new_readonly(address: Address, is_signer: bool) -> Self {
        Self {
            address,
            is_signer,
            is_writable: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Instruction
// ---------------------------------------------------------------------------

/// An encoded instruction, ready to be handed to the transaction assembler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    /// Program that will execute the instruction.
    pub program_id: Address,
    /// Accounts in the order the program expects them.
    pub accounts: Vec<AccountMeta>,
    /// Opaque payload; the program's own layout.
    #[serde(with = "crate::hex_serde")]
    pub data: Vec<u8>,
}

impl Instruction {
    pub fn new(program_id: Address, accounts: Vec<AccountMeta>, data: Vec<u8>) -> Self {
        Self {
            program_id,
            accounts,
            data,
        }
    }

    /// Addresses this instruction needs signatures from, in account order.
    pub fn signers(&self) -> impl Iterator<Item = &Address> {
        self.accounts
            .iter()
            .filter(|meta| meta.is_signer)
            .map(|meta| &meta.address)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
