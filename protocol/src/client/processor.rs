//! Program execution for the in-memory ledger.
//!
//! Two programs are simulated: the system program (account creation only)
//! and the vault program. Each processor receives the resolved account
//! metas in instruction order and mutates a scratch copy of the ledger's
//! accounts; the caller commits the copy only if every instruction in the
//! transaction succeeds.

use std::collections::HashMap;
use thiserror::Error;

use super::memory::Account;
use crate::address::Address;
use crate::config::{ProgramConfig, SYSTEM_PROGRAM_ID};
use crate::instruction::system::SystemInstruction;
use crate::instruction::{AccountMeta, ContentHash, InstructionError, VaultInstruction};
use crate::pda::derive_vault_address;
use crate::state::{DecodeError, Rent, VaultAccountRecord};

/// Errors a simulated program can return. Rendered into the
/// `Program <id> failed: ...` log line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProgramError {
    #[error("missing required signature for instruction")]
    MissingRequiredSignature,

    #[error("insufficient account keys for instruction")]
    NotEnoughAccountKeys,

    #[error("instruction changed a read-only account")]
    ReadonlyAccount,

    #[error("invalid instruction data: {0}")]
    InvalidInstructionData(#[from] InstructionError),

    #[error("invalid account data for instruction: {0}")]
    InvalidAccountData(#[from] DecodeError),

    #[error("requested account space {0} is not addressable")]
    InvalidAccountSpace(u64),

    #[error("provided seeds do not result in a valid address")]
    InvalidSeeds,

    #[error("account {0} already in use")]
    AccountAlreadyInUse(Address),

    #[error("account already initialized")]
    AccountAlreadyInitialized,

    #[error("instruction requires an initialized account")]
    UninitializedAccount,

    #[error("insufficient lamports {available}, need {required}")]
    InsufficientFunds { available: u64, required: u64 },

    #[error("incorrect program id for instruction")]
    IncorrectProgramId,

    #[error("account is not owned by the executing program")]
    InvalidAccountOwner,

    #[error("signer is not the vault owner")]
    IllegalOwner,

    #[error("account {0} not found")]
    AccountNotFound(Address),

    #[error("program {0} is not deployed")]
    UnsupportedProgram(Address),
}

/// Everything an executing instruction may touch.
pub(crate) struct InvokeContext<'a> {
    pub accounts: &'a mut HashMap<Address, Account>,
    pub config: &'a ProgramConfig,
    pub rent: &'a Rent,
    pub logs: &'a mut Vec<String>,
}

impl InvokeContext<'_> {
    fn log(&mut self, message: impl AsRef<str>) {
        self.logs.push(format!("Program log: {}", message.as_ref()));
    }

    fn account_mut(&mut self, address: &Address) -> Result<&mut Account, ProgramError> {
        self.accounts
            .get_mut(address)
            .ok_or(ProgramError::AccountNotFound(*address))
    }

    fn debit(&mut self, address: &Address, lamports: u64) -> Result<(), ProgramError> {
        let account = self.account_mut(address)?;
        account.lamports =
            account
                .lamports
                .checked_sub(lamports)
                .ok_or(ProgramError::InsufficientFunds {
                    available: account.lamports,
                    required: lamports,
                })?;
        Ok(())
    }

    fn is_free(&self, address: &Address) -> bool {
        self.accounts
            .get(address)
            .map_or(true, |a| a.lamports == 0 && a.data.is_empty())
    }
}

fn next_account<'a>(
    iter: &mut impl Iterator<Item = &'a AccountMeta>,
) -> Result<&'a AccountMeta, ProgramError> {
    iter.next().ok_or(ProgramError::NotEnoughAccountKeys)
}

fn require_signer(meta: &AccountMeta) -> Result<(), ProgramError> {
    if meta.is_signer {
        Ok(())
    } else {
        Err(ProgramError::MissingRequiredSignature)
    }
}

fn require_writable(meta: &AccountMeta) -> Result<(), ProgramError> {
    if meta.is_writable {
        Ok(())
    } else {
        Err(ProgramError::ReadonlyAccount)
    }
}

// ---------------------------------------------------------------------------
// System program
// ---------------------------------------------------------------------------

pub(crate) fn process_system(
    ctx: &mut InvokeContext<'_>,
    accounts: &[AccountMeta],
    data: &[u8],
) -> Result<(), ProgramError> {
    match SystemInstruction::unpack(data)? {
        SystemInstruction::CreateAccount {
            lamports,
            space,
            owner,
        } => {
            let iter = &mut accounts.iter();
            let from = next_account(iter)?;
            let to = next_account(iter)?;
            require_signer(from)?;
            require_signer(to)?;
            require_writable(from)?;
            require_writable(to)?;

            let space =
                usize::try_from(space).map_err(|_| ProgramError::InvalidAccountSpace(space))?;
            create_account(ctx, &from.address, &to.address, lamports, space, owner)
        }
    }
}

fn create_account(
    ctx: &mut InvokeContext<'_>,
    from: &Address,
    to: &Address,
    lamports: u64,
    space: usize,
    owner: Address,
) -> Result<(), ProgramError> {
    if !ctx.is_free(to) {
        ctx.log(format!("Create Account: account {to} already in use"));
        return Err(ProgramError::AccountAlreadyInUse(*to));
    }
    if ctx.account_mut(from)?.owner != SYSTEM_PROGRAM_ID {
        return Err(ProgramError::InvalidAccountOwner);
    }
    ctx.debit(from, lamports)?;
    ctx.accounts.insert(
        *to,
        Account {
            lamports,
            owner,
            data: vec![0u8; space],
        },
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Vault program
// ---------------------------------------------------------------------------

pub(crate) fn process_vault(
    ctx: &mut InvokeContext<'_>,
    accounts: &[AccountMeta],
    data: &[u8],
) -> Result<(), ProgramError> {
    let instruction = VaultInstruction::unpack(data)?;
    ctx.log(format!("Instruction: {}", instruction.name()));

    match instruction {
        VaultInstruction::CreateVault {
            seed,
            price,
            content_hash,
        } => create_vault(ctx, accounts, seed, price, content_hash),
        VaultInstruction::InitVault {
            seed,
            price,
            content_hash,
        } => init_vault(ctx, accounts, seed, price, content_hash),
        VaultInstruction::UpdatePrice { price } => {
            update_record(ctx, accounts, |record| record.price = price)
        }
        VaultInstruction::UpdateContentHash { content_hash } => {
            update_record(ctx, accounts, |record| record.content_hash = content_hash)
        }
    }
}

fn create_vault(
    ctx: &mut InvokeContext<'_>,
    accounts: &[AccountMeta],
    seed: u64,
    price: u64,
    content_hash: ContentHash,
) -> Result<(), ProgramError> {
    let iter = &mut accounts.iter();
    let maker = next_account(iter)?;
    let vault = next_account(iter)?;
    let mint = next_account(iter)?;
    let system_program = next_account(iter)?;

    require_signer(maker)?;
    require_writable(maker)?;
    require_writable(vault)?;
    if system_program.address != SYSTEM_PROGRAM_ID {
        return Err(ProgramError::IncorrectProgramId);
    }

    let program_id = ctx.config.program_id;
    let expected = derive_vault_address(&maker.address, seed, &program_id)
        .map_err(|_| ProgramError::InvalidSeeds)?;
    if vault.address != expected.address {
        ctx.log(format!(
            "vault {} does not match derived address {}",
            vault.address, expected.address
        ));
        return Err(ProgramError::InvalidSeeds);
    }

    let space = ctx.config.vault_space;
    let lamports = ctx.rent.minimum_balance(space);
    create_account(
        ctx,
        &maker.address,
        &vault.address,
        lamports,
        space,
        program_id,
    )?;

    let record = VaultAccountRecord::new(
        seed,
        price,
        content_hash,
        maker.address,
        expected.bump,
        mint.address,
    );
    record.pack_into(&mut ctx.account_mut(&vault.address)?.data)?;
    ctx.log(format!("vault {} created, bump {}", vault.address, expected.bump));
    Ok(())
}

fn init_vault(
    ctx: &mut InvokeContext<'_>,
    accounts: &[AccountMeta],
    seed: u64,
    price: u64,
    content_hash: ContentHash,
) -> Result<(), ProgramError> {
    let iter = &mut accounts.iter();
    let maker = next_account(iter)?;
    let vault = next_account(iter)?;
    let mint = next_account(iter)?;

    // Only the holder of the vault key may initialize it.
    require_signer(maker)?;
    require_signer(vault)?;
    require_writable(vault)?;

    let program_id = ctx.config.program_id;
    let account = ctx.account_mut(&vault.address)?;
    if account.owner != program_id {
        return Err(ProgramError::InvalidAccountOwner);
    }
    if VaultAccountRecord::decode(&account.data)?.is_initialized() {
        return Err(ProgramError::AccountAlreadyInitialized);
    }

    let record =
        VaultAccountRecord::new(seed, price, content_hash, maker.address, 0, mint.address);
    record.pack_into(&mut account.data)?;
    Ok(())
}

fn update_record(
    ctx: &mut InvokeContext<'_>,
    accounts: &[AccountMeta],
    apply: impl FnOnce(&mut VaultAccountRecord),
) -> Result<(), ProgramError> {
    let iter = &mut accounts.iter();
    let maker = next_account(iter)?;
    let vault = next_account(iter)?;

    require_signer(maker)?;
    require_writable(vault)?;

    let program_id = ctx.config.program_id;
    let account = ctx.account_mut(&vault.address)?;
    if account.owner != program_id {
        return Err(ProgramError::InvalidAccountOwner);
    }

    let mut record = VaultAccountRecord::decode(&account.data)?;
    if !record.is_initialized() {
        return Err(ProgramError::UninitializedAccount);
    }
    if record.owner() != Some(&maker.address) {
        return Err(ProgramError::IllegalOwner);
    }

    apply(&mut record);
    record.pack_into(&mut account.data)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
