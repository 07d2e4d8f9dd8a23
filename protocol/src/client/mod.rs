//! # Ledger Client
//!
//! The boundary between the pure codec and a running ledger. Two traits
//! describe what the codec needs from the outside world:
//!
//! - [`Connection`]: fetch a recent checkpoint, submit a signed transaction.
//! - [`LedgerReader`]: fetch an account's raw bytes.
//!
//! [`VaultClient`] strings the pieces together for the common flows
//! (derive → encode → assemble → sign → submit, and fetch → decode). It
//! holds no state besides its configuration and a borrowed connection, and
//! it never retries: every error reaches the caller as-is.
//!
//! ```text
//! mod.rs       — traits, ClientError, VaultClient
//! memory.rs    — InMemoryLedger, a Connection + LedgerReader for tests and demos
//! processor.rs — the system and vault programs the in-memory ledger runs
//! ```

pub mod memory;
pub mod processor;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::address::Address;
use crate::config::ProgramConfig;
use crate::crypto::keys::{Keypair, Signature};
use crate::instruction::vault as vault_ix;
use crate::instruction::{system, EncodeError, Instruction};
use crate::pda::{derive_vault_address, PdaError, VaultAddress};
use crate::state::{DecodeError, Rent, VaultAccountRecord};
use crate::transaction::{
    assemble, sign_transaction, AssembleError, Checkpoint, SignedTransaction, SigningError,
};

pub use memory::{Account, InMemoryLedger};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ClientError {
    /// The ledger refused or failed the transaction. `logs` holds the
    /// program log lines exactly as the ledger returned them.
    #[error("transaction submission failed: {message}")]
    SubmissionFailed { message: String, logs: Vec<String> },

    /// The connection itself failed (network, RPC, serialization).
    #[error("transport error: {0}")]
    Transport(String),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Derivation(#[from] PdaError),

    #[error(transparent)]
    Assemble(#[from] AssembleError),

    #[error(transparent)]
    Signing(#[from] SigningError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl ClientError {
    /// Program log lines, if the ledger returned any.
    pub fn logs(&self) -> &[String] {
        match self {
            Self::SubmissionFailed { logs, .. } => logs,
            _ => &[],
        }
    }
}

// ---------------------------------------------------------------------------
// Boundary traits
// ---------------------------------------------------------------------------

/// Transaction submission.
pub trait Connection {
    /// A checkpoint recent enough for a new transaction to reference.
    fn latest_checkpoint(&self) -> Result<Checkpoint, ClientError>;

    /// Submits `tx` and returns its identifying signature once executed.
    fn send_transaction(&self, tx: &SignedTransaction) -> Result<Signature, ClientError>;
}

/// Account reads.
pub trait LedgerReader {
    /// Raw account bytes, or `None` if no account exists at `address`.
    fn get_account_data(&self, address: &Address) -> Result<Option<Vec<u8>>, ClientError>;
}

// ---------------------------------------------------------------------------
// VaultClient
// ---------------------------------------------------------------------------

/// Result of a successful vault creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CreatedVault {
    pub signature: Signature,
    pub vault: VaultAddress,
}

pub struct VaultClient<'a, C: ?Sized> {
    config: ProgramConfig,
    connection: &'a C,
}

impl<'a, C> VaultClient<'a, C>
where
    C: Connection + LedgerReader + ?Sized,
{
    pub fn new(config: ProgramConfig, connection: &'a C) -> Self {
        Self { config, connection }
    }

    pub fn config(&self) -> &ProgramConfig {
        &self.config
    }

    pub fn vault_address(&self, maker: &Address, seed: u64) -> Result<VaultAddress, ClientError> {
        Ok(derive_vault_address(maker, seed, &self.config.program_id)?)
    }

    /// Creates a vault at the address derived from `(maker, seed)` in a
    /// single CreateVault instruction. The program allocates the account.
    pub fn create_vault(
        &self,
        maker: &Keypair,
        mint: &Address,
        seed: u64,
        price: u64,
        content_hash: &[u8],
    ) -> Result<CreatedVault, ClientError> {
        let maker_address = maker.address();
        let ix = vault_ix::create_vault(
            &self.config,
            &maker_address,
            mint,
            seed,
            price,
            content_hash,
        )?;
        let vault = self.vault_address(&maker_address, seed)?;
        let signature = self.submit(vec![ix], &maker_address, &[maker])?;

        info!(
            maker = %maker_address,
            vault = %vault.address,
            bump = vault.bump,
            seed,
            price,
            %signature,
            "vault created"
        );
        Ok(CreatedVault { signature, vault })
    }

    /// Creates a vault at an explicit keypair-owned address: a system
    /// CreateAccount funded for rent exemption, followed by InitVault, in
    /// one transaction.
    pub fn create_and_init_vault(
        &self,
        maker: &Keypair,
        vault_account: &Keypair,
        mint: &Address,
        seed: u64,
        price: u64,
        content_hash: &[u8],
    ) -> Result<Signature, ClientError> {
        let maker_address = maker.address();
        let vault_address = vault_account.address();
        let space = self.config.vault_space;

        let init = vault_ix::init_vault(
            &self.config,
            &maker_address,
            &vault_address,
            mint,
            seed,
            price,
            content_hash,
        )?;
        let create = system::create_account(
            &maker_address,
            &vault_address,
            Rent::default().minimum_balance(space),
            space as u64,
            &self.config.program_id,
        );

        let signature = self.submit(
            vec![create, init],
            &maker_address,
            &[maker, vault_account],
        )?;
        info!(maker = %maker_address, vault = %vault_address, %signature, "vault initialized");
        Ok(signature)
    }

    pub fn update_price(
        &self,
        maker: &Keypair,
        vault: &Address,
        price: u64,
    ) -> Result<Signature, ClientError> {
        let maker_address = maker.address();
        let ix = vault_ix::update_price(&self.config, &maker_address, vault, price);
        let signature = self.submit(vec![ix], &maker_address, &[maker])?;
        info!(%vault, price, %signature, "vault price updated");
        Ok(signature)
    }

    pub fn update_content_hash(
        &self,
        maker: &Keypair,
        vault: &Address,
        content_hash: &[u8],
    ) -> Result<Signature, ClientError> {
        let maker_address = maker.address();
        let ix = vault_ix::update_content_hash(&self.config, &maker_address, vault, content_hash)?;
        let signature = self.submit(vec![ix], &maker_address, &[maker])?;
        info!(%vault, %signature, "vault content hash updated");
        Ok(signature)
    }

    /// Fetches and decodes a vault. `Ok(None)` means no account exists;
    /// an account that exists but cannot be decoded is an error.
    pub fn fetch_vault(&self, vault: &Address) -> Result<Option<VaultAccountRecord>, ClientError> {
        let Some(data) = self.connection.get_account_data(vault)? else {
            debug!(%vault, "vault account not found");
            return Ok(None);
        };
        let record = VaultAccountRecord::decode(&data)?;
        debug!(%vault, len = data.len(), price = record.price, "vault fetched");
        Ok(Some(record))
    }

    /// The vault's price, or `None` if the account does not exist.
    pub fn fetch_price(&self, vault: &Address) -> Result<Option<u64>, ClientError> {
        Ok(self.fetch_vault(vault)?.map(|record| record.price))
    }

    fn submit(
        &self,
        instructions: Vec<Instruction>,
        fee_payer: &Address,
        signers: &[&Keypair],
    ) -> Result<Signature, ClientError> {
        let checkpoint = self.connection.latest_checkpoint()?;
        let tx = assemble(instructions, fee_payer, checkpoint)?;
        let signed = sign_transaction(&tx, signers)?;
        debug!(
            %fee_payer,
            %checkpoint,
            instructions = tx.instructions().len(),
            signatures = signed.signatures.len(),
            "submitting transaction"
        );
        self.connection.send_transaction(&signed)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
