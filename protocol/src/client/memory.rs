//! # In-Memory Ledger
//!
//! A single-process stand-in for the real ledger, implementing both
//! [`Connection`] and [`LedgerReader`]. It runs the system program and the
//! vault program over a `HashMap` of accounts, with the same admission
//! rules a validator applies:
//!
//! 1. Every signature verifies over the serialized message.
//! 2. The checkpoint is one of the last 150 the ledger produced.
//! 3. The fee payer covers 5000 lamports per signature. The fee is kept
//!    even if execution fails.
//! 4. Instructions run in order against a scratch copy of the accounts; the
//!    copy replaces the live state only if every instruction succeeds.
//!
//! A failed execution returns [`ClientError::SubmissionFailed`] carrying the
//! program log lines, so callers see the same diagnostics a wallet would.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::{debug, info, warn};

use super::processor::{process_system, process_vault, InvokeContext, ProgramError};
use super::{ClientError, Connection, LedgerReader};
use crate::address::Address;
use crate::config::{
    ProgramConfig, LAMPORTS_PER_SIGNATURE, MAX_RECENT_CHECKPOINTS, SYSTEM_PROGRAM_ID,
};
use crate::crypto::keys::Signature;
use crate::instruction::AccountMeta;
use crate::state::Rent;
use crate::transaction::{Checkpoint, Message, SignedTransaction};

// ---------------------------------------------------------------------------
// Account
// ---------------------------------------------------------------------------

/// One ledger account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub lamports: u64,
    /// Program allowed to modify `data`.
    pub owner: Address,
    #[serde(with = "crate::hex_serde")]
    pub data: Vec<u8>,
}

impl Account {
    /// A plain wallet: system-owned, no data.
    pub fn with_lamports(lamports: u64) -> Self {
        Self {
            lamports,
            owner: SYSTEM_PROGRAM_ID,
            data: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// InMemoryLedger
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct LedgerState {
    accounts: HashMap<Address, Account>,
    checkpoints: VecDeque<Checkpoint>,
    processed: HashSet<Signature>,
    transaction_count: u64,
}

/// Thread safety: all state sits behind one `RwLock`; a submission holds
/// the write half for its whole execution, so transactions are serialized.
#[derive(Debug)]
pub struct InMemoryLedger {
    config: ProgramConfig,
    rent: Rent,
    state: RwLock<LedgerState>,
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new(ProgramConfig::default())
    }
}

impl InMemoryLedger {
    /// Creates an empty ledger with the vault program deployed at
    /// `config.program_id` and one initial checkpoint.
    pub fn new(config: ProgramConfig) -> Self {
        let mut state = LedgerState::default();
        state
            .checkpoints
            .push_back(Checkpoint::new_from_array(config.program_id.to_bytes()).next());
        Self {
            config,
            rent: Rent::default(),
            state: RwLock::new(state),
        }
    }

    pub fn config(&self) -> &ProgramConfig {
        &self.config
    }

    pub fn rent(&self) -> &Rent {
        &self.rent
    }

    /// Credits `lamports` to `address`, creating a wallet if needed.
    pub fn airdrop(&self, address: &Address, lamports: u64) {
        let mut state = self.state.write();
        let account = state
            .accounts
            .entry(*address)
            .or_insert_with(|| Account::with_lamports(0));
        account.lamports = account.lamports.saturating_add(lamports);
        debug!(%address, lamports, balance = account.lamports, "airdrop");
    }

    /// Produces a new checkpoint, expiring the oldest once the window is
    /// full.
    pub fn advance_checkpoint(&self) -> Checkpoint {
        let mut state = self.state.write();
        let next = state
            .checkpoints
            .back()
            .map(Checkpoint::next)
            .unwrap_or_default();
        state.checkpoints.push_back(next);
        while state.checkpoints.len() > MAX_RECENT_CHECKPOINTS {
            state.checkpoints.pop_front();
        }
        next
    }

    pub fn account(&self, address: &Address) -> Option<Account> {
        self.state.read().accounts.get(address).cloned()
    }

    /// Overwrites an account directly, bypassing every program.
    pub fn set_account(&self, address: &Address, account: Account) {
        self.state.write().accounts.insert(*address, account);
    }

    pub fn balance(&self, address: &Address) -> u64 {
        self.state
            .read()
            .accounts
            .get(address)
            .map_or(0, |a| a.lamports)
    }

    /// Number of transactions admitted, successful or not.
    pub fn transaction_count(&self) -> u64 {
        self.state.read().transaction_count
    }

    fn execute(
        &self,
        accounts: &mut HashMap<Address, Account>,
        message: &Message,
        logs: &mut Vec<String>,
    ) -> Result<(), (usize, ProgramError)> {
        for (index, ix) in message.instructions.iter().enumerate() {
            let program_id = message
                .account_keys
                .get(usize::from(ix.program_id_index))
                .copied()
                .ok_or((index, ProgramError::NotEnoughAccountKeys))?;

            let metas = ix
                .accounts
                .iter()
                .map(|&i| {
                    let i = usize::from(i);
                    message
                        .account_keys
                        .get(i)
                        .map(|address| AccountMeta {
                            address: *address,
                            is_signer: message.is_signer(i),
                            is_writable: message.is_writable(i),
                        })
                        .ok_or((index, ProgramError::NotEnoughAccountKeys))
                })
                .collect::<Result<Vec<_>, _>>()?;

            logs.push(format!("Program {program_id} invoke [1]"));
            let mut ctx = InvokeContext {
                accounts: &mut *accounts,
                config: &self.config,
                rent: &self.rent,
                logs: &mut *logs,
            };
            let result = if program_id == SYSTEM_PROGRAM_ID {
                process_system(&mut ctx, &metas, &ix.data)
            } else if program_id == self.config.program_id {
                process_vault(&mut ctx, &metas, &ix.data)
            } else {
                Err(ProgramError::UnsupportedProgram(program_id))
            };

            match result {
                Ok(()) => logs.push(format!("Program {program_id} success")),
                Err(err) => {
                    logs.push(format!("Program {program_id} failed: {err}"));
                    return Err((index, err));
                }
            }
        }
        Ok(())
    }
}

fn rejected(message: impl Into<String>) -> ClientError {
    ClientError::SubmissionFailed {
        message: message.into(),
        logs: Vec::new(),
    }
}

impl Connection for InMemoryLedger {
    fn latest_checkpoint(&self) -> Result<Checkpoint, ClientError> {
        self.state
            .read()
            .checkpoints
            .back()
            .copied()
            .ok_or_else(|| ClientError::Transport("ledger has no checkpoints".into()))
    }

    fn send_transaction(&self, tx: &SignedTransaction) -> Result<Signature, ClientError> {
        let size = tx
            .serialize()
            .map_err(|e| rejected(e.to_string()))?
            .len();
        if !tx.verify() {
            return Err(rejected("Transaction signature verification failure"));
        }
        let signature = tx
            .signature()
            .copied()
            .ok_or_else(|| rejected("Transaction has no signatures"))?;
        let fee_payer = tx
            .message
            .fee_payer()
            .copied()
            .ok_or_else(|| rejected("Transaction has no fee payer"))?;

        let mut state = self.state.write();

        if !state.checkpoints.contains(&tx.message.recent_checkpoint) {
            return Err(rejected("Blockhash not found"));
        }
        if state.processed.contains(&signature) {
            return Err(rejected("This transaction has already been processed"));
        }

        let fee = LAMPORTS_PER_SIGNATURE.saturating_mul(tx.signatures.len() as u64);
        match state.accounts.get_mut(&fee_payer) {
            Some(payer) if payer.lamports >= fee => payer.lamports -= fee,
            _ => {
                return Err(rejected(
                    "Attempt to debit an account but found no record of a prior credit.",
                ))
            }
        }
        state.processed.insert(signature);
        state.transaction_count += 1;

        let mut scratch = state.accounts.clone();
        let mut logs = Vec::new();
        match self.execute(&mut scratch, &tx.message, &mut logs) {
            Ok(()) => {
                state.accounts = scratch;
                info!(
                    %signature,
                    size,
                    instructions = tx.message.instructions.len(),
                    fee,
                    "transaction executed"
                );
                Ok(signature)
            }
            Err((index, err)) => {
                warn!(
                    %signature,
                    instruction = index,
                    error = %err,
                    log_lines = logs.len(),
                    "transaction failed, state rolled back"
                );
                Err(ClientError::SubmissionFailed {
                    message: format!("Error processing Instruction {index}: {err}"),
                    logs,
                })
            }
        }
    }
}

impl LedgerReader for InMemoryLedger {
    fn get_account_data(&self, address: &Address) -> Result<Option<Vec<u8>>, ClientError> {
        Ok(self
            .state
            .read()
            .accounts
            .get(address)
            .map(|a| a.data.clone()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FANSPHERE_PROGRAM_ID, LAMPORTS_PER_SOL};
    use crate::crypto::keys::Keypair;
    use crate::instruction::system::create_account;
    use crate::instruction::vault::create_vault;
    use crate::transaction::{assemble, sign_transaction};

    fn funded(ledger: &InMemoryLedger) -> Keypair {
        let kp = Keypair::generate();
        ledger.airdrop(&kp.address(), LAMPORTS_PER_SOL);
        kp
    }

    fn create_vault_tx(ledger: &InMemoryLedger, maker: &Keypair, seed: u64) -> SignedTransaction {
        let ix = create_vault(
            ledger.config(),
            &maker.address(),
            &Address::new_from_array([8u8; 32]),
            seed,
            50,
            &[1u8; 32],
        )
        .unwrap();
        let tx = assemble(
            vec![ix],
            &maker.address(),
            ledger.latest_checkpoint().unwrap(),
        )
        .unwrap();
        sign_transaction(&tx, &[maker]).unwrap()
    }

    #[test]
    fn airdrop_accumulates() {
        let ledger = InMemoryLedger::default();
        let a = Address::new_from_array([1u8; 32]);
        ledger.airdrop(&a, 10);
        ledger.airdrop(&a, 5);
        assert_eq!(ledger.balance(&a), 15);
        assert_eq!(ledger.account(&a).unwrap().owner, SYSTEM_PROGRAM_ID);
    }

    #[test]
    fn successful_transaction_charges_fee_and_rent() {
        let ledger = InMemoryLedger::default();
        let maker = funded(&ledger);
        let signed = create_vault_tx(&ledger, &maker, 888);

        let sig = ledger.send_transaction(&signed).unwrap();
        assert_eq!(Some(&sig), signed.signature());
        assert_eq!(
            ledger.balance(&maker.address()),
            LAMPORTS_PER_SOL - 5_000 - 1_684_320
        );
        assert_eq!(ledger.transaction_count(), 1);
    }

    #[test]
    fn replay_is_rejected() {
        let ledger = InMemoryLedger::default();
        let maker = funded(&ledger);
        let signed = create_vault_tx(&ledger, &maker, 888);
        ledger.send_transaction(&signed).unwrap();
        let err = ledger.send_transaction(&signed).unwrap_err();
        assert!(err.to_string().contains("already been processed"));
    }

    #[test]
    fn stale_checkpoint_is_rejected() {
        let ledger = InMemoryLedger::default();
        let maker = funded(&ledger);
        let signed = create_vault_tx(&ledger, &maker, 888);
        for _ in 0..MAX_RECENT_CHECKPOINTS {
            ledger.advance_checkpoint();
        }
        match ledger.send_transaction(&signed).unwrap_err() {
            ClientError::SubmissionFailed { message, .. } => {
                assert_eq!(message, "Blockhash not found")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn recent_checkpoint_is_still_accepted() {
        let ledger = InMemoryLedger::default();
        let maker = funded(&ledger);
        let signed = create_vault_tx(&ledger, &maker, 888);
        for _ in 0..MAX_RECENT_CHECKPOINTS - 1 {
            ledger.advance_checkpoint();
        }
        assert!(ledger.send_transaction(&signed).is_ok());
    }

    #[test]
    fn bad_signature_is_rejected() {
        let ledger = InMemoryLedger::default();
        let maker = funded(&ledger);
        let mut signed = create_vault_tx(&ledger, &maker, 888);
        signed.signatures[0] = Signature::default();
        let err = ledger.send_transaction(&signed).unwrap_err();
        assert!(err.to_string().contains("signature verification"));
    }

    #[test]
    fn unfunded_payer_is_rejected() {
        let ledger = InMemoryLedger::default();
        let maker = Keypair::generate();
        let signed = create_vault_tx(&ledger, &maker, 888);
        assert!(ledger.send_transaction(&signed).is_err());
        assert_eq!(ledger.transaction_count(), 0);
    }

    #[test]
    fn failed_instruction_rolls_back_earlier_ones() {
        let ledger = InMemoryLedger::default();
        let maker = funded(&ledger);
        let target = Keypair::generate();

        // The account creation succeeds, then the foreign program fails.
        let create = create_account(
            &maker.address(),
            &target.address(),
            1_000_000,
            0,
            &SYSTEM_PROGRAM_ID,
        );
        let unknown = crate::instruction::Instruction::new(
            Address::new_from_array([42u8; 32]),
            vec![],
            vec![],
        );
        let tx = assemble(
            vec![create, unknown],
            &maker.address(),
            ledger.latest_checkpoint().unwrap(),
        )
        .unwrap();
        let signed = sign_transaction(&tx, &[&maker, &target]).unwrap();

        match ledger.send_transaction(&signed).unwrap_err() {
            ClientError::SubmissionFailed { message, logs } => {
                assert!(message.starts_with("Error processing Instruction 1"));
                assert_eq!(logs[0], "Program 11111111111111111111111111111111 invoke [1]");
                assert_eq!(logs[1], "Program 11111111111111111111111111111111 success");
                assert!(logs[3].contains("failed: program"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(ledger.account(&target.address()).is_none());
        // Two signatures, fee kept.
        assert_eq!(ledger.balance(&maker.address()), LAMPORTS_PER_SOL - 10_000);
    }

    #[test]
    fn reader_returns_raw_bytes() {
        let ledger = InMemoryLedger::default();
        let maker = funded(&ledger);
        let signed = create_vault_tx(&ledger, &maker, 888);
        ledger.send_transaction(&signed).unwrap();

        let vault = crate::pda::derive_vault_address(&maker.address(), 888, &FANSPHERE_PROGRAM_ID)
            .unwrap();
        let data = ledger.get_account_data(&vault.address).unwrap().unwrap();
        assert_eq!(data.len(), 114);
        assert!(ledger
            .get_account_data(&Address::new_from_array([99u8; 32]))
            .unwrap()
            .is_none());
    }
}
