//! Transaction assembly via the builder pattern.
//!
//! The assembler bundles encoded instructions with a fee payer and a recent
//! checkpoint and compiles them into a [`Message`]. It does not fetch the
//! checkpoint, sign, or submit: the checkpoint comes from the caller, and
//! signing happens in [`super::signing`]. That keeps assembly a pure
//! function of its inputs, testable without keys or a ledger.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::message::{Message, MessageError};
use super::types::Checkpoint;
use crate::address::Address;
use crate::instruction::Instruction;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssembleError {
    /// A transaction must carry at least one instruction.
    #[error("transaction has no instructions")]
    NoInstructions,

    /// No fee payer was set on the builder.
    #[error("transaction has no fee payer")]
    MissingFeePayer,

    /// No recent checkpoint was set on the builder.
    #[error("transaction has no recent checkpoint")]
    MissingCheckpoint,

    #[error(transparent)]
    Message(#[from] MessageError),
}

// ---------------------------------------------------------------------------
// SubmittableTransaction
// ---------------------------------------------------------------------------

/// An unsigned, compiled transaction, ready for the signing step.
///
/// Instruction order is exactly the caller's order. Two transactions with
/// the same instructions in a different order compare unequal and compile
/// to different message bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittableTransaction {
    instructions: Vec<Instruction>,
    fee_payer: Address,
    message: Message,
}

impl SubmittableTransaction {
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn fee_payer(&self) -> &Address {
        &self.fee_payer
    }

    pub fn recent_checkpoint(&self) -> &Checkpoint {
        &self.message.recent_checkpoint
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    /// Keys whose signatures the ledger will require, fee payer first.
    pub fn required_signers(&self) -> &[Address] {
        self.message.signer_keys()
    }

    /// The bytes each signer signs.
    pub fn message_bytes(&self) -> Vec<u8> {
        self.message.serialize()
    }
}

/// Bundles `instructions`, in order, into a transaction paid for by
/// `fee_payer` and anchored at `recent_checkpoint`.
pub fn assemble(
    instructions: Vec<Instruction>,
    fee_payer: &Address,
    recent_checkpoint: Checkpoint,
) -> Result<SubmittableTransaction, AssembleError> {
    if instructions.is_empty() {
        return Err(AssembleError::NoInstructions);
    }
    let message = Message::compile(&instructions, fee_payer, recent_checkpoint)?;
    Ok(SubmittableTransaction {
        instructions,
        fee_payer: *fee_payer,
        message,
    })
}

// ---------------------------------------------------------------------------
// TransactionAssembler
// ---------------------------------------------------------------------------

/// Fluent builder over [`assemble`].
///
/// ```
/// use fansphere_protocol::address::Address;
/// use fansphere_protocol::instruction::{AccountMeta, Instruction};
/// use fansphere_protocol::transaction::{Checkpoint, TransactionAssembler};
///
/// let payer = Address::new_from_array([1u8; 32]);
/// let ix = Instruction::new(
///     Address::new_from_array([9u8; 32]),
///     vec![AccountMeta::new(payer, true)],
///     vec![0],
/// );
/// let tx = TransactionAssembler::new()
///     .fee_payer(payer)
///     .recent_checkpoint(Checkpoint::default())
///     .instruction(ix)
///     .build()
///     .unwrap();
/// assert_eq!(tx.required_signers(), &[payer]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TransactionAssembler {
    instructions: Vec<Instruction>,
    fee_payer: Option<Address>,
    recent_checkpoint: Option<Checkpoint>,
}

impl TransactionAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one instruction after those already added.
    pub fn instruction(mut self, instruction: Instruction) -> Self {
        self.instructions.push(instruction);
        self
    }

    /// Appends several instructions, keeping their order.
    pub fn instructions(mut self, instructions: impl IntoIterator<Item = Instruction>) -> Self {
        self.instructions.extend(instructions);
        self
    }

    pub fn fee_payer(mut self, fee_payer: Address) -> Self {
        self.fee_payer = Some(fee_payer);
        self
    }

    pub fn recent_checkpoint(mut self, checkpoint: Checkpoint) -> Self {
        self.recent_checkpoint = Some(checkpoint);
        self
    }

    /// Consumes the builder and compiles the transaction.
    pub fn build(self) -> Result<SubmittableTransaction, AssembleError> {
        let fee_payer = self.fee_payer.ok_or(AssembleError::MissingFeePayer)?;
        let checkpoint = self
            .recent_checkpoint
            .ok_or(AssembleError::MissingCheckpoint)?;
        assemble(self.instructions, &fee_payer, checkpoint)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
