//! # Transaction Module
//!
//! Bundles encoded instructions into a transaction the ledger accepts.
//!
//! ## Architecture
//!
//! ```text
//! types.rs     — Checkpoint (recent block hash) value type
//! message.rs   — Message compilation: key ordering, header, wire bytes
//! assembler.rs — assemble() and the fluent TransactionAssembler
//! signing.rs   — sign_transaction and the SignedTransaction wire form
//! ```
//!
//! ## Lifecycle
//!
//! 1. **Assemble**: [`assemble`] or [`TransactionAssembler`] with a fee
//!    payer and a checkpoint the caller fetched.
//! 2. **Sign**: [`sign_transaction`] with every required keypair.
//! 3. **Submit**: hand the [`SignedTransaction`] to a
//!    [`Connection`](crate::client::Connection).
//!
//! Instruction order is preserved end to end. A create-account followed by
//! an init is a different transaction from the reverse.

pub mod assembler;
pub mod message;
pub mod signing;
pub mod types;

pub use assembler::{assemble, AssembleError, SubmittableTransaction, TransactionAssembler};
pub use message::{CompiledInstruction, Message, MessageError, MessageHeader};
pub use signing::{sign_transaction, SignedTransaction, SigningError};
pub use types::Checkpoint;
