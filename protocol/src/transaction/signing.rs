//! Transaction signing with Ed25519 keypairs.
//!
//! Signing is a separate step from assembly because the keys may not be
//! available where the transaction is built (browser wallet, hardware
//! signer, remote service). Every required signer signs the same bytes:
//! the serialized [`super::Message`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::assembler::SubmittableTransaction;
use super::message::{encode_length, Message};
use crate::address::Address;
use crate::config::PACKET_DATA_SIZE;
use crate::crypto::keys::{Keypair, Signature};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SigningError {
    /// A key the message requires did not sign.
    #[error("missing signature for {0}")]
    MissingSigner(Address),

    /// A keypair was supplied that the message does not require.
    #[error("keypair {0} is not a required signer")]
    UnexpectedSigner(Address),

    /// The serialized transaction would not fit in one packet.
    #[error("transaction is {size} bytes, the limit is {max}")]
    TransactionTooLarge { size: usize, max: usize },
}

/// A transaction carrying one signature per required signer, in key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub signatures: Vec<Signature>,
    pub message: Message,
}

impl SignedTransaction {
    /// The first signature, which identifies the transaction on the ledger.
    pub fn signature(&self) -> Option<&Signature> {
        self.signatures.first()
    }

    /// Checks every signature against its key over the message bytes.
    pub fn verify(&self) -> bool {
        let keys = self.message.signer_keys();
        if keys.len() != self.signatures.len() {
            return false;
        }
        let bytes = self.message.serialize();
        keys.iter()
            .zip(&self.signatures)
            .all(|(key, sig)| sig.verify(key, &bytes))
    }

    /// Wire bytes: short-vec signature count, signatures, message.
    pub fn serialize(&self) -> Result<Vec<u8>, SigningError> {
        let message = self.message.serialize();
        let mut out = Vec::with_capacity(1 + self.signatures.len() * 64 + message.len());
        encode_length(&mut out, self.signatures.len());
        for sig in &self.signatures {
            out.extend_from_slice(sig.as_bytes());
        }
        out.extend_from_slice(&message);

        if out.len() > PACKET_DATA_SIZE {
            return Err(SigningError::TransactionTooLarge {
                size: out.len(),
                max: PACKET_DATA_SIZE,
            });
        }
        Ok(out)
    }
}

/// Signs `tx` with `signers`, which may be given in any order.
///
/// Every required key must be present and every keypair must be required;
/// the transaction itself is left untouched.
pub fn sign_transaction(
    tx: &SubmittableTransaction,
    signers: &[&Keypair],
) -> Result<SignedTransaction, SigningError> {
    let required = tx.required_signers();

    if let Some(extra) = signers
        .iter()
        .map(|kp| kp.address())
        .find(|address| !required.contains(address))
    {
        return Err(SigningError::UnexpectedSigner(extra));
    }

    let bytes = tx.message_bytes();
    let signatures = required
        .iter()
        .map(|key| {
            signers
                .iter()
                .find(|kp| kp.address() == *key)
                .map(|kp| kp.sign(&bytes))
                .ok_or(SigningError::MissingSigner(*key))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SignedTransaction {
        signatures,
        message: tx.message().clone(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::system::create_account;
    use crate::instruction::{AccountMeta, Instruction};
    use crate::transaction::assembler::assemble;
    use crate::transaction::types::Checkpoint;

    fn two_signer_tx(payer: &Keypair, new_account: &Keypair) -> SubmittableTransaction {
        let ix = create_account(
            &payer.address(),
            &new_account.address(),
            1_000,
            0,
            &Address::new_from_array([9u8; 32]),
        );
        assemble(vec![ix], &payer.address(), Checkpoint::default()).unwrap()
    }

    #[test]
    fn sign_and_verify() {
        let payer = Keypair::generate();
        let new_account = Keypair::generate();
        let tx = two_signer_tx(&payer, &new_account);

        // Order of the supplied keypairs does not matter.
        let signed = sign_transaction(&tx, &[&new_account, &payer]).unwrap();
        assert_eq!(signed.signatures.len(), 2);
        assert!(signed.verify());
        assert!(signed.signatures[0].verify(&payer.address(), &tx.message_bytes()));
        assert_eq!(signed.signature(), Some(&signed.signatures[0]));
    }

    #[test]
    fn missing_signer() {
        let payer = Keypair::generate();
        let new_account = Keypair::generate();
        let tx = two_signer_tx(&payer, &new_account);
        assert_eq!(
            sign_transaction(&tx, &[&payer]).unwrap_err(),
            SigningError::MissingSigner(new_account.address())
        );
    }

    #[test]
    fn unexpected_signer() {
        let payer = Keypair::generate();
        let new_account = Keypair::generate();
        let stranger = Keypair::generate();
        let tx = two_signer_tx(&payer, &new_account);
        assert_eq!(
            sign_transaction(&tx, &[&payer, &new_account, &stranger]).unwrap_err(),
            SigningError::UnexpectedSigner(stranger.address())
        );
    }

    #[test]
    fn tampered_message_fails_verification() {
        let payer = Keypair::generate();
        let new_account = Keypair::generate();
        let tx = two_signer_tx(&payer, &new_account);
        let mut signed = sign_transaction(&tx, &[&payer, &new_account]).unwrap();
        signed.message.recent_checkpoint = Checkpoint::new_from_array([1u8; 32]);
        assert!(!signed.verify());
    }

    #[test]
    fn serialized_size() {
        let payer = Keypair::generate();
        let new_account = Keypair::generate();
        let tx = two_signer_tx(&payer, &new_account);
        let signed = sign_transaction(&tx, &[&payer, &new_account]).unwrap();
        let bytes = signed.serialize().unwrap();
        assert_eq!(bytes[0], 2);
        assert_eq!(bytes.len(), 1 + 2 * 64 + tx.message_bytes().len());
    }

    #[test]
    fn oversized_transaction_is_rejected() {
        let payer = Keypair::generate();
        let ix = Instruction::new(
            Address::new_from_array([9u8; 32]),
            vec![AccountMeta::new(payer.address(), true)],
            vec![0u8; 1_200],
        );
        let tx = assemble(vec![ix], &payer.address(), Checkpoint::default()).unwrap();
        let signed = sign_transaction(&tx, &[&payer]).unwrap();
        assert!(matches!(
            signed.serialize(),
            Err(SigningError::TransactionTooLarge { max: 1232, .. })
        ));
    }
}
