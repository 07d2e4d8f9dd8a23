//! Value types shared by the assembler, signer, and ledger.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::crypto::hash::sha256;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid checkpoint: {0}")]
pub struct ParseCheckpointError(String);

/// A recent ledger checkpoint (a block hash).
///
/// Every transaction names one; the ledger rejects transactions whose
/// checkpoint has fallen out of its recent window, so a signed
/// transaction cannot be replayed indefinitely.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Checkpoint([u8; 32]);

impl Checkpoint {
    pub const fn new_from_array(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// The checkpoint that follows this one. Used by the in-memory ledger
    /// to advance its clock deterministically.
    pub fn next(&self) -> Self {
        Self(sha256(&self.0))
    }
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Checkpoint({})", self)
    }
}

impl FromStr for Checkpoint {
    type Err = ParseCheckpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| ParseCheckpointError(e.to_string()))?;
        let array: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| ParseCheckpointError(format!("expected 32 bytes, got {}", bytes.len())))?;
        Ok(Self(array))
    }
}

impl Serialize for Checkpoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Checkpoint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
