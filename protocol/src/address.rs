//! # Ledger Addresses
//!
//! An [`Address`] is the opaque 32-byte identity of a ledger account: a
//! maker's wallet, a mint, the vault program, or a vault itself. Humans see
//! it as base58 text; the wire and the hash preimages see the raw bytes.
//!
//! Wallet addresses are compressed Ed25519 points. Program-derived addresses
//! are deliberately *not* points on the curve, so no private key can ever
//! sign for them. [`Address::is_on_curve`] is the test that separates the two.

use curve25519_dalek::edwards::CompressedEdwardsY;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Length of an address in bytes.
pub const ADDRESS_BYTES: usize = 32;

/// Longest base58 rendering of 32 bytes; longer input is rejected before
/// decoding.
const MAX_BASE58_LEN: usize = 44;

/// Errors raised while parsing an address from text or bytes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid base58 address: {0}")]
    InvalidBase58(String),

    #[error("address must be 32 bytes, got {0}")]
    WrongLength(usize),
}

/// A 32-byte ledger account identifier.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address([u8; ADDRESS_BYTES]);

impl Address {
    /// Wraps raw bytes. `const` so program ids can live in `config`.
    pub const fn new_from_array(bytes: [u8; ADDRESS_BYTES]) -> Self {
        Self(bytes)
    }

    /// Builds an address from a slice, which must be exactly 32 bytes long.
    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, AddressError> {
        let array: [u8; ADDRESS_BYTES] = bytes
            .try_into()
            .map_err(|_| AddressError::WrongLength(bytes.len()))?;
        Ok(Self(array))
    }

    /// Raw bytes, borrowed.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_BYTES] {
        &self.0
    }

    /// Raw bytes, copied.
    pub const fn to_bytes(self) -> [u8; ADDRESS_BYTES] {
        self.0
    }

    /// Returns `true` if the bytes decompress to a valid Ed25519 point.
    ///
    /// Program-derived addresses must return `false` here.
    pub fn is_on_curve(&self) -> bool {
        bytes_are_curve_point(&self.0)
    }
}

/// Off-curve test shared by [`Address::is_on_curve`] and the PDA search,
/// which checks candidate hashes before wrapping them.
pub(crate) fn bytes_are_curve_point(bytes: &[u8; ADDRESS_BYTES]) -> bool {
    CompressedEdwardsY(*bytes).decompress().is_some()
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; ADDRESS_BYTES]> for Address {
    fn from(bytes: [u8; ADDRESS_BYTES]) -> Self {
        Self(bytes)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() > MAX_BASE58_LEN {
            return Err(AddressError::InvalidBase58(format!(
                "{} characters exceeds the {}-character maximum",
                s.len(),
                MAX_BASE58_LEN
            )));
        }
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| AddressError::InvalidBase58(e.to_string()))?;
        Self::try_from_slice(&bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
