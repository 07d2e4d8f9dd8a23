//! # Hashing Utilities
//!
//! SHA-256 is the only hash the ledger uses for address derivation, so it
//! is the only one we expose. `hashv` hashes a list of slices without first
//! concatenating them, which is how derivation preimages are fed in.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of the input data.
///
/// # Example
///
/// ```
/// use fansphere_protocol::crypto::sha256;
///
/// let hash = sha256(b"FanSphere");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> [u8; 32] {
    hashv(&[data])
}

/// SHA-256 over the concatenation of `parts`, without allocating the
/// concatenation.
pub fn hashv(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
