//! Byte layout shared by the instruction encoder and the account decoder.
//!
//! The create/init payload and the leading bytes of a vault account use the
//! same offsets, so a value written by one side is always read back from the
//! same place by the other.
//!
//! ```text
//! offset  size  field
//! 0       1     discriminator (instruction tag or account tag)
//! 1       8     seed          u64 LE
//! 9       8     price         u64 LE
//! 17      32    content hash
//! --- account only ---
//! 49      32    owner
//! 81      1     bump
//! 82      32    mint
//! 114     ..    reserved, zeroed
//! ```

use std::ops::Range;

pub const DISCRIMINATOR_OFFSET: usize = 0;
pub const SEED_OFFSET: usize = 1;
pub const PRICE_OFFSET: usize = 9;
pub const CONTENT_HASH_OFFSET: usize = 17;
pub const OWNER_OFFSET: usize = 49;
pub const BUMP_OFFSET: usize = 81;
pub const MINT_OFFSET: usize = 82;
pub const RESERVED_OFFSET: usize = 114;

pub const CONTENT_HASH_LEN: usize = 32;

/// Size of the create-vault and init-vault payloads.
pub const CREATE_VAULT_DATA_LEN: usize = CONTENT_HASH_OFFSET + CONTENT_HASH_LEN;

/// Shortest account buffer that still holds every meaningful field.
pub const VAULT_RECORD_MIN_LEN: usize = CREATE_VAULT_DATA_LEN;

/// Shortest account buffer that also carries the owner and bump.
pub const VAULT_AUTHORITY_LEN: usize = MINT_OFFSET;

/// Length of the complete record, mint included.
pub const VAULT_RECORD_LEN: usize = RESERVED_OFFSET;

pub const SEED_RANGE: Range<usize> = SEED_OFFSET..SEED_OFFSET + 8;
pub const PRICE_RANGE: Range<usize> = PRICE_OFFSET..PRICE_OFFSET + 8;
pub const CONTENT_HASH_RANGE: Range<usize> =
    CONTENT_HASH_OFFSET..CONTENT_HASH_OFFSET + CONTENT_HASH_LEN;
pub const OWNER_RANGE: Range<usize> = OWNER_OFFSET..OWNER_OFFSET + 32;
pub const MINT_RANGE: Range<usize> = MINT_OFFSET..MINT_OFFSET + 32;

/// Reads a little-endian `u64` at `range`. Callers check the buffer length
/// first; a short buffer yields `None` rather than a guessed value.
pub(crate) fn read_u64(data: &[u8], range: Range<usize>) -> Option<u64> {
    let bytes: [u8; 8] = data.get(range)?.try_into().ok()?;
    Some(u64::from_le_bytes(bytes))
}
