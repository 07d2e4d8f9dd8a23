//! On-ledger state: the vault account record and the rent schedule that
//! decides how many lamports an allocation must hold.

pub mod rent;
pub mod vault;

pub use rent::Rent;
pub use vault::{decode_price, DecodeError, VaultAccountRecord, VaultAuthority};
