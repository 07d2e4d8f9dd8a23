//! # Cryptographic Primitives
//!
//! Thin, typed wrappers around audited implementations:
//!
//! - **SHA-256** (`sha2`) for program-derived address preimages.
//! - **Ed25519** (`ed25519-dalek`) for transaction signatures.
//! - **Curve25519** (`curve25519-dalek`) point decompression, used by
//!   [`crate::address::Address::is_on_curve`].

pub mod hash;
pub mod keys;

pub use hash::{hashv, sha256};
pub use keys::{KeyError, Keypair, Signature};
