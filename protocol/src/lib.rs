// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # FanSphere Vault Protocol
//!
//! Client-side core of the FanSphere content-vault program: a maker locks a
//! piece of content behind a price, and the vault that records it lives at
//! an address anyone can recompute from the maker's key and a seed.
//!
//! The crate does three things, and keeps them pure:
//!
//! - **pda**: derive a vault's program-owned address from `(maker, seed)`.
//! - **instruction** / **state**: encode program operations into their
//!   fixed byte layouts, and decode vault account bytes back into a record.
//! - **transaction**: bundle instructions with a fee payer and a recent
//!   checkpoint, compile them into signable bytes, sign.
//!
//! Everything that talks to a ledger sits behind the traits in **client**,
//! which also ships an in-memory ledger for tests and demos.
//!
//! ## Modules
//!
//! - **address**: 32-byte account identity, base58 text form.
//! - **config**: protocol constants and the injected [`config::ProgramConfig`].
//! - **crypto**: SHA-256 helpers and Ed25519 keypairs/signatures.
//! - **layout**: byte offsets shared by encoder and decoder.
//! - **pda**: program-derived address search.
//! - **instruction**: vault and system program instruction codecs.
//! - **state**: vault account record and rent.
//! - **transaction**: message compilation, assembly, signing.
//! - **client**: ledger boundary traits, `VaultClient`, `InMemoryLedger`.

pub mod address;
pub mod client;
pub mod config;
pub mod crypto;
mod hex_serde;
pub mod instruction;
pub mod layout;
pub mod pda;
pub mod state;
pub mod transaction;
