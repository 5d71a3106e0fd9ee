//! Cryptographic primitives for fair rounds.
//!
//! This module provides:
//! - SecretKey, the 256-bit key withheld until reveal
//! - KeyedHash, HmacDigest and Commitment for the commit-reveal scheme
//! - FairRandomGenerator for uniform committed secrets

mod commitment;
mod generator;
mod key;

pub use commitment::{verify_commitment, Commitment, HmacDigest, KeyedHash, UnknownHash};
pub use generator::FairRandomGenerator;
pub use key::{HexError, SecretKey, KEY_LEN};
