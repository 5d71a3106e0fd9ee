//! Secret key used to bind a committed value.

use crate::protocol::ProtocolError;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Length in bytes of a commitment key.
pub const KEY_LEN: usize = 32;

/// 256-bit HMAC key, withheld until the round is revealed
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct SecretKey([u8; KEY_LEN]);

impl SecretKey {
    /// Draw a fresh key from a cryptographically secure source.
    ///
    /// A failing source is reported, never papered over with a weaker one.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self, ProtocolError> {
        let mut bytes = [0u8; KEY_LEN];
        rng.try_fill_bytes(&mut bytes)
            .map_err(|e| ProtocolError::RandomSourceUnavailable(e.to_string()))?;
        Ok(Self(bytes))
    }

    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the underlying bytes
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Full lowercase hex encoding (64 characters)
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey({}..)", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Error parsing a hex-encoded 32-byte value
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HexError {
    #[error("invalid hex: {0}")]
    Invalid(#[from] hex::FromHexError),

    #[error("expected {expected} bytes, got {actual}")]
    Length { expected: usize, actual: usize },
}

pub(crate) fn decode_32(s: &str) -> Result<[u8; 32], HexError> {
    let bytes = hex::decode(s.trim())?;
    let actual = bytes.len();
    bytes.try_into().map_err(|_| HexError::Length {
        expected: 32,
        actual,
    })
}

impl FromStr for SecretKey {
    type Err = HexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_32(s).map(Self)
    }
}

impl From<SecretKey> for String {
    fn from(key: SecretKey) -> Self {
        key.to_hex()
    }
}

impl TryFrom<String> for SecretKey {
    type Error = HexError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}
