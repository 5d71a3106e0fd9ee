//! Keyed-hash commitments for the commit-reveal scheme.
//!
//! digest = HMAC(key, decimal(value))

use super::key::{decode_32, HexError, SecretKey};
use crate::protocol::ProtocolError;
use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use sha3::Sha3_256;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

type HmacSha3_256 = Hmac<Sha3_256>;
type HmacSha256 = Hmac<Sha256>;

/// Keyed hash used to commit to a secret value.
///
/// The algorithm is fixed for a whole game and disclosed to the other party
/// up front, so they can recompute every digest themselves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyedHash {
    #[default]
    #[serde(rename = "hmac-sha3-256")]
    HmacSha3_256,
    #[serde(rename = "hmac-sha256")]
    HmacSha256,
}

impl KeyedHash {
    /// Compute the digest of `message` under `key`
    pub fn digest(&self, key: &SecretKey, message: &[u8]) -> HmacDigest {
        let bytes: [u8; 32] = match self {
            KeyedHash::HmacSha3_256 => {
                let mut mac = HmacSha3_256::new_from_slice(key.as_bytes())
                    .expect("HMAC accepts keys of any length");
                mac.update(message);
                mac.finalize().into_bytes().into()
            }
            KeyedHash::HmacSha256 => {
                let mut mac = HmacSha256::new_from_slice(key.as_bytes())
                    .expect("HMAC accepts keys of any length");
                mac.update(message);
                mac.finalize().into_bytes().into()
            }
        };
        HmacDigest(bytes)
    }

    /// Digest of a committed value: the message is the value's decimal form
    pub fn digest_value(&self, key: &SecretKey, value: u32) -> HmacDigest {
        self.digest(key, value.to_string().as_bytes())
    }

    /// Stable name, as shown to the other party
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyedHash::HmacSha3_256 => "hmac-sha3-256",
            KeyedHash::HmacSha256 => "hmac-sha256",
        }
    }
}

impl fmt::Display for KeyedHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown keyed hash name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown hash algorithm '{0}' (expected hmac-sha3-256 or hmac-sha256)")]
pub struct UnknownHash(String);

impl FromStr for KeyedHash {
    type Err = UnknownHash;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hmac-sha3-256" | "sha3-256" | "sha3" => Ok(KeyedHash::HmacSha3_256),
            "hmac-sha256" | "sha256" | "sha2" => Ok(KeyedHash::HmacSha256),
            other => Err(UnknownHash(other.to_string())),
        }
    }
}

/// Published half of a commitment: 32 bytes, shown as 64 hex characters
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct HmacDigest([u8; 32]);

impl HmacDigest {
    /// Verify that `key` and `value` produce this digest under `algorithm`
    pub fn verify(&self, algorithm: KeyedHash, key: &SecretKey, value: u32) -> bool {
        *self == algorithm.digest_value(key, value)
    }
}

impl fmt::Debug for HmacDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HmacDigest({})", hex::encode(&self.0[..8]))
    }
}

impl fmt::Display for HmacDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for HmacDigest {
    type Err = HexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_32(s).map(Self)
    }
}

impl From<HmacDigest> for String {
    fn from(digest: HmacDigest) -> Self {
        hex::encode(digest.0)
    }
}

impl TryFrom<String> for HmacDigest {
    type Error = HexError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// A committed secret value.
///
/// Only [`Commitment::digest`] is public. The key and value come out through
/// [`Commitment::reveal`], which consumes the commitment, so a commitment can
/// be opened at most once.
pub struct Commitment {
    key: SecretKey,
    value: u32,
    range: u32,
    algorithm: KeyedHash,
    digest: HmacDigest,
}

impl Commitment {
    pub(crate) fn new(key: SecretKey, value: u32, range: u32, algorithm: KeyedHash) -> Self {
        let digest = algorithm.digest_value(&key, value);
        Self {
            key,
            value,
            range,
            algorithm,
            digest,
        }
    }

    /// Commit to a specific value with a fresh OS-random key.
    ///
    /// For reproducing a known round; games draw the value through
    /// [`FairRandomGenerator`](super::FairRandomGenerator).
    pub fn with_value(range: u32, value: u32, algorithm: KeyedHash) -> Result<Self, ProtocolError> {
        if range == 0 {
            return Err(ProtocolError::InvalidRange(range));
        }
        if value >= range {
            return Err(ProtocolError::misuse(format!(
                "committed value {} is outside 0..{}",
                value, range
            )));
        }
        let key = SecretKey::generate(&mut OsRng)?;
        Ok(Self::new(key, value, range, algorithm))
    }

    /// The published digest
    pub fn digest(&self) -> HmacDigest {
        self.digest
    }

    pub fn range(&self) -> u32 {
        self.range
    }

    pub fn algorithm(&self) -> KeyedHash {
        self.algorithm
    }

    /// Disclose the key and value
    pub fn reveal(self) -> (SecretKey, u32) {
        (self.key, self.value)
    }
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Commitment")
            .field("range", &self.range)
            .field("algorithm", &self.algorithm)
            .field("digest", &self.digest)
            .finish_non_exhaustive()
    }
}

/// Check a published digest against a revealed key and value, all as text
pub fn verify_commitment(
    algorithm: KeyedHash,
    digest_hex: &str,
    key_hex: &str,
    value: u32,
) -> Result<bool, HexError> {
    let digest: HmacDigest = digest_hex.parse()?;
    let key: SecretKey = key_hex.parse()?;
    Ok(digest.verify(algorithm, &key, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(byte: u8) -> SecretKey {
        SecretKey::from_bytes([byte; 32])
    }

    #[test]
    fn test_commitment_verification() {
        let commitment = Commitment::new(key(7), 3, 6, KeyedHash::HmacSha3_256);
        let digest = commitment.digest();
        let (key, value) = commitment.reveal();

        assert!(digest.verify(KeyedHash::HmacSha3_256, &key, value));
    }

    #[test]
    fn test_digest_is_deterministic() {
        let a = KeyedHash::HmacSha3_256.digest_value(&key(1), 4);
        let b = KeyedHash::HmacSha3_256.digest_value(&key(1), 4);
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_values_different_digests() {
        let a = KeyedHash::HmacSha3_256.digest_value(&key(1), 0);
        let b = KeyedHash::HmacSha3_256.digest_value(&key(1), 1);
        assert_ne!(a, b);
    }

    #[test]
    fn test_different_keys_different_digests() {
        let a = KeyedHash::HmacSha3_256.digest_value(&key(1), 0);
        let b = KeyedHash::HmacSha3_256.digest_value(&key(2), 0);
        assert_ne!(a, b);
    }

    #[test]
    fn test_algorithms_disagree() {
        let a = KeyedHash::HmacSha3_256.digest_value(&key(1), 0);
        let b = KeyedHash::HmacSha256.digest_value(&key(1), 0);
        assert_ne!(a, b);
        assert!(!a.verify(KeyedHash::HmacSha256, &key(1), 0));
    }

    #[test]
    fn test_message_is_decimal_string() {
        let by_value = KeyedHash::HmacSha256.digest_value(&key(9), 42);
        let by_bytes = KeyedHash::HmacSha256.digest(&key(9), b"42");
        assert_eq!(by_value, by_bytes);
    }

    #[test]
    fn test_known_answers() {
        let sha256 = KeyedHash::HmacSha256.digest(&key(0), b"0");
        assert_eq!(
            String::from(sha256),
            "9979e4c3ee19965f9ecc6dca6b3954b10c18c1bfa105c512cc3ae58be85db71c"
        );

        let sha3 = KeyedHash::HmacSha3_256.digest(&key(0), b"0");
        assert_eq!(
            String::from(sha3),
            "da4801ef75e4405c4ac2ce6d3b5f94fd88a7c1e3c9958079aa456a44f60d95e4"
        );
    }

    #[test]
    fn test_wrong_value_fails_verification() {
        let commitment = Commitment::new(key(3), 2, 6, KeyedHash::HmacSha3_256);
        let digest = commitment.digest();
        let (key, _) = commitment.reveal();

        assert!(!digest.verify(KeyedHash::HmacSha3_256, &key, 5));
    }

    #[test]
    fn test_verify_commitment_from_hex() {
        let commitment = Commitment::new(key(5), 1, 2, KeyedHash::HmacSha3_256);
        let digest_hex = commitment.digest().to_string();
        let (key, value) = commitment.reveal();

        assert_eq!(digest_hex.len(), 64);
        assert!(verify_commitment(KeyedHash::HmacSha3_256, &digest_hex, &key.to_hex(), value).unwrap());
        assert!(!verify_commitment(KeyedHash::HmacSha3_256, &digest_hex, &key.to_hex(), 0).unwrap());
        assert!(verify_commitment(KeyedHash::HmacSha3_256, "zz", &key.to_hex(), value).is_err());
    }

    #[test]
    fn test_with_value_checks_bounds() {
        assert_eq!(
            Commitment::with_value(0, 0, KeyedHash::default()).unwrap_err(),
            ProtocolError::InvalidRange(0)
        );
        // a forced secret outside the range is a caller defect, not a bad contribution
        let err = Commitment::with_value(6, 6, KeyedHash::default()).unwrap_err();
        assert!(matches!(err, ProtocolError::ProtocolMisuse(_)));
        assert!(!err.is_recoverable());
        let commitment = Commitment::with_value(6, 3, KeyedHash::default()).unwrap();
        assert_eq!(commitment.reveal().1, 3);
    }

    #[test]
    fn test_keyed_hash_names_round_trip() {
        for algorithm in [KeyedHash::HmacSha3_256, KeyedHash::HmacSha256] {
            assert_eq!(algorithm.as_str().parse::<KeyedHash>().unwrap(), algorithm);
        }
        assert!("md5".parse::<KeyedHash>().is_err());
    }

    #[test]
    fn test_debug_hides_secret() {
        let commitment = Commitment::new(key(0xee), 4, 6, KeyedHash::HmacSha3_256);
        let debug = format!("{:?}", commitment);
        assert!(!debug.contains(&"ee".repeat(32)));
        assert!(!debug.contains("value"));
    }
}
