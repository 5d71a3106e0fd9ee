//! Fair random generator: uniform secret values bound by a keyed hash.

use super::commitment::{Commitment, KeyedHash};
use super::key::SecretKey;
use crate::protocol::ProtocolError;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

/// Draws committed secrets from a cryptographically secure source.
///
/// The source defaults to the operating system's CSPRNG. Tests may plug in a
/// seeded [`rand::rngs::StdRng`], which is also a `CryptoRng`.
#[derive(Debug)]
pub struct FairRandomGenerator<R = OsRng> {
    rng: R,
    algorithm: KeyedHash,
}

impl FairRandomGenerator<OsRng> {
    /// Generator over the OS random source
    pub fn new(algorithm: KeyedHash) -> Self {
        Self::with_rng(OsRng, algorithm)
    }
}

impl Default for FairRandomGenerator<OsRng> {
    fn default() -> Self {
        Self::new(KeyedHash::default())
    }
}

impl<R: RngCore + CryptoRng> FairRandomGenerator<R> {
    pub fn with_rng(rng: R, algorithm: KeyedHash) -> Self {
        Self { rng, algorithm }
    }

    /// The disclosed keyed hash every commitment from this generator uses
    pub fn algorithm(&self) -> KeyedHash {
        self.algorithm
    }

    /// Commit to a fresh secret value uniform over `0..range`
    pub fn commit(&mut self, range: u32) -> Result<Commitment, ProtocolError> {
        if range == 0 {
            return Err(ProtocolError::InvalidRange(range));
        }
        let key = SecretKey::generate(&mut self.rng)?;
        let value = uniform_below(&mut self.rng, range)?;
        Ok(Commitment::new(key, value, range, self.algorithm))
    }

    /// Open a commitment previously produced by [`commit`](Self::commit)
    pub fn reveal(commitment: Commitment) -> (SecretKey, u32) {
        commitment.reveal()
    }

    /// Uniform pick in `0..range` that is not committed to, e.g. the
    /// opponent's own die choice
    pub fn pick(&mut self, range: u32) -> Result<u32, ProtocolError> {
        if range == 0 {
            return Err(ProtocolError::InvalidRange(range));
        }
        uniform_below(&mut self.rng, range)
    }
}

/// Exactly uniform integer in `0..range` by rejection sampling.
///
/// Draws 32-bit words and discards those at or above the largest multiple of
/// `range` that fits in 2^32, so every residue has the same number of
/// preimages.
pub(crate) fn uniform_below<R: RngCore + CryptoRng>(
    rng: &mut R,
    range: u32,
) -> Result<u32, ProtocolError> {
    debug_assert!(range > 0);
    const SPACE: u64 = 1 << 32;
    let range = u64::from(range);
    let zone = SPACE - SPACE % range;

    loop {
        let mut word = [0u8; 4];
        rng.try_fill_bytes(&mut word)
            .map_err(|e| ProtocolError::RandomSourceUnavailable(e.to_string()))?;
        let x = u64::from(u32::from_le_bytes(word));
        if x < zone {
            // x % range < range <= u32::MAX
            return Ok((x % range) as u32);
        }
    }
}
