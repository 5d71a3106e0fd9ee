//! One commit-reveal exchange.
//!
//! A round moves `AwaitingContribution -> Resolved`:
//!
//! 1. [`FairnessRound::start`] commits to a secret value and publishes only
//!    the digest, handing back a [`PendingRound`].
//! 2. The other party picks a contribution after seeing the digest.
//! 3. [`PendingRound::resolve`] consumes the pending round, combines
//!    `(secret + contribution) mod range` and reveals the key.
//!
//! The secret cannot be read from a `PendingRound`, and a `RoundResult`
//! cannot exist without consuming one, so the reveal can never precede the
//! contribution.

use crate::crypto::{Commitment, FairRandomGenerator, HmacDigest, KeyedHash, SecretKey};
use crate::protocol::{ProtocolError, RoundId};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Entry point for commit-reveal rounds
pub struct FairnessRound;

impl FairnessRound {
    /// Commit to a fresh secret in `0..range` and publish its digest
    pub fn start<R: RngCore + CryptoRng>(
        generator: &mut FairRandomGenerator<R>,
        range: u32,
    ) -> Result<(HmacDigest, PendingRound), ProtocolError> {
        let commitment = generator.commit(range)?;
        let round = PendingRound::from_commitment(commitment);
        Ok((round.digest(), round))
    }
}

/// A round whose digest is published and whose contribution is awaited
pub struct PendingRound {
    id: RoundId,
    commitment: Commitment,
}

impl PendingRound {
    /// Wrap an existing commitment, e.g. one made with
    /// [`Commitment::with_value`]
    pub fn from_commitment(commitment: Commitment) -> Self {
        let id = RoundId::new();
        debug!(
            round = %id,
            range = commitment.range(),
            digest = %commitment.digest(),
            "round committed"
        );
        Self { id, commitment }
    }

    pub fn id(&self) -> RoundId {
        self.id
    }

    pub fn range(&self) -> u32 {
        self.commitment.range()
    }

    pub fn algorithm(&self) -> KeyedHash {
        self.commitment.algorithm()
    }

    /// The published digest
    pub fn digest(&self) -> HmacDigest {
        self.commitment.digest()
    }

    /// Check a contribution without consuming the round
    pub fn check(&self, contribution: u32) -> Result<(), ProtocolError> {
        let range = self.range();
        if contribution >= range {
            return Err(ProtocolError::ContributionOutOfRange {
                value: contribution,
                range,
            });
        }
        Ok(())
    }

    /// Combine the secret with `contribution` and reveal.
    ///
    /// An out-of-range contribution hands the round back untouched inside
    /// [`Rejected`], so the caller can ask again against the same digest.
    pub fn resolve(self, contribution: u32) -> Result<RoundResult, Rejected> {
        if let Err(error) = self.check(contribution) {
            return Err(Rejected { error, round: self });
        }
        Ok(self.open(contribution))
    }

    /// Resolve a guessing round: the guess is fixed before the reveal and
    /// compared with the secret itself.
    pub fn resolve_guess(self, guess: u32) -> Result<GuessResult, Rejected> {
        if let Err(error) = self.check(guess) {
            return Err(Rejected { error, round: self });
        }
        Ok(GuessResult {
            round: self.open(0),
            guess,
        })
    }

    fn open(self, contribution: u32) -> RoundResult {
        let range = self.commitment.range();
        let algorithm = self.commitment.algorithm();
        let digest = self.commitment.digest();
        let (key, secret_value) = self.commitment.reveal();
        let combined_value = combine(secret_value, contribution, range);

        debug!(
            round = %self.id,
            secret_value,
            contribution,
            combined_value,
            "round resolved"
        );

        RoundResult {
            round_id: self.id,
            range,
            algorithm,
            digest,
            key,
            secret_value,
            contribution,
            combined_value,
        }
    }
}

impl fmt::Debug for PendingRound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingRound")
            .field("id", &self.id)
            .field("commitment", &self.commitment)
            .finish()
    }
}

/// `(secret + contribution) mod range` without overflow
pub fn combine(secret_value: u32, contribution: u32, range: u32) -> u32 {
    let sum = u64::from(secret_value) + u64::from(contribution);
    // result < range, which fits in u32
    (sum % u64::from(range)) as u32
}

/// A contribution refused by [`PendingRound::resolve`], carrying the round
/// back so it stays live
pub struct Rejected {
    pub error: ProtocolError,
    pub round: PendingRound,
}

impl Rejected {
    pub fn into_parts(self) -> (ProtocolError, PendingRound) {
        (self.error, self.round)
    }
}

impl fmt::Debug for Rejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rejected")
            .field("error", &self.error)
            .field("round", &self.round.id)
            .finish()
    }
}

impl fmt::Display for Rejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.error.fmt(f)
    }
}

impl std::error::Error for Rejected {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// A resolved round with everything needed to check it independently
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    pub round_id: RoundId,
    pub range: u32,
    pub algorithm: KeyedHash,
    /// Digest published before the contribution was chosen
    pub digest: HmacDigest,
    /// Revealed key, hex on the wire
    pub key: SecretKey,
    pub secret_value: u32,
    pub contribution: u32,
    pub combined_value: u32,
}

impl RoundResult {
    /// Revealed key as 64 hex characters
    pub fn revealed_key_hex(&self) -> String {
        self.key.to_hex()
    }

    /// Recompute the digest from the revealed pair and redo the arithmetic
    pub fn verify(&self) -> bool {
        self.range > 0
            && self.secret_value < self.range
            && self.contribution < self.range
            && self.digest.verify(self.algorithm, &self.key, self.secret_value)
            && self.combined_value == combine(self.secret_value, self.contribution, self.range)
    }
}

/// A resolved guessing round
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessResult {
    pub round: RoundResult,
    pub guess: u32,
}

impl GuessResult {
    pub fn is_correct(&self) -> bool {
        self.round.combined_value == self.guess
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pending(range: u32, value: u32) -> PendingRound {
        PendingRound::from_commitment(
            Commitment::with_value(range, value, KeyedHash::HmacSha3_256).unwrap(),
        )
    }

    #[test]
    fn test_start_publishes_digest_of_pending_round() {
        let mut generator =
            FairRandomGenerator::with_rng(StdRng::seed_from_u64(1), KeyedHash::default());
        let (digest, round) = FairnessRound::start(&mut generator, 6).unwrap();
        assert_eq!(digest, round.digest());
        assert_eq!(round.range(), 6);
        assert_eq!(digest.to_string().len(), 64);
    }

    #[test]
    fn test_start_rejects_zero_range() {
        let mut generator = FairRandomGenerator::default();
        assert_eq!(
            FairnessRound::start(&mut generator, 0).unwrap_err(),
            ProtocolError::InvalidRange(0)
        );
    }

    #[test]
    fn test_resolve_combines_mod_range() {
        let result = pending(6, 3).resolve(2).unwrap();
        assert_eq!(result.combined_value, 5);
        assert_eq!(result.secret_value, 3);
        assert_eq!(result.contribution, 2);

        let wrapped = pending(6, 5).resolve(4).unwrap();
        assert_eq!(wrapped.combined_value, 3);
    }

    #[test]
    fn test_out_of_range_contribution_keeps_round_live() {
        let round = pending(6, 3);
        let id = round.id();
        let digest = round.digest();

        let rejected = round.resolve(6).unwrap_err();
        assert_eq!(
            rejected.error,
            ProtocolError::ContributionOutOfRange { value: 6, range: 6 }
        );

        let (_, round) = rejected.into_parts();
        assert_eq!(round.id(), id);
        let result = round.resolve(0).unwrap();
        assert_eq!(result.digest, digest);
        assert_eq!(result.combined_value, 3);
    }

    #[test]
    fn test_result_verifies_against_published_digest() {
        let round = pending(6, 4);
        let published = round.digest();
        let result = round.resolve(1).unwrap();

        assert_eq!(result.digest, published);
        assert!(result.verify());
        assert_eq!(result.revealed_key_hex().len(), 64);
    }

    #[test]
    fn test_tampered_result_fails_verification() {
        let mut result = pending(6, 4).resolve(1).unwrap();
        result.secret_value = 2;
        result.combined_value = 3;
        assert!(!result.verify());

        let mut result = pending(6, 4).resolve(1).unwrap();
        result.combined_value = 0;
        assert!(!result.verify());
    }

    #[test]
    fn test_guess_round_compares_secret() {
        let hit = pending(2, 1).resolve_guess(1).unwrap();
        assert_eq!(hit.round.combined_value, 1);
        assert!(hit.is_correct());
        assert!(hit.round.verify());

        let miss = pending(2, 1).resolve_guess(0).unwrap();
        assert!(!miss.is_correct());
    }

    #[test]
    fn test_guess_out_of_range_rejected() {
        let rejected = pending(2, 0).resolve_guess(2).unwrap_err();
        assert!(rejected.error.is_recoverable());
    }

    #[test]
    fn test_combine_does_not_overflow() {
        assert_eq!(combine(u32::MAX - 1, u32::MAX - 1, u32::MAX), u32::MAX - 2);
    }

    #[test]
    fn test_result_json_carries_hex_key() {
        let result = pending(6, 3).resolve(2).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["key"].as_str().unwrap(), result.revealed_key_hex());
        assert_eq!(json["algorithm"], "hmac-sha3-256");
        assert_eq!(json["combined_value"], 5);

        let back: RoundResult = serde_json::from_value(json).unwrap();
        assert!(back.verify());
    }
}
