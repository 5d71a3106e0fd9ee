//! Fair Dice Core Library
//!
//! Commit-reveal rounds that let two parties who do not trust each other
//! agree on random values, plus the non-transitive dice they are used to
//! throw:
//!
//! - [`crypto`]: keyed-hash commitments and the fair random generator
//! - [`protocol`]: rounds (`start` / `resolve`), players and errors
//! - [`dice`]: dice and win probabilities
//! - [`game`]: who moves first, who gets which die, two fair throws

pub mod crypto;
pub mod dice;
pub mod game;
pub mod protocol;

pub use crypto::{verify_commitment, Commitment, FairRandomGenerator, HmacDigest, KeyedHash, SecretKey};
pub use dice::{tie_probability, win_probability, Die, DieError, Odds, ProbabilityMatrix};
pub use game::{DicePool, Game, GameError, Phase, Strategy, Transcript};
pub use protocol::{
    FairnessRound, GuessResult, Outcome, PendingRound, Player, ProtocolError, RoundId, RoundResult,
};
