//! Commit-reveal rounds, protocol types and errors.

mod error;
mod round;
mod types;

pub use error::ProtocolError;
pub use round::{combine, FairnessRound, GuessResult, PendingRound, Rejected, RoundResult};
pub use types::{Outcome, Player, RoundId};
