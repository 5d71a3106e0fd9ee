//! Game orchestration errors.

use crate::dice::DieError;
use crate::protocol::ProtocolError;
use thiserror::Error;

/// Errors from sequencing a game
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Die(#[from] DieError),

    #[error("at least {min} dice are required, got {actual}")]
    NotEnoughDice { min: usize, actual: usize },

    #[error("no die at index {index}: {available} left to choose from")]
    NoSuchDie { index: usize, available: usize },
}

impl GameError {
    /// Errors that end the game: orchestration defects and a dead random
    /// source. Everything else is answered by asking the user again.
    pub fn is_fatal(&self) -> bool {
        match self {
            GameError::Protocol(e) => !e.is_recoverable(),
            GameError::Die(_) | GameError::NotEnoughDice { .. } | GameError::NoSuchDie { .. } => {
                false
            }
        }
    }
}
