//! Game orchestration around fair rounds.

mod error;
mod orchestrator;
mod pool;
mod strategy;

pub use error::GameError;
pub use orchestrator::{FirstMove, Game, Phase, Throw, Transcript, FIRST_MOVE_RANGE};
pub use pool::{DicePool, MIN_DICE};
pub use strategy::{Strategy, UnknownStrategy};
