//! Dice and the non-transitive win-probability model.

mod die;
mod probability;

pub use die::{Die, DieError};
pub use probability::{tie_probability, win_probability, Odds, ProbabilityMatrix};
