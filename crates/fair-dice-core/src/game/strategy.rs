//! How the computer picks its die.

use super::DicePool;
use crate::crypto::FairRandomGenerator;
use crate::dice::{Die, Odds};
use crate::protocol::ProtocolError;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Computer die selection
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Uniform pick from the pool
    #[default]
    Random,
    /// Best win probability against the user's die when it is known,
    /// uniform otherwise
    Counter,
}

impl Strategy {
    /// Index into `pool` of the die to take
    pub fn choose<R: RngCore + CryptoRng>(
        &self,
        pool: &DicePool,
        opponent: Option<&Die>,
        generator: &mut FairRandomGenerator<R>,
    ) -> Result<usize, ProtocolError> {
        match (self, opponent) {
            (Strategy::Counter, Some(opponent)) if !pool.is_empty() => {
                Ok(best_against(pool.dice(), opponent))
            }
            _ => {
                let range = u32::try_from(pool.len())
                    .map_err(|_| ProtocolError::misuse("dice pool too large"))?;
                generator.pick(range).map(|i| i as usize)
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Random => "random",
            Strategy::Counter => "counter",
        }
    }
}

/// First die with the highest win probability against `opponent`
fn best_against(dice: &[Die], opponent: &Die) -> usize {
    let mut best = 0;
    let mut best_odds: Option<Odds> = None;
    for (index, die) in dice.iter().enumerate() {
        let odds = Odds::between(die, opponent);
        let better = match best_odds {
            None => true,
            // wins/total > best.wins/best.total, exact
            Some(b) => {
                u128::from(odds.wins) * u128::from(b.total)
                    > u128::from(b.wins) * u128::from(odds.total)
            }
        };
        if better {
            best = index;
            best_odds = Some(odds);
        }
    }
    best
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown strategy name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown strategy '{0}' (expected random or counter)")]
pub struct UnknownStrategy(String);

impl FromStr for Strategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "random" => Ok(Strategy::Random),
            "counter" => Ok(Strategy::Counter),
            other => Err(UnknownStrategy(other.to_string())),
        }
    }
}
