//! Dice pool that only shrinks.

use super::GameError;
use crate::dice::Die;

/// Fewest dice a game can start with
pub const MIN_DICE: usize = 3;

/// Dice not yet handed to a party.
///
/// [`DicePool::take`] moves a die out, so a die can belong to at most one
/// party and the pool never grows back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DicePool {
    dice: Vec<Die>,
}

impl DicePool {
    pub fn new(dice: Vec<Die>) -> Result<Self, GameError> {
        if dice.len() < MIN_DICE {
            return Err(GameError::NotEnoughDice {
                min: MIN_DICE,
                actual: dice.len(),
            });
        }
        Ok(Self { dice })
    }

    pub fn dice(&self) -> &[Die] {
        &self.dice
    }

    pub fn len(&self) -> usize {
        self.dice.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dice.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Die> {
        self.dice.get(index)
    }

    /// Remove and return the die at `index`
    pub fn take(&mut self, index: usize) -> Result<Die, GameError> {
        if index >= self.dice.len() {
            return Err(GameError::NoSuchDie {
                index,
                available: self.dice.len(),
            });
        }
        Ok(self.dice.remove(index))
    }
}
