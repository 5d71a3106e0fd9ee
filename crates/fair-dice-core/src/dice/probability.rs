//! Win probabilities between dice by exhaustive face-vs-face comparison.

use super::Die;
use serde::{Deserialize, Serialize};

/// Exact pair counts over the full cross product of two dice
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Odds {
    /// Pairs where the first die shows the higher face
    pub wins: u64,
    pub ties: u64,
    pub losses: u64,
    /// `|a| * |b|`
    pub total: u64,
}

impl Odds {
    /// Count every `(face_a, face_b)` pair
    pub fn between(a: &Die, b: &Die) -> Self {
        let (mut wins, mut ties, mut losses) = (0u64, 0u64, 0u64);
        for fa in a.faces() {
            for fb in b.faces() {
                match fa.cmp(fb) {
                    std::cmp::Ordering::Greater => wins += 1,
                    std::cmp::Ordering::Equal => ties += 1,
                    std::cmp::Ordering::Less => losses += 1,
                }
            }
        }
        Self {
            wins,
            ties,
            losses,
            total: wins + ties + losses,
        }
    }

    pub fn win_probability(&self) -> f64 {
        self.wins as f64 / self.total as f64
    }

    pub fn tie_probability(&self) -> f64 {
        self.ties as f64 / self.total as f64
    }

    pub fn loss_probability(&self) -> f64 {
        self.losses as f64 / self.total as f64
    }

    /// The same counts seen from the second die
    pub fn reversed(&self) -> Self {
        Self {
            wins: self.losses,
            ties: self.ties,
            losses: self.wins,
            total: self.total,
        }
    }
}

/// Probability that a face of `a` beats a face of `b`; ties count for neither
pub fn win_probability(a: &Die, b: &Die) -> f64 {
    Odds::between(a, b).win_probability()
}

/// Probability that faces of `a` and `b` are equal
pub fn tie_probability(a: &Die, b: &Die) -> f64 {
    Odds::between(a, b).tie_probability()
}

/// Square table of [`Odds`] over a set of dice; row beats column.
///
/// The diagonal holds each die against itself, computed like any other cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityMatrix {
    dice: Vec<Die>,
    cells: Vec<Vec<Odds>>,
}

impl ProbabilityMatrix {
    pub fn new(dice: &[Die]) -> Self {
        let cells = dice
            .iter()
            .map(|row| dice.iter().map(|col| Odds::between(row, col)).collect())
            .collect();
        Self {
            dice: dice.to_vec(),
            cells,
        }
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

    pub fn odds(&self, row: usize, col: usize) -> Option<Odds> {
        self.cells.get(row)?.get(col).copied()
    }

    /// Win probability of die `row` against die `col`
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.odds(row, col).map(|o| o.win_probability())
    }

    pub fn rows(&self) -> impl Iterator<Item = (&Die, &[Odds])> {
        self.dice.iter().zip(self.cells.iter().map(Vec::as_slice))
    }
}
