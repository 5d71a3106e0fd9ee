//! Game sequencing: first move, dice selection, two fair throws.

use super::{DicePool, GameError, Strategy};
use crate::crypto::{FairRandomGenerator, HmacDigest, KeyedHash};
use crate::dice::{Die, ProbabilityMatrix};
use crate::protocol::{
    FairnessRound, GuessResult, Outcome, PendingRound, Player, ProtocolError, RoundResult,
};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Range of the first-move guessing round
pub const FIRST_MOVE_RANGE: u32 = 2;

/// Where the game stands
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Deciding who moves first
    FirstMove,
    /// The given player picks a die next
    DiceSelection(Player),
    /// The given player throws next
    Throw(Player),
    Finished(Outcome),
}

/// Outcome of the first-move round
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirstMove {
    pub round: GuessResult,
    pub first: Player,
}

/// One fair throw
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Throw {
    pub player: Player,
    pub round: RoundResult,
    pub face: i64,
}

/// Every round of a game, enough for the user to audit it afterwards
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    pub algorithm: KeyedHash,
    pub first_move: Option<FirstMove>,
    pub user_die: Option<Die>,
    pub computer_die: Option<Die>,
    pub throws: Vec<Throw>,
    pub outcome: Option<Outcome>,
}

impl Transcript {
    /// Recheck every revealed round
    pub fn verify(&self) -> bool {
        self.first_move
            .iter()
            .map(|m| &m.round.round)
            .chain(self.throws.iter().map(|t| &t.round))
            .all(|r| r.algorithm == self.algorithm && r.verify())
    }
}

/// A single game between the user and the computer.
///
/// Calls must follow [`Game::phase`]; calling out of order is a
/// [`ProtocolError::ProtocolMisuse`]. At most one round is outstanding.
/// Dropping the game discards any pending secret.
pub struct Game<R = OsRng> {
    generator: FairRandomGenerator<R>,
    strategy: Strategy,
    dice: Vec<Die>,
    pool: DicePool,
    phase: Phase,
    pending: Option<PendingRound>,
    transcript: Transcript,
}

impl Game<OsRng> {
    /// Game over the OS random source
    pub fn new(dice: Vec<Die>, algorithm: KeyedHash, strategy: Strategy) -> Result<Self, GameError> {
        Self::with_generator(dice, FairRandomGenerator::new(algorithm), strategy)
    }
}

impl<R: RngCore + CryptoRng> Game<R> {
    pub fn with_generator(
        dice: Vec<Die>,
        generator: FairRandomGenerator<R>,
        strategy: Strategy,
    ) -> Result<Self, GameError> {
        let pool = DicePool::new(dice.clone())?;
        let transcript = Transcript {
            algorithm: generator.algorithm(),
            ..Transcript::default()
        };
        info!(dice = pool.len(), %strategy, hash = %generator.algorithm(), "new game");
        Ok(Self {
            generator,
            strategy,
            dice,
            pool,
            phase: Phase::FirstMove,
            pending: None,
            transcript,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn algorithm(&self) -> KeyedHash {
        self.generator.algorithm()
    }

    /// Dice still available to choose from
    pub fn pool(&self) -> &DicePool {
        &self.pool
    }

    /// Win probabilities over every die the game started with
    pub fn help_matrix(&self) -> ProbabilityMatrix {
        ProbabilityMatrix::new(&self.dice)
    }

    pub fn first_player(&self) -> Option<Player> {
        self.transcript.first_move.as_ref().map(|m| m.first)
    }

    pub fn die_of(&self, player: Player) -> Option<&Die> {
        match player {
            Player::User => self.transcript.user_die.as_ref(),
            Player::Computer => self.transcript.computer_die.as_ref(),
        }
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.transcript.outcome
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Digest and range of the outstanding round, if any
    pub fn pending(&self) -> Option<(HmacDigest, u32)> {
        self.pending.as_ref().map(|r| (r.digest(), r.range()))
    }

    /// Commit to the first-move secret; the user then guesses it
    pub fn start_first_move(&mut self) -> Result<HmacDigest, GameError> {
        self.expect_phase(Phase::FirstMove, "start first move")?;
        self.start_round(FIRST_MOVE_RANGE)
    }

    /// Resolve the first-move round with the user's guess. A correct guess
    /// gives the user the first move.
    pub fn guess_first_move(&mut self, guess: u32) -> Result<FirstMove, GameError> {
        self.expect_phase(Phase::FirstMove, "guess first move")?;
        let round = self.take_pending("guess first move")?;
        let result = match round.resolve_guess(guess) {
            Ok(result) => result,
            Err(rejected) => {
                let (error, round) = rejected.into_parts();
                self.pending = Some(round);
                return Err(error.into());
            }
        };

        let first = if result.is_correct() {
            Player::User
        } else {
            Player::Computer
        };
        info!(guess, secret = result.round.secret_value, %first, "first move decided");

        let first_move = FirstMove {
            round: result,
            first,
        };
        self.transcript.first_move = Some(first_move.clone());
        self.phase = Phase::DiceSelection(first);
        Ok(first_move)
    }

    /// Hand the user the die at `index` in the pool
    pub fn choose_user_die(&mut self, index: usize) -> Result<&Die, GameError> {
        self.expect_phase(Phase::DiceSelection(Player::User), "choose user die")?;
        let die = self.pool.take(index)?;
        info!(%die, "user chose die");
        self.assign(Player::User, die);
        self.die_of(Player::User)
            .ok_or_else(|| ProtocolError::misuse("user die missing after assignment").into())
    }

    /// Let the computer pick with its strategy
    pub fn choose_computer_die(&mut self) -> Result<&Die, GameError> {
        self.expect_phase(Phase::DiceSelection(Player::Computer), "choose computer die")?;
        let index = self.strategy.choose(
            &self.pool,
            self.transcript.user_die.as_ref(),
            &mut self.generator,
        )?;
        let die = self.pool.take(index)?;
        info!(%die, strategy = %self.strategy, "computer chose die");
        self.assign(Player::Computer, die);
        self.die_of(Player::Computer)
            .ok_or_else(|| ProtocolError::misuse("computer die missing after assignment").into())
    }

    /// Commit to the next throw's secret. The range is the thrower's face
    /// count, so every face is equally likely.
    pub fn start_throw(&mut self) -> Result<(Player, HmacDigest), GameError> {
        let Phase::Throw(player) = self.phase else {
            return Err(self.out_of_order("start throw"));
        };
        let range = self
            .die_of(player)
            .map(Die::range)
            .ok_or_else(|| ProtocolError::misuse("thrower has no die"))?;
        let digest = self.start_round(range)?;
        Ok((player, digest))
    }

    /// Resolve the outstanding throw with the user's contribution
    pub fn resolve_throw(&mut self, contribution: u32) -> Result<Throw, GameError> {
        let Phase::Throw(player) = self.phase else {
            return Err(self.out_of_order("resolve throw"));
        };
        let round = self.take_pending("resolve throw")?;
        let result = match round.resolve(contribution) {
            Ok(result) => result,
            Err(rejected) => {
                let (error, round) = rejected.into_parts();
                self.pending = Some(round);
                return Err(error.into());
            }
        };

        let die = self
            .die_of(player)
            .ok_or_else(|| ProtocolError::misuse("thrower has no die"))?;
        let face = die.roll(i64::from(result.combined_value));
        info!(%player, combined = result.combined_value, face, "throw resolved");

        let throw = Throw {
            player,
            round: result,
            face,
        };
        self.transcript.throws.push(throw.clone());

        self.phase = match self.transcript.throws.len() {
            1 => Phase::Throw(player.opponent()),
            _ => {
                let outcome = self.decide()?;
                info!(%outcome, "game finished");
                self.transcript.outcome = Some(outcome);
                Phase::Finished(outcome)
            }
        };
        Ok(throw)
    }

    /// Drop the game, discarding any outstanding secret unrevealed
    pub fn abandon(mut self) {
        if let Some(round) = self.pending.take() {
            info!(round = %round.id(), "round abandoned");
        }
    }

    fn start_round(&mut self, range: u32) -> Result<HmacDigest, GameError> {
        if self.pending.is_some() {
            return Err(ProtocolError::misuse("a round is already outstanding").into());
        }
        let (digest, round) = FairnessRound::start(&mut self.generator, range)?;
        debug!(round = %round.id(), range, "round started");
        self.pending = Some(round);
        Ok(digest)
    }

    fn take_pending(&mut self, action: &str) -> Result<PendingRound, GameError> {
        self.pending
            .take()
            .ok_or_else(|| ProtocolError::misuse(format!("{}: no round outstanding", action)).into())
    }

    fn assign(&mut self, player: Player, die: Die) {
        match player {
            Player::User => self.transcript.user_die = Some(die),
            Player::Computer => self.transcript.computer_die = Some(die),
        }
        let first = self.first_player().unwrap_or(player);
        let both_chosen =
            self.transcript.user_die.is_some() && self.transcript.computer_die.is_some();
        self.phase = if both_chosen {
            Phase::Throw(first)
        } else {
            Phase::DiceSelection(player.opponent())
        };
    }

    fn decide(&self) -> Result<Outcome, GameError> {
        let face = |p: Player| {
            self.transcript
                .throws
                .iter()
                .find(|t| t.player == p)
                .map(|t| t.face)
                .ok_or_else(|| ProtocolError::misuse(format!("{} has not thrown", p)))
        };
        Ok(Outcome::compare(face(Player::User)?, face(Player::Computer)?))
    }

    fn expect_phase(&self, expected: Phase, action: &str) -> Result<(), GameError> {
        if self.phase != expected {
            return Err(self.out_of_order(action));
        }
        Ok(())
    }

    fn out_of_order(&self, action: &str) -> GameError {
        ProtocolError::misuse(format!("cannot {} during {:?}", action, self.phase)).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn dice() -> Vec<Die> {
        vec![
            "2,2,4,4,9,9".parse().unwrap(),
            "1,1,6,6,8,8".parse().unwrap(),
            "3,3,5,5,7,7".parse().unwrap(),
        ]
    }

    fn game(seed: u64, strategy: Strategy) -> Game<StdRng> {
        let generator =
            FairRandomGenerator::with_rng(StdRng::seed_from_u64(seed), KeyedHash::default());
        Game::with_generator(dice(), generator, strategy).unwrap()
    }

    /// Drive a game to the end, always guessing 0 and contributing 1
    fn play(game: &mut Game<StdRng>) {
        game.start_first_move().unwrap();
        let first = game.guess_first_move(0).unwrap().first;
        match first {
            Player::User => {
                game.choose_user_die(0).unwrap();
                game.choose_computer_die().unwrap();
            }
            Player::Computer => {
                game.choose_computer_die().unwrap();
                game.choose_user_die(0).unwrap();
            }
        }
        for _ in 0..2 {
            game.start_throw().unwrap();
            game.resolve_throw(1).unwrap();
        }
    }

    #[test]
    fn test_full_game_reaches_outcome() {
        for seed in 0..20 {
            let mut game = game(seed, Strategy::Random);
            play(&mut game);

            let Phase::Finished(outcome) = game.phase() else {
                panic!("game did not finish: {:?}", game.phase());
            };
            assert_eq!(game.outcome(), Some(outcome));
            assert!(game.transcript().verify());
            assert_eq!(game.transcript().throws.len(), 2);
            assert_eq!(game.pool().len(), 1);
        }
    }

    #[test]
    fn test_first_mover_throws_first() {
        for seed in 0..20 {
            let mut game = game(seed, Strategy::Counter);
            play(&mut game);
            let first = game.first_player().unwrap();
            assert_eq!(game.transcript().throws[0].player, first);
            assert_eq!(game.transcript().throws[1].player, first.opponent());
        }
    }

    #[test]
    fn test_dice_are_never_shared() {
        let mut game = game(3, Strategy::Random);
        play(&mut game);
        let user = game.die_of(Player::User).unwrap();
        let computer = game.die_of(Player::Computer).unwrap();
        assert_ne!(user, computer);
        assert!(!game.pool().dice().contains(user));
        assert!(!game.pool().dice().contains(computer));
    }

    #[test]
    fn test_out_of_order_calls_are_misuse() {
        let mut game = game(1, Strategy::Random);

        let err = game.guess_first_move(0).unwrap_err();
        assert!(err.is_fatal());

        let err = game.start_throw().unwrap_err();
        assert!(matches!(
            err,
            GameError::Protocol(ProtocolError::ProtocolMisuse(_))
        ));

        let err = game.choose_user_die(0).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_second_round_while_outstanding_is_misuse() {
        let mut game = game(1, Strategy::Random);
        game.start_first_move().unwrap();
        let err = game.start_first_move().unwrap_err();
        assert!(err.is_fatal());
        // the original round is still live
        assert!(game.pending().is_some());
        game.guess_first_move(1).unwrap();
    }

    #[test]
    fn test_bad_guess_keeps_same_round() {
        let mut game = game(2, Strategy::Random);
        let digest = game.start_first_move().unwrap();

        let err = game.guess_first_move(2).unwrap_err();
        assert_eq!(
            err,
            GameError::Protocol(ProtocolError::ContributionOutOfRange { value: 2, range: 2 })
        );
        assert!(!err.is_fatal());
        assert_eq!(game.pending(), Some((digest, 2)));

        let first_move = game.guess_first_move(1).unwrap();
        assert_eq!(first_move.round.round.digest, digest);
    }

    #[test]
    fn test_bad_die_index_is_recoverable() {
        let mut game = game(5, Strategy::Random);
        game.start_first_move().unwrap();
        let first = game.guess_first_move(0).unwrap().first;
        if first == Player::Computer {
            game.choose_computer_die().unwrap();
        }
        let err = game.choose_user_die(7).unwrap_err();
        assert!(!err.is_fatal());
        assert!(game.choose_user_die(0).is_ok());
    }

    #[test]
    fn test_bad_contribution_keeps_same_throw() {
        let mut game = game(8, Strategy::Random);
        game.start_first_move().unwrap();
        match game.guess_first_move(1).unwrap().first {
            Player::User => {
                game.choose_user_die(1).unwrap();
                game.choose_computer_die().unwrap();
            }
            Player::Computer => {
                game.choose_computer_die().unwrap();
                game.choose_user_die(0).unwrap();
            }
        }
        let (player, digest) = game.start_throw().unwrap();
        assert!(game.resolve_throw(6).is_err());
        let throw = game.resolve_throw(5).unwrap();
        assert_eq!(throw.player, player);
        assert_eq!(throw.round.digest, digest);
        assert_eq!(
            throw.face,
            game.die_of(player)
                .unwrap()
                .roll(i64::from(throw.round.combined_value))
        );
    }

    #[test]
    fn test_help_matrix_covers_starting_dice() {
        let mut game = game(4, Strategy::Random);
        play(&mut game);
        assert_eq!(game.help_matrix().len(), 3);
    }

    #[test]
    fn test_transcript_serializes() {
        let mut game = game(9, Strategy::Counter);
        play(&mut game);
        let json = serde_json::to_string(game.transcript()).unwrap();
        let back: Transcript = serde_json::from_str(&json).unwrap();
        assert_eq!(&back, game.transcript());
        assert!(back.verify());
    }

    #[test]
    fn test_abandon_mid_round_records_no_reveal() {
        let mut game = game(6, Strategy::Random);
        let digest = game.start_first_move().unwrap();
        assert_eq!(game.pending(), Some((digest, FIRST_MOVE_RANGE)));

        // nothing about the outstanding round reaches the audit record
        assert!(game.transcript().first_move.is_none());
        let json = serde_json::to_string(game.transcript()).unwrap();
        assert!(!json.contains(&digest.to_string()));

        game.abandon();
    }
}
