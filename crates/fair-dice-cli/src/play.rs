//! Interactive game session.
//!
//! Reads one answer per line. `X` abandons the game, `?` shows the
//! probability table, anything else must be a number from the menu.

use crate::table;
use anyhow::{Context, Result};
use fair_dice_core::game::FIRST_MOVE_RANGE;
use fair_dice_core::{Game, GameError, HmacDigest, Outcome, Phase, Player};
use rand::{CryptoRng, RngCore};
use std::io::{BufRead, Write};
use tracing::debug;

/// How a session ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ending {
    Finished(Outcome),
    Abandoned,
}

enum Reply {
    Exit,
    Help,
    Number(u32),
}

pub struct Session<R, I, O> {
    game: Game<R>,
    input: I,
    output: O,
    print_transcript: bool,
}

impl<R, I, O> Session<R, I, O>
where
    R: RngCore + CryptoRng,
    I: BufRead,
    O: Write,
{
    pub fn new(game: Game<R>, input: I, output: O) -> Self {
        Self {
            game,
            input,
            output,
            print_transcript: false,
        }
    }

    /// Print the JSON transcript once the game is over
    pub fn with_transcript(mut self, enabled: bool) -> Self {
        self.print_transcript = enabled;
        self
    }

    pub fn run(mut self) -> Result<Ending> {
        match self.play()? {
            Some(outcome) => {
                if self.print_transcript {
                    let json = serde_json::to_string_pretty(self.game.transcript())?;
                    writeln!(self.output, "{}", json)?;
                }
                Ok(Ending::Finished(outcome))
            }
            None => {
                writeln!(self.output, "Exiting the game...")?;
                self.game.abandon();
                Ok(Ending::Abandoned)
            }
        }
    }

    /// `None` when the user walked away
    fn play(&mut self) -> Result<Option<Outcome>> {
        if !self.first_move()? {
            return Ok(None);
        }
        while let Phase::DiceSelection(player) = self.game.phase() {
            if !self.select_die(player)? {
                return Ok(None);
            }
        }
        while let Phase::Throw(player) = self.game.phase() {
            if !self.throw(player)? {
                return Ok(None);
            }
        }
        match self.game.phase() {
            Phase::Finished(outcome) => {
                self.announce(outcome)?;
                Ok(Some(outcome))
            }
            phase => anyhow::bail!("game stopped early in {:?}", phase),
        }
    }

    fn first_move(&mut self) -> Result<bool> {
        writeln!(self.output, "Let's determine who makes the first move.")?;
        let digest = self.game.start_first_move()?;
        self.offer(digest, FIRST_MOVE_RANGE)?;
        writeln!(self.output, "Try to guess my selection.")?;
        self.menu(FIRST_MOVE_RANGE)?;

        let first_move = loop {
            let Some(guess) = self.ask()? else {
                return Ok(false);
            };
            match self.game.guess_first_move(guess) {
                Ok(first_move) => break first_move,
                Err(e) => self.recover(e)?,
            }
        };

        let round = &first_move.round.round;
        writeln!(
            self.output,
            "My selection: {} (KEY={}).",
            round.secret_value,
            round.revealed_key_hex()
        )?;
        match first_move.first {
            Player::User => writeln!(self.output, "You guessed right! You make the first move.")?,
            Player::Computer => writeln!(self.output, "You guessed wrong. I make the first move.")?,
        }
        Ok(true)
    }

    fn select_die(&mut self, player: Player) -> Result<bool> {
        match player {
            Player::Computer => {
                let die = self.game.choose_computer_die()?.to_string();
                writeln!(self.output, "I choose the [{}] dice.", die)?;
            }
            Player::User => {
                writeln!(self.output, "Choose your dice:")?;
                let labels: Vec<String> =
                    self.game.pool().dice().iter().map(|d| d.to_string()).collect();
                for (index, label) in labels.iter().enumerate() {
                    writeln!(self.output, "{} - {}", index, label)?;
                }
                self.controls()?;

                let die = loop {
                    let Some(index) = self.ask()? else {
                        return Ok(false);
                    };
                    match self.game.choose_user_die(index as usize) {
                        Ok(die) => break die.to_string(),
                        Err(e) => self.recover(e)?,
                    }
                };
                writeln!(self.output, "You choose the [{}] dice.", die)?;
            }
        }
        Ok(true)
    }

    fn throw(&mut self, player: Player) -> Result<bool> {
        match player {
            Player::Computer => writeln!(self.output, "It's time for my throw.")?,
            Player::User => writeln!(self.output, "It's time for your throw.")?,
        }
        let (_, digest) = self.game.start_throw()?;
        let range = self
            .game
            .pending()
            .map(|(_, range)| range)
            .context("throw started without a pending round")?;
        self.offer(digest, range)?;
        writeln!(
            self.output,
            "Add your number modulo {} (0 to {}):",
            range,
            range - 1
        )?;
        self.menu(range)?;

        let throw = loop {
            let Some(contribution) = self.ask()? else {
                return Ok(false);
            };
            match self.game.resolve_throw(contribution) {
                Ok(throw) => break throw,
                Err(e) => self.recover(e)?,
            }
        };

        let round = &throw.round;
        writeln!(
            self.output,
            "My number is {} (KEY={}).",
            round.secret_value,
            round.revealed_key_hex()
        )?;
        writeln!(
            self.output,
            "The result is {} + {} = {} (mod {}).",
            round.secret_value, round.contribution, round.combined_value, round.range
        )?;
        match player {
            Player::Computer => writeln!(self.output, "My throw is {}.", throw.face)?,
            Player::User => writeln!(self.output, "Your throw is {}.", throw.face)?,
        }
        Ok(true)
    }

    fn announce(&mut self, outcome: Outcome) -> Result<()> {
        let face = |player: Player| {
            self.game
                .transcript()
                .throws
                .iter()
                .find(|t| t.player == player)
                .map(|t| t.face)
                .unwrap_or_default()
        };
        let (user, computer) = (face(Player::User), face(Player::Computer));
        match outcome {
            Outcome::UserWins => writeln!(self.output, "You win ({} > {})!", user, computer)?,
            Outcome::ComputerWins => writeln!(self.output, "I win ({} > {})!", computer, user)?,
            Outcome::Tie => writeln!(self.output, "It's a tie ({} = {})!", user, computer)?,
        }
        Ok(())
    }

    fn offer(&mut self, digest: HmacDigest, range: u32) -> Result<()> {
        writeln!(
            self.output,
            "I selected a random value in the range 0..{} (HMAC={}).",
            range - 1,
            digest
        )?;
        Ok(())
    }

    fn menu(&mut self, range: u32) -> Result<()> {
        for value in 0..range {
            writeln!(self.output, "{} - {}", value, value)?;
        }
        self.controls()
    }

    fn controls(&mut self) -> Result<()> {
        writeln!(self.output, "X - exit")?;
        writeln!(self.output, "? - help")?;
        Ok(())
    }

    /// Prompt until the user gives a number or exits. `None` means exit.
    fn ask(&mut self) -> Result<Option<u32>> {
        loop {
            match self.read_reply()? {
                Reply::Exit => return Ok(None),
                Reply::Help => self.help()?,
                Reply::Number(n) => return Ok(Some(n)),
            }
        }
    }

    fn read_reply(&mut self) -> Result<Reply> {
        loop {
            write!(self.output, "Your selection: ")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.output)?;
                return Ok(Reply::Exit);
            }
            let line = line.trim();
            debug!(input = line, "read reply");

            if line.eq_ignore_ascii_case("x") {
                return Ok(Reply::Exit);
            }
            if line == "?" {
                return Ok(Reply::Help);
            }
            match line.parse() {
                Ok(n) => return Ok(Reply::Number(n)),
                Err(_) => writeln!(self.output, "Please enter one of the listed options.")?,
            }
        }
    }

    /// Report a bad choice and carry on, or give up on a fatal error
    fn recover(&mut self, error: GameError) -> Result<()> {
        if error.is_fatal() {
            return Err(error.into());
        }
        writeln!(self.output, "{}. Try again.", error)?;
        Ok(())
    }

    fn help(&mut self) -> Result<()> {
        writeln!(
            self.output,
            "Help: This is a non-transitive dice game where each player selects a dice and rolls it. The highest roll wins."
        )?;
        writeln!(self.output, "Probability of the win for the user:")?;
        writeln!(self.output, "{}", table::Table::new(&self.game.help_matrix()))?;
        self.controls()
    }
}
