//! Fair Dice
//!
//! Terminal game of non-transitive dice against the computer. Every random
//! value the computer uses is committed to with an HMAC before the user
//! answers, and revealed afterwards so the user can check it.

mod cli;
mod play;
mod table;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cli::{Cli, Command, PlayArgs};
use fair_dice_core::{verify_commitment, Die, Game, KeyedHash, ProbabilityMatrix};
use play::{Ending, Session};
use std::io;
use table::Table;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    match cli.command {
        None => play(cli.play),
        Some(Command::Play(args)) => play(args),
        Some(Command::Matrix { dice, json }) => {
            println!("{}", matrix_report(&dice, json)?);
            Ok(())
        }
        Some(Command::Verify {
            hash,
            digest,
            key,
            value,
        }) => verify(hash, &digest, &key, value),
    }
}

/// Logs go to stderr so they never mix with the game's prompts
fn init_tracing(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new(Level::DEBUG.as_str())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("setting default subscriber failed: {}", e))
}

fn play(args: PlayArgs) -> Result<()> {
    let game = Game::new(args.dice, args.hash, args.strategy).context("cannot start game")?;
    let stdin = io::stdin();
    let ending = Session::new(game, stdin.lock(), io::stdout())
        .with_transcript(args.transcript)
        .run()?;
    match ending {
        Ending::Finished(outcome) => info!(%outcome, "game over"),
        Ending::Abandoned => info!("game abandoned"),
    }
    Ok(())
}

/// Body of `matrix`: pretty JSON, or the help table under its heading
fn matrix_report(dice: &[Die], json: bool) -> Result<String> {
    let matrix = ProbabilityMatrix::new(dice);
    if json {
        return Ok(serde_json::to_string_pretty(&matrix)?);
    }
    Ok(format!(
        "Probability of the win for the user:\n{}",
        Table::new(&matrix)
    ))
}

/// Whether the revealed pair reproduces the published digest
fn check_commitment(hash: KeyedHash, digest: &str, key: &str, value: u32) -> Result<bool> {
    verify_commitment(hash, digest, key, value).context("malformed hex input")
}

fn verify(hash: KeyedHash, digest: &str, key: &str, value: u32) -> Result<()> {
    if !check_commitment(hash, digest, key, value)? {
        bail!("HMAC mismatch: the revealed key and value do not produce {}", digest);
    }
    println!("OK: {}(KEY, \"{}\") matches the published HMAC.", hash, value);
    Ok(())
}
