//! Command line and environment configuration.

use clap::{Args, Parser, Subcommand};
use fair_dice_core::{Die, KeyedHash, Strategy};

#[derive(Parser, Debug)]
#[command(name = "fair-dice")]
#[command(about = "Provably fair non-transitive dice against the computer")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub play: PlayArgs,

    /// Log protocol details to stderr (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play one game (the default)
    Play(PlayArgs),

    /// Print the win probability table for a set of dice
    Matrix {
        /// Dice as comma-separated faces, e.g. 2,2,4,4,9,9
        #[arg(required = true, num_args = 1..)]
        dice: Vec<Die>,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Check a revealed key and value against a published HMAC
    Verify {
        /// Keyed hash the digest was made with
        #[arg(long, env = "FAIR_DICE_HASH", default_value_t = KeyedHash::default())]
        hash: KeyedHash,

        /// Published HMAC, 64 hex characters
        #[arg(long)]
        digest: String,

        /// Revealed key, 64 hex characters
        #[arg(long)]
        key: String,

        /// Revealed value
        #[arg(long)]
        value: u32,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct PlayArgs {
    /// Dice as comma-separated faces; at least three,
    /// e.g. 2,2,4,4,9,9 1,1,6,6,8,8 3,3,5,5,7,7
    pub dice: Vec<Die>,

    /// Keyed hash used for commitments
    #[arg(long, env = "FAIR_DICE_HASH", default_value_t = KeyedHash::default())]
    pub hash: KeyedHash,

    /// How the computer picks its die
    #[arg(long, env = "FAIR_DICE_STRATEGY", default_value_t = Strategy::default())]
    pub strategy: Strategy,

    /// Print the JSON record of every round when the game ends
    #[arg(long)]
    pub transcript: bool,
}
