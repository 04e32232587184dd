//! Formic CLI - run, batch, and inspect ant battles.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

/// Formic - a deterministic multi-player ant battle engine
#[derive(Parser, Debug)]
#[command(name = "formic")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a single game between built-in bots
    Run {
        /// Map file
        #[arg(required = true)]
        map: std::path::PathBuf,

        /// Built-in bots: one per player, or one replicated for all
        #[arg(short, long, value_delimiter = ',', default_value = "gatherer")]
        bots: Vec<cli::bots::BotKind>,

        /// Engine seed (default: derived from the clock)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Seed published to bots (default: derived from the engine seed)
        #[arg(long)]
        player_seed: Option<u64>,

        /// Maximum turns (default: 1500)
        #[arg(short, long)]
        turns: Option<u32>,

        /// Combat policy
        #[arg(long, default_value = "focus")]
        combat: cli::CombatArg,

        /// Food placement strategy
        #[arg(long, default_value = "symmetric")]
        food: cli::FoodArg,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Save the replay summary to a JSON file
        #[arg(long)]
        save_replay: Option<std::path::PathBuf>,

        /// Suppress progress output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Run mass parallel games and aggregate win statistics
    Selfplay {
        /// Map file
        #[arg(required = true)]
        map: std::path::PathBuf,

        /// Built-in bots: one per player, or one replicated for all
        #[arg(short, long, value_delimiter = ',', default_value = "gatherer")]
        bots: Vec<cli::bots::BotKind>,

        /// Number of games to run
        #[arg(short, long, default_value = "100")]
        games: u64,

        /// Base seed (increments per game)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Combat policy
        #[arg(long, default_value = "focus")]
        combat: cli::CombatArg,

        /// Food placement strategy
        #[arg(long, default_value = "symmetric")]
        food: cli::FoodArg,

        /// Show progress bar
        #[arg(short, long)]
        progress: bool,
    },

    /// Summarize a saved replay, or reconstruct one turn of it
    Inspect {
        /// Replay JSON file
        #[arg(required = true)]
        replay: std::path::PathBuf,

        /// Print the reconstructed full state of this turn instead
        #[arg(short, long)]
        turn: Option<u32>,
    },

    /// Validate a map file
    Check {
        /// Map file
        #[arg(required = true)]
        map: std::path::PathBuf,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let result = match args.command {
        Commands::Run {
            map,
            bots,
            seed,
            player_seed,
            turns,
            combat,
            food,
            format,
            save_replay,
            quiet,
        } => cli::run::execute(
            map,
            bots,
            seed,
            player_seed,
            turns,
            combat,
            food,
            format,
            save_replay,
            quiet,
        ),

        Commands::Selfplay {
            map,
            bots,
            games,
            seed,
            threads,
            combat,
            food,
            progress,
        } => cli::selfplay::execute(map, bots, games, seed, threads, combat, food, progress),

        Commands::Inspect { replay, turn } => cli::inspect::execute(replay, turn),

        Commands::Check { map } => cli::check::execute(map),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
