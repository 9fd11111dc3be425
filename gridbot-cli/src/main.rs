//! GRIDBOT CLI - Command-line interface
//!
//! Commands:
//! - search: Recommend a column for a four-in-a-row position
//! - play: Play one local game between MCTS, random, or human players
//! - arena: Pit MCTS against random play over many games

mod arena_cmd;
mod human;
mod play_cmd;
mod search_cmd;

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "gridbot")]
#[command(version)]
#[command(about = "Monte Carlo tree search player for small grid games")]
struct Cli {
    /// Default log level when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend a column for a four-in-a-row position
    Search(search_cmd::SearchArgs),
    /// Play a single game
    Play(play_cmd::PlayArgs),
    /// MCTS vs random over many games
    Arena(arena_cmd::ArenaArgs),
}

fn init_tracing(level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        Commands::Search(args) => search_cmd::run(args),
        Commands::Play(args) => play_cmd::run(args).map(|()| ExitCode::SUCCESS),
        Commands::Arena(args) => arena_cmd::run(args).map(|()| ExitCode::SUCCESS),
    }
}
