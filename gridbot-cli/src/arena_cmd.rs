//! Arena command - MCTS against uniformly random play
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_arena(), report_results()
//! - Level 3: play_single_game(), compute_arena_statistics()
//! - Level 4: progress bar, printing

use std::io::IsTerminal;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};

use gridbot_core::{
    play_game, Board, Game, GridGame, Mark, Outcome, RandomAgent, Variant, DEFAULT_GRID_HEIGHT,
    DEFAULT_GRID_WIDTH,
};
use gridbot_mcts::{MctsConfig, MctsPlayer, SelectionMode};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct ArenaArgs {
    /// Number of games to play
    #[arg(long, default_value = "20")]
    pub games: usize,

    /// MCTS budget per move in seconds
    #[arg(long, default_value = "0.1")]
    pub time: f64,

    /// Cap MCTS iterations per move
    #[arg(long)]
    pub max_iterations: Option<u32>,

    /// MCTS samples children by UCT weight
    #[arg(long)]
    pub stochastic: bool,

    /// Game to play
    #[arg(long, default_value = "four-in-a-row")]
    pub variant: Variant,

    /// Random seed for both players
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// One finished arena game, seen from the MCTS side
#[derive(Clone, Debug)]
struct ArenaGame {
    game_number: usize,
    mcts_mark: Mark,
    outcome: Outcome,
    moves: usize,
}

impl ArenaGame {
    fn mcts_won(&self) -> bool {
        self.outcome == Outcome::Win(self.mcts_mark)
    }

    fn mcts_lost(&self) -> bool {
        self.outcome == Outcome::Win(self.mcts_mark.opponent())
    }
}

#[derive(Clone, Debug)]
struct ArenaResults {
    games: Vec<ArenaGame>,
    wins: usize,
    draws: usize,
    losses: usize,
    avg_moves: f32,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run arena command
///
/// 1. Play all games, alternating which mark MCTS controls
/// 2. Report win/draw/loss totals
pub fn run(args: ArenaArgs) -> Result<()> {
    tracing::info!(
        "Arena: {} games of {}, MCTS {:.2}s per move",
        args.games,
        args.variant,
        args.time
    );

    let results = match args.variant {
        Variant::FourInARow => play_arena(|| Ok(Board::new()), &args)?,
        Variant::GridMovement => play_arena(
            || {
                GridGame::new(DEFAULT_GRID_WIDTH, DEFAULT_GRID_HEIGHT)
                    .context("Cannot build the default grid")
            },
            &args,
        )?,
    };

    report_results(&results, &args);
    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn play_arena<G, F>(initial: F, args: &ArenaArgs) -> Result<ArenaResults>
where
    G: Game,
    F: Fn() -> Result<G>,
{
    let progress = create_progress(args.games)?;
    let base_seed = args.seed.unwrap_or_else(rand::random);
    let mut games = Vec::with_capacity(args.games);

    for game_number in 1..=args.games {
        // Alternate marks so MCTS moves first in half the games
        let mcts_mark = if game_number % 2 == 1 { Mark::O } else { Mark::X };
        let seed = base_seed.wrapping_add(game_number as u64);

        let game = play_single_game(initial()?, mcts_mark, game_number, seed, args)?;
        tracing::debug!(
            "Game {}: MCTS as {}, {} ({} moves)",
            game.game_number,
            game.mcts_mark,
            game.outcome,
            game.moves
        );

        if let Some(pb) = &progress {
            pb.inc(1);
        }
        games.push(game);
    }

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    Ok(compute_arena_statistics(games))
}

fn report_results(results: &ArenaResults, args: &ArenaArgs) {
    if args.json {
        print_json_results(results);
    } else {
        print_text_results(results);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn play_single_game<G: Game>(
    initial: G,
    mcts_mark: Mark,
    game_number: usize,
    seed: u64,
    args: &ArenaArgs,
) -> Result<ArenaGame> {
    let mut mcts = MctsPlayer::new(mcts_config(args, seed));
    let mut random = RandomAgent::with_seed(seed ^ 0x5eed);

    let record = match mcts_mark {
        Mark::O => play_game(initial, Mark::O, [&mut mcts, &mut random], |_, _, _| {}),
        Mark::X => play_game(initial, Mark::O, [&mut random, &mut mcts], |_, _, _| {}),
    }
    .with_context(|| format!("Game {} stopped on an illegal move", game_number))?;

    Ok(ArenaGame {
        game_number,
        mcts_mark,
        outcome: record.outcome,
        moves: record.moves.len(),
    })
}

fn compute_arena_statistics(games: Vec<ArenaGame>) -> ArenaResults {
    let wins = games.iter().filter(|g| g.mcts_won()).count();
    let losses = games.iter().filter(|g| g.mcts_lost()).count();
    let draws = games.iter().filter(|g| g.outcome.is_draw()).count();

    let total_moves: usize = games.iter().map(|g| g.moves).sum();
    let avg_moves = if games.is_empty() {
        0.0
    } else {
        total_moves as f32 / games.len() as f32
    };

    ArenaResults {
        games,
        wins,
        draws,
        losses,
        avg_moves,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn mcts_config(args: &ArenaArgs, seed: u64) -> MctsConfig {
    let mode = if args.stochastic {
        SelectionMode::Stochastic
    } else {
        SelectionMode::Deterministic
    };
    let config = MctsConfig::timed(args.time).with_mode(mode).with_seed(seed);
    match args.max_iterations {
        Some(iterations) => config.with_max_iterations(iterations),
        None => config,
    }
}

/// Progress bar on an interactive stderr only
fn create_progress(games: usize) -> Result<Option<ProgressBar>> {
    if !std::io::stderr().is_terminal() {
        return Ok(None);
    }

    let pb = ProgressBar::new(games as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} games ({eta})")
            .context("Invalid progress template")?
            .progress_chars("#>-"),
    );
    Ok(Some(pb))
}

fn percent(count: usize, total: usize) -> f32 {
    if total > 0 {
        count as f32 / total as f32 * 100.0
    } else {
        0.0
    }
}

fn print_json_results(results: &ArenaResults) {
    #[derive(serde::Serialize)]
    struct JsonGame {
        game_number: usize,
        mcts_mark: Mark,
        winner: Option<Mark>,
        moves: usize,
    }

    #[derive(serde::Serialize)]
    struct JsonOutput {
        total_games: usize,
        mcts_wins: usize,
        draws: usize,
        mcts_losses: usize,
        avg_moves: f32,
        games: Vec<JsonGame>,
    }

    let output = JsonOutput {
        total_games: results.games.len(),
        mcts_wins: results.wins,
        draws: results.draws,
        mcts_losses: results.losses,
        avg_moves: results.avg_moves,
        games: results
            .games
            .iter()
            .map(|g| JsonGame {
                game_number: g.game_number,
                mcts_mark: g.mcts_mark,
                winner: g.outcome.winner(),
                moves: g.moves,
            })
            .collect(),
    };

    if let Ok(json) = serde_json::to_string_pretty(&output) {
        println!("{}", json);
    }
}

fn print_text_results(results: &ArenaResults) {
    let total = results.games.len();

    println!("\n=== Arena Results (MCTS vs random) ===");
    println!("Total games: {}", total);
    println!("MCTS wins:   {} ({:.1}%)", results.wins, percent(results.wins, total));
    println!("Draws:       {} ({:.1}%)", results.draws, percent(results.draws, total));
    println!("MCTS losses: {} ({:.1}%)", results.losses, percent(results.losses, total));
    println!("Avg moves:   {:.1}", results.avg_moves);
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn game(mcts_mark: Mark, outcome: Outcome, moves: usize) -> ArenaGame {
        ArenaGame {
            game_number: 1,
            mcts_mark,
            outcome,
            moves,
        }
    }

    fn args() -> ArenaArgs {
        ArenaArgs {
            games: 2,
            time: 5.0,
            max_iterations: Some(300),
            stochastic: false,
            variant: Variant::FourInARow,
            seed: Some(17),
            json: false,
        }
    }

    #[test]
    fn test_compute_arena_statistics_empty() {
        let results = compute_arena_statistics(vec![]);
        assert_eq!((results.wins, results.draws, results.losses), (0, 0, 0));
        assert_eq!(results.avg_moves, 0.0);
    }

    #[test]
    fn test_compute_arena_statistics() {
        let results = compute_arena_statistics(vec![
            game(Mark::O, Outcome::Win(Mark::O), 10),
            game(Mark::X, Outcome::Win(Mark::O), 20),
            game(Mark::X, Outcome::Draw, 42),
            game(Mark::X, Outcome::Win(Mark::X), 16),
        ]);
        assert_eq!(results.wins, 2);
        assert_eq!(results.losses, 1);
        assert_eq!(results.draws, 1);
        assert_eq!(results.avg_moves, 22.0);
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(1, 4), 25.0);
        assert_eq!(percent(3, 0), 0.0);
    }

    #[test]
    fn test_mcts_config_from_args() {
        let config = mcts_config(&args(), 99);
        assert_eq!(config.max_iterations, Some(300));
        assert_eq!(config.seed, Some(99));
        assert_eq!(config.mode, SelectionMode::Deterministic);
    }

    #[test]
    fn test_short_arena_runs() {
        let a = args();
        let results = play_arena(|| Ok(Board::new()), &a).unwrap();
        assert_eq!(results.games.len(), 2);
        assert_eq!(results.games[0].mcts_mark, Mark::O);
        assert_eq!(results.games[1].mcts_mark, Mark::X);
        assert_eq!(results.wins + results.draws + results.losses, 2);
    }
}
