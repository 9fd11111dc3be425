//! Search command - recommend a column for one four-in-a-row position
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: load_board(), build_config(), report_result()
//! - Level 3: text and JSON output
//! - Level 4: parsing helpers

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;

use gridbot_core::{Board, Mark};
use gridbot_mcts::{run_search, MctsConfig, SearchError, SearchResult, SelectionMode};

/// Exit status when the position handed in is already decided
const EXIT_ALREADY_FINISHED: u8 = 2;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct SearchArgs {
    /// Board as JSON columns, bottom first, e.g. '[["O","X"],[],[],[],[],[],[]]'
    #[arg(long, conflicts_with = "board_file")]
    pub board: Option<String>,

    /// Read the JSON board from a file instead
    #[arg(long)]
    pub board_file: Option<PathBuf>,

    /// Mark to move (O or X)
    #[arg(long, default_value = "O")]
    pub to_move: Mark,

    /// Search budget in seconds
    #[arg(long, default_value = "1.0")]
    pub time: f64,

    /// Sample children by UCT weight instead of taking the arg-max
    #[arg(long)]
    pub stochastic: bool,

    /// Stop after this many iterations even if time remains
    #[arg(long)]
    pub max_iterations: Option<u32>,

    /// Random seed for a reproducible search
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print per-column statistics
    #[arg(long)]
    pub stats: bool,

    /// Output result as JSON
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run search command
pub fn run(args: SearchArgs) -> Result<ExitCode> {
    let board = load_board(&args)?;
    let config = build_config(&args);

    tracing::info!(
        "Searching for {} with {:.2}s budget ({:?})",
        args.to_move,
        args.time,
        config.mode
    );

    match run_search(board, args.to_move, &config) {
        Ok(result) => {
            report_result(&board, &result, &args);
            Ok(ExitCode::SUCCESS)
        }
        Err(SearchError::AlreadyTerminal(outcome)) => {
            println!("Position is already finished: {}", outcome);
            Ok(ExitCode::from(EXIT_ALREADY_FINISHED))
        }
        Err(err) => Err(err).context("Search failed"),
    }
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Board from --board, --board-file, or empty
fn load_board(args: &SearchArgs) -> Result<Board> {
    if let Some(json) = &args.board {
        return parse_board(json).context("Invalid --board");
    }

    if let Some(path) = &args.board_file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read board file: {}", path.display()))?;
        return parse_board(&text).with_context(|| format!("Invalid board in {}", path.display()));
    }

    Ok(Board::new())
}

fn build_config(args: &SearchArgs) -> MctsConfig {
    let mode = if args.stochastic {
        SelectionMode::Stochastic
    } else {
        SelectionMode::Deterministic
    };

    let mut config = MctsConfig::timed(args.time).with_mode(mode);
    if let Some(iterations) = args.max_iterations {
        config = config.with_max_iterations(iterations);
    }
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    config
}

fn report_result(board: &Board, result: &SearchResult<Board>, args: &SearchArgs) {
    if args.json {
        print_json_result(result, args.to_move);
    } else {
        print_text_result(board, result, args.stats);
    }
}

// ============================================================================
// LEVEL 3 - OUTPUT
// ============================================================================

fn print_json_result(result: &SearchResult<Board>, to_move: Mark) {
    #[derive(serde::Serialize)]
    struct JsonColumn {
        column: usize,
        visits: u32,
        win_rate: f64,
    }

    #[derive(serde::Serialize)]
    struct JsonOutput {
        to_move: Mark,
        column: usize,
        iterations: u32,
        elapsed_ms: f64,
        columns: Vec<JsonColumn>,
    }

    let output = JsonOutput {
        to_move,
        column: result.best_move,
        iterations: result.iterations,
        elapsed_ms: result.elapsed.as_secs_f64() * 1000.0,
        columns: result
            .move_stats
            .iter()
            .map(|s| JsonColumn {
                column: s.mv,
                visits: s.visits,
                win_rate: s.win_rate,
            })
            .collect(),
    };

    if let Ok(json) = serde_json::to_string_pretty(&output) {
        println!("{}", json);
    }
}

fn print_text_result(board: &Board, result: &SearchResult<Board>, stats: bool) {
    if !stats {
        println!("{}", result.best_move);
        return;
    }

    println!("{}", board);
    println!(
        "Best column: {} ({} iterations in {:.1}ms)",
        result.best_move,
        result.iterations,
        result.elapsed.as_secs_f64() * 1000.0
    );
    println!("\nColumn  Visits  Win rate");
    for s in &result.move_stats {
        println!("{:>6}  {:>6}  {:>7.1}%", s.mv, s.visits, s.win_rate * 100.0);
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn parse_board(json: &str) -> Result<Board> {
    let board: Board = serde_json::from_str(json.trim())?;
    Ok(board)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn args() -> SearchArgs {
        SearchArgs {
            board: None,
            board_file: None,
            to_move: Mark::O,
            time: 0.05,
            stochastic: false,
            max_iterations: None,
            seed: None,
            stats: false,
            json: false,
        }
    }

    #[test]
    fn test_default_board_is_empty() {
        let board = load_board(&args()).unwrap();
        assert_eq!(board, Board::new());
    }

    #[test]
    fn test_parse_board_json() {
        let board = parse_board(r#" [["O","O","O"],[],[],["X","X"],[],[],["X"]] "#).unwrap();
        assert_eq!(board.height(0), 3);
        assert_eq!(board.get(3, 1), Some(Mark::X));
    }

    #[test]
    fn test_invalid_board_is_reported() {
        let mut bad = args();
        bad.board = Some(r#"[["O","O","O","O","O","O","O"],[],[],[],[],[],[]]"#.to_string());
        assert!(load_board(&bad).is_err());

        bad.board = Some("not json".to_string());
        assert!(load_board(&bad).is_err());
    }

    #[test]
    fn test_missing_board_file() {
        let mut missing = args();
        missing.board_file = Some(PathBuf::from("/nonexistent/board.json"));
        let err = load_board(&missing).unwrap_err();
        assert!(err.to_string().contains("Failed to read board file"));
    }

    #[test]
    fn test_build_config() {
        let mut a = args();
        a.stochastic = true;
        a.max_iterations = Some(100);
        a.seed = Some(3);

        let config = build_config(&a);
        assert_eq!(config.mode, SelectionMode::Stochastic);
        assert_eq!(config.time_limit, Duration::from_millis(50));
        assert_eq!(config.max_iterations, Some(100));
        assert_eq!(config.seed, Some(3));
    }

    #[test]
    fn test_finished_position_exits_with_code_two() {
        let mut a = args();
        a.board = Some(r#"[["X","X","X","X"],["O"],["O"],["O"],[],[],[]]"#.to_string());
        assert_eq!(run(a).unwrap(), ExitCode::from(EXIT_ALREADY_FINISHED));
    }

    #[test]
    fn test_open_position_succeeds() {
        let mut a = args();
        a.max_iterations = Some(200);
        a.seed = Some(1);
        assert_eq!(run(a).unwrap(), ExitCode::SUCCESS);
    }
}
