//! MCTS search throughput benchmark
//!
//! Measures:
//! 1. Iterations per second at fixed budgets on an opening and a midgame
//! 2. Deterministic vs weighted-random descent
//! 3. Move quality: MCTS against uniformly random play

use std::time::Instant;

use gridbot_core::{play_game, Board, GridGame, Mark, Outcome, RandomAgent};
use gridbot_mcts::{run_search, MctsConfig, MctsPlayer, SelectionMode};

// ============================================================================
// TEST POSITIONS
// ============================================================================

fn position_opening() -> Board {
    Board::new()
}

/// Nine marks down, no runs, X to move
fn position_midgame() -> Board {
    use Mark::{O, X};
    Board::from_columns(&[vec![O, X], vec![X, O], vec![O], vec![X, X, O], vec![O], vec![], vec![]])
        .unwrap_or_default()
}

// ============================================================================
// BENCHMARK STRUCTURES
// ============================================================================

#[derive(Clone, Debug)]
struct BenchmarkResult {
    position: String,
    config: String,
    avg_search_ms: f64,
    iterations_per_second: f64,
    tree_nodes: usize,
}

impl BenchmarkResult {
    fn to_table_row(&self) -> String {
        format!(
            "| {:<10} | {:<22} | {:>9.2}ms | {:>10.0} | {:>8} |",
            self.position, self.config, self.avg_search_ms, self.iterations_per_second, self.tree_nodes
        )
    }
}

// ============================================================================
// BENCHMARK: Fixed iteration budgets
// ============================================================================

fn benchmark_iterations(board: &Board, to_move: Mark, position_name: &str) -> Vec<BenchmarkResult> {
    println!("\n=== ITERATION BENCHMARK: {} ===", position_name);
    let mut results = Vec::new();

    let budgets = [1_000u32, 5_000, 20_000];
    let modes = [SelectionMode::Deterministic, SelectionMode::Stochastic];

    for mode in modes {
        for iterations in budgets {
            print!("  {:?} {} iterations ... ", mode, iterations);
            let config = MctsConfig::timed(60.0)
                .with_mode(mode)
                .with_max_iterations(iterations)
                .with_seed(7);
            let repeats = 3;
            let mut total_ms = 0.0;
            let mut total_iterations = 0u32;
            let mut nodes = 0;

            for _ in 0..repeats {
                let start = Instant::now();
                let Ok(result) = run_search(*board, to_move, &config) else {
                    println!("position is finished");
                    return results;
                };
                total_ms += start.elapsed().as_secs_f64() * 1000.0;
                total_iterations += result.iterations;
                nodes = result.tree.len();
            }

            let avg_ms = total_ms / repeats as f64;
            results.push(BenchmarkResult {
                position: position_name.to_string(),
                config: format!("{:?} {}", mode, iterations),
                avg_search_ms: avg_ms,
                iterations_per_second: total_iterations as f64 / (total_ms / 1000.0),
                tree_nodes: nodes,
            });

            println!("{:.2}ms", avg_ms);
        }
    }

    results
}

// ============================================================================
// BENCHMARK: Wall-clock budgets
// ============================================================================

fn benchmark_time_budget(board: &Board, to_move: Mark) {
    println!("\n=== TIME BUDGET BENCHMARK ===");

    for seconds in [0.05, 0.2, 0.5] {
        let config = MctsConfig::timed(seconds).with_seed(11);
        match run_search(*board, to_move, &config) {
            Ok(result) => println!(
                "  {:.2}s budget: {} iterations, {:.1}ms elapsed, best column {}",
                seconds,
                result.iterations,
                result.elapsed.as_secs_f64() * 1000.0,
                result.best_move
            ),
            Err(err) => println!("  {:.2}s budget: {}", seconds, err),
        }
    }

    let grid = GridGame::new(9, 9).ok();
    if let Some(grid) = grid {
        let config = MctsConfig::timed(0.2).with_seed(11);
        if let Ok(result) = run_search(grid, Mark::O, &config) {
            println!(
                "  grid-movement 9x9, 0.20s: {} iterations ({:.0}/sec)",
                result.iterations,
                result.iterations_per_second()
            );
        }
    }
}

// ============================================================================
// BENCHMARK: Move Quality (Head-to-Head Games)
// ============================================================================

fn benchmark_move_quality(games: usize, iterations: u32) {
    println!("\n=== MOVE QUALITY: MCTS {} vs random ===", iterations);
    let (mut wins, mut draws, mut losses) = (0, 0, 0);

    for game_num in 0..games {
        let config = MctsConfig::timed(60.0)
            .with_max_iterations(iterations)
            .with_seed(game_num as u64 * 1000);
        let mut mcts = MctsPlayer::new(config);
        let mut random = RandomAgent::with_seed(game_num as u64);

        // MCTS alternates between moving first and second.
        let mcts_mark = if game_num % 2 == 0 { Mark::O } else { Mark::X };
        let record = if mcts_mark == Mark::O {
            play_game(Board::new(), Mark::O, [&mut mcts, &mut random], |_, _, _| {})
        } else {
            play_game(Board::new(), Mark::O, [&mut random, &mut mcts], |_, _, _| {})
        };

        let Ok(record) = record else {
            println!("  Game {}: rule violation", game_num + 1);
            continue;
        };
        match record.outcome {
            Outcome::Win(mark) if mark == mcts_mark => wins += 1,
            Outcome::Win(_) => losses += 1,
            Outcome::Draw => draws += 1,
        }
        println!(
            "  Game {}: MCTS as {}, {} ({} moves)",
            game_num + 1,
            mcts_mark,
            record.outcome,
            record.moves.len()
        );
    }

    println!("  MCTS W/D/L: {}/{}/{}", wins, draws, losses);
}

// ============================================================================
// MAIN
// ============================================================================

fn main() {
    println!("\n=== GRIDBOT: MCTS search throughput ===");

    let opening = position_opening();
    let midgame = position_midgame();

    let mut all_results = Vec::new();
    all_results.extend(benchmark_iterations(&opening, Mark::O, "Opening"));
    all_results.extend(benchmark_iterations(&midgame, Mark::X, "Midgame"));

    benchmark_time_budget(&opening, Mark::O);
    benchmark_move_quality(6, 2_000);

    println!("\n=== RESULTS TABLE ===");
    println!("| Position   | Config                 | Avg search  | Iter/sec   | Nodes    |");
    println!("|------------|------------------------|-------------|------------|----------|");
    for result in &all_results {
        println!("{}", result.to_table_row());
    }

    println!("\n• Descent mode overhead (Stochastic / Deterministic):");
    for position in ["Opening", "Midgame"] {
        let rate = |mode: &str| {
            all_results
                .iter()
                .find(|r| r.position == position && r.config == format!("{} 20000", mode))
                .map(|r| r.iterations_per_second)
        };
        if let (Some(det), Some(sto)) = (rate("Deterministic"), rate("Stochastic")) {
            println!("  {}: {:.2}x", position, det / sto);
        }
    }

    println!();
}
