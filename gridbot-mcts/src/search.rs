//! MCTS Search Loop
//!
//! Implements the core MCTS algorithm under a wall-clock budget:
//! 1. Selection - Use UCT to traverse tree
//! 2. Expansion - Add every child of the selected leaf
//! 3. Simulation - Rollout to terminal state
//! 4. Backpropagation - Update statistics
//!
//! The deadline is polled between iterations only; a single iteration may run
//! past it.
//!
//! ## Architecture
//! - Level 2: Search loop coordination
//! - Level 3: Individual MCTS phases
//! - Level 4: Statistics collection

use std::time::{Duration, Instant};

use gridbot_core::{Game, GameError, Mark, Outcome};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace, warn};

use crate::rollout::cpu_rollout;
use crate::tree::{MctsTree, NodeId, SelectionMode};
use crate::MctsConfig;

/// Iterations between progress traces
const TRACE_EVERY: u32 = 4096;

// ============================================================================
// ERRORS
// ============================================================================

/// Why a search produced no move
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// The position handed to the search is already decided
    #[error("position is already finished ({0})")]
    AlreadyTerminal(Outcome),

    /// A rule violation inside the search (a bug in move generation)
    #[error(transparent)]
    Game(#[from] GameError),
}

// ============================================================================
// SEARCH RESULT
// ============================================================================

/// Result of MCTS search
#[derive(Debug)]
pub struct SearchResult<G: Game> {
    /// The final tree after search
    pub tree: MctsTree<G>,
    /// Most visited root move
    pub best_move: G::Move,
    /// Completed select/expand/rollout/backpropagate cycles
    pub iterations: u32,
    /// Wall-clock time spent searching
    pub elapsed: Duration,
    /// Statistics for each root move, in move-generation order
    pub move_stats: Vec<MoveStatistics<G::Move>>,
}

/// Statistics for a single move at root
#[derive(Clone, Debug)]
pub struct MoveStatistics<M> {
    pub mv: M,
    pub visits: u32,
    pub win_rate: f64,
    pub uct: f64,
}

impl<G: Game> SearchResult<G> {
    /// Get move with highest win rate
    pub fn highest_winrate_move(&self) -> Option<G::Move> {
        self.move_stats
            .iter()
            .max_by(|a, b| a.win_rate.total_cmp(&b.win_rate))
            .map(|s| s.mv)
    }

    /// Get all moves sorted by visits (stable, so ties keep root order)
    pub fn moves_by_visits(&self) -> Vec<(G::Move, u32)> {
        let mut moves: Vec<_> = self.move_stats.iter().map(|s| (s.mv, s.visits)).collect();
        moves.sort_by(|a, b| b.1.cmp(&a.1));
        moves
    }

    pub fn iterations_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.iterations as f64 / secs
        } else {
            0.0
        }
    }
}

// ============================================================================
// SEARCH LOOP (Level 2 - Main Coordination)
// ============================================================================

/// Run MCTS for `to_move` acting in `root_state`.
///
/// Finished positions are reported as `SearchError::AlreadyTerminal` before
/// any iteration runs. Otherwise at least one iteration is performed, so a
/// move is always available even with a zero budget.
pub fn run_search<G: Game>(root_state: G, to_move: Mark, config: &MctsConfig) -> Result<SearchResult<G>, SearchError> {
    if let Some(outcome) = root_state.terminal_status() {
        warn!(variant = %root_state.variant(), %outcome, "search requested on a finished position");
        return Err(SearchError::AlreadyTerminal(outcome));
    }

    let to_move = match root_state.to_move() {
        Some(recorded) if recorded != to_move => {
            debug!(requested = %to_move, %recorded, "searching for the mark the state records");
            recorded
        }
        _ => to_move,
    };

    let seed = config.seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut tree = MctsTree::new(root_state, to_move);

    let start = Instant::now();
    // An unrepresentable deadline means no time limit.
    let deadline = start.checked_add(config.time_limit);
    let mut iterations = 0u32;

    loop {
        run_single_iteration(&mut tree, config.mode, &mut rng)?;
        iterations += 1;

        if iterations % TRACE_EVERY == 0 {
            trace!(iterations, nodes = tree.len(), "search progress");
        }
        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            break;
        }
        if config.max_iterations.is_some_and(|max| iterations >= max) {
            break;
        }
    }

    let elapsed = start.elapsed();
    let best_move = tree
        .best_move()
        .expect("a non-terminal root is expanded on the first iteration");
    let move_stats = collect_move_statistics(&tree);

    debug!(
        iterations,
        nodes = tree.len(),
        elapsed_ms = elapsed.as_millis() as u64,
        best = %best_move,
        mode = ?config.mode,
        "search finished"
    );

    Ok(SearchResult {
        tree,
        best_move,
        iterations,
        elapsed,
        move_stats,
    })
}

// ============================================================================
// MCTS PHASES (Level 3)
// ============================================================================

/// Single MCTS iteration
///
/// Level 3 function - implements one complete MCTS cycle.
fn run_single_iteration<G: Game, R: Rng>(
    tree: &mut MctsTree<G>,
    mode: SelectionMode,
    rng: &mut R,
) -> Result<(), GameError> {
    // Phase 1: Selection
    let leaf_id = tree.select_leaf(mode, rng);

    // Phase 2: Expansion (terminal leaves roll out from themselves)
    let simulation_node = tree.expand(leaf_id, rng)?.unwrap_or(leaf_id);

    // Phase 3: Simulation (rollout)
    let outcome = simulate_node(tree, simulation_node, rng)?;

    // Phase 4: Backpropagation
    tree.backpropagate(simulation_node, outcome);

    Ok(())
}

/// Roll out from a node, the opponent of its mover acting first
fn simulate_node<G: Game, R: Rng>(tree: &MctsTree<G>, node_id: NodeId, rng: &mut R) -> Result<Outcome, GameError> {
    let node = tree.get(node_id);
    Ok(cpu_rollout(&node.state, node.to_move(), rng)?.outcome)
}

// ============================================================================
// PARALLEL SEARCHES
// ============================================================================

/// Run `count` fully independent searches on the same position.
///
/// Each search owns its tree and random source; nothing is shared. Seeds are
/// derived from `config.seed` (or one random base) plus the search index.
#[cfg(feature = "parallel")]
pub fn independent_searches<G>(
    root_state: &G,
    to_move: Mark,
    config: &MctsConfig,
    count: usize,
) -> Vec<Result<SearchResult<G>, SearchError>>
where
    G: Game + Send + Sync,
    G::Move: Send,
{
    use rayon::prelude::*;

    let base = config.seed.unwrap_or_else(rand::random);

    (0..count)
        .into_par_iter()
        .map(|i| {
            let config = config.clone().with_seed(base.wrapping_add(i as u64));
            run_search(root_state.clone(), to_move, &config)
        })
        .collect()
}

// ============================================================================
// STATISTICS COLLECTION (Level 4 - Utilities)
// ============================================================================

/// Collect statistics for root moves
fn collect_move_statistics<G: Game>(tree: &MctsTree<G>) -> Vec<MoveStatistics<G::Move>> {
    let root = tree.get(tree.root());

    root.children
        .iter()
        .filter_map(|&child_id| {
            let child = tree.get(child_id);
            let mv = child.incoming_move?;
            Some(MoveStatistics {
                mv,
                visits: child.stats.visits,
                win_rate: child.stats.win_rate(),
                uct: tree.uct(child_id),
            })
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use gridbot_core::{Board, GridGame, WIDTH};

    fn board_from(columns: [&str; WIDTH]) -> Board {
        let columns: Vec<Vec<Mark>> = columns
            .iter()
            .map(|col| col.chars().map(|c| c.to_string().parse().unwrap()).collect())
            .collect();
        Board::from_columns(&columns).unwrap()
    }

    fn fixed(iterations: u32) -> MctsConfig {
        MctsConfig::timed(60.0)
            .with_max_iterations(iterations)
            .with_seed(7)
    }

    #[test]
    fn test_run_search_basic() {
        let result = run_search(Board::new(), Mark::O, &fixed(300)).unwrap();

        assert_eq!(result.iterations, 300);
        assert!(result.best_move < WIDTH);
        assert_eq!(result.move_stats.len(), WIDTH);
        assert_eq!(result.tree.total_simulations(), 300);
    }

    #[test]
    fn test_root_child_visits_sum_to_iterations() {
        let result = run_search(Board::new(), Mark::X, &fixed(500)).unwrap();
        let total: u32 = result.move_stats.iter().map(|s| s.visits).sum();
        assert_eq!(total, result.iterations);
    }

    #[test]
    fn test_every_root_child_visited_before_repeats() {
        let result = run_search(Board::new(), Mark::O, &fixed(WIDTH as u32)).unwrap();
        assert!(result.move_stats.iter().all(|s| s.visits == 1));
    }

    #[test]
    fn test_already_terminal() {
        let won = board_from(["OOOO", "XXX", "", "", "", "", ""]);
        assert_eq!(
            run_search(won, Mark::X, &fixed(10)).unwrap_err(),
            SearchError::AlreadyTerminal(Outcome::Win(Mark::O))
        );

        let drawn = board_from([
            "OOXXOO", "XXOOXX", "OOXXOO", "XXOOXX", "OOXXOO", "XXOOXX", "OOXXOO",
        ]);
        assert_eq!(
            run_search(drawn, Mark::O, &fixed(10)).unwrap_err(),
            SearchError::AlreadyTerminal(Outcome::Draw)
        );
    }

    #[test]
    fn test_completes_vertical_four() {
        let board = board_from(["X", "X", "", "OOO", "", "", "X"]);
        let result = run_search(board, Mark::O, &fixed(3_000)).unwrap();
        assert_eq!(result.best_move, 3);
    }

    #[test]
    fn test_blocks_opponent_four() {
        // X threatens column 5; O must block.
        let board = board_from(["O", "", "O", "", "", "XXX", "O"]);
        let result = run_search(board, Mark::O, &fixed(5_000)).unwrap();
        assert_eq!(result.best_move, 5);
    }

    #[test]
    fn test_stochastic_mode_completes_vertical_four() {
        let board = board_from(["X", "X", "", "OOO", "", "", "X"]);
        let config = MctsConfig::timed(0.5)
            .with_mode(SelectionMode::Stochastic)
            .with_seed(7);
        let result = run_search(board, Mark::O, &config).unwrap();
        assert_eq!(result.best_move, 3);
    }

    #[test]
    fn test_same_seed_same_tree() {
        let a = run_search(Board::new(), Mark::O, &fixed(400)).unwrap();
        let b = run_search(Board::new(), Mark::O, &fixed(400)).unwrap();

        assert_eq!(a.best_move, b.best_move);
        assert_eq!(a.tree.len(), b.tree.len());
        assert_eq!(a.moves_by_visits(), b.moves_by_visits());
    }

    #[test]
    fn test_time_budget_stops_search() {
        let config = MctsConfig::timed(0.05).with_seed(3);
        let start = Instant::now();
        let result = run_search(Board::new(), Mark::O, &config).unwrap();

        assert!(result.iterations >= 1);
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn test_zero_budget_still_moves() {
        let config = MctsConfig::timed(0.0).with_seed(3);
        let result = run_search(Board::new(), Mark::O, &config).unwrap();
        assert_eq!(result.iterations, 1);
        assert!(result.best_move < WIDTH);
    }

    #[test]
    fn test_moves_by_visits_sorted() {
        let result = run_search(Board::new(), Mark::O, &fixed(200)).unwrap();
        let sorted = result.moves_by_visits();
        assert!(sorted.windows(2).all(|w| w[0].1 >= w[1].1));
        assert_eq!(sorted[0].0, result.best_move);
    }

    #[test]
    fn test_grid_variant_search() {
        let game = GridGame::new(5, 5).unwrap();
        let result = run_search(game, Mark::O, &fixed(500)).unwrap();
        assert!(result.move_stats.len() <= 3);
        assert!(result.highest_winrate_move().is_some());
    }

    #[test]
    fn test_grid_search_follows_recorded_turn() {
        // The grid records O to move; a request for X searches for O.
        let game = GridGame::new(5, 5).unwrap();
        let o_moves = game.moves_for(Mark::O);
        let result = run_search(game, Mark::X, &fixed(200)).unwrap();
        assert_eq!(result.tree.get(result.tree.root()).to_move(), Mark::O);
        assert!(o_moves.contains(&result.best_move));

        // Boards record no turn, so the requested mark stands.
        let result = run_search(Board::new(), Mark::X, &fixed(50)).unwrap();
        assert_eq!(result.tree.get(result.tree.root()).to_move(), Mark::X);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_independent_searches() {
        let results = independent_searches(&Board::new(), Mark::O, &fixed(100), 4);
        assert_eq!(results.len(), 4);
        for result in results {
            assert_eq!(result.unwrap().iterations, 100);
        }
    }
}
