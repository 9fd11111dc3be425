//! Gridbot MCTS - Monte Carlo Tree Search for the bundled grid games
//!
//! This crate provides a time-bounded, single-threaded MCTS:
//! - Tree policy (UCT), deterministic or weighted-random
//! - Uniform random rollouts on private copies
//! - Backpropagation with half-point credit for draws
//!
//! Every search starts from a fresh tree; nothing is kept between moves.

pub mod rollout;
pub mod search;
pub mod tree;

use std::time::Duration;

use gridbot_core::{Agent, Board, Game, Mark};
use tracing::warn;

pub use rollout::{cpu_rollout, rollout_with_policy, RolloutPolicy, RolloutResult, UniformPolicy};
#[cfg(feature = "parallel")]
pub use search::independent_searches;
pub use search::{run_search, MoveStatistics, SearchError, SearchResult};
pub use tree::{uct_score, MctsNode, MctsTree, NodeId, NodeStats, SelectionMode};

/// MCTS configuration
#[derive(Clone, Debug)]
pub struct MctsConfig {
    /// Wall-clock budget per search, checked between iterations
    pub time_limit: Duration,
    /// Child selection during descent
    pub mode: SelectionMode,
    /// Optional cap on iterations (reproducible runs, benchmarks)
    pub max_iterations: Option<u32>,
    /// Random seed (None = fresh random seed per search)
    pub seed: Option<u64>,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            time_limit: Duration::from_secs(1),
            mode: SelectionMode::Deterministic,
            max_iterations: None,
            seed: None,
        }
    }
}

impl MctsConfig {
    /// Config with a budget in (fractional) seconds; negative or NaN means zero
    pub fn timed(seconds: f64) -> Self {
        Self {
            time_limit: seconds_to_duration(seconds),
            ..Default::default()
        }
    }

    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = time_limit;
        self
    }

    pub fn with_mode(mut self, mode: SelectionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_max_iterations(mut self, iterations: u32) -> Self {
        self.max_iterations = Some(iterations);
        self
    }

    /// Set random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

fn seconds_to_duration(seconds: f64) -> Duration {
    Duration::try_from_secs_f64(seconds.max(0.0)).unwrap_or(Duration::MAX)
}

/// MCTS player
pub struct MctsPlayer {
    config: MctsConfig,
    /// Searches run so far, offsets a fixed seed so moves differ
    searches: u64,
}

impl MctsPlayer {
    pub fn new(config: MctsConfig) -> Self {
        Self { config, searches: 0 }
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    /// Full search with statistics
    pub fn search<G: Game>(&self, game: &G, to_move: Mark) -> Result<SearchResult<G>, SearchError> {
        run_search(game.clone(), to_move, &self.config)
    }

    /// Get best move using MCTS
    pub fn best_move<G: Game>(&self, game: &G, to_move: Mark) -> Result<G::Move, SearchError> {
        self.search(game, to_move).map(|result| result.best_move)
    }

    fn next_config(&mut self) -> MctsConfig {
        let mut config = self.config.clone();
        if let Some(seed) = config.seed {
            config.seed = Some(seed.wrapping_add(self.searches));
        }
        self.searches += 1;
        config
    }
}

impl<G: Game> Agent<G> for MctsPlayer {
    fn name(&self) -> &str {
        "mcts"
    }

    fn next_move(&mut self, game: &G, mark: Mark) -> Option<G::Move> {
        let config = self.next_config();
        match run_search(game.clone(), mark, &config) {
            Ok(result) => Some(result.best_move),
            Err(err) => {
                warn!(%err, %mark, "mcts found no move");
                None
            }
        }
    }
}

/// Pick a column for `to_move` on a four-in-a-row board.
///
/// `stochastic` switches descent from arg-max UCT to UCT-weighted sampling.
pub fn choose_column(board: &Board, to_move: Mark, time_limit_secs: f64, stochastic: bool) -> Result<usize, SearchError> {
    let mode = if stochastic {
        SelectionMode::Stochastic
    } else {
        SelectionMode::Deterministic
    };
    let config = MctsConfig::timed(time_limit_secs).with_mode(mode);

    MctsPlayer::new(config).best_move(board, to_move)
}
