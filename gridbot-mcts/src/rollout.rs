//! Rollout (simulation) strategies for MCTS
//!
//! A rollout plays moves from a node's position until the game is decided.
//! It works on a private copy, so the board stored in the tree is never
//! touched.
//!
//! ## Architecture
//! - Level 3: Single rollout implementation
//! - Level 4: Move selection policies

use gridbot_core::{Game, GameError, Mark, Outcome};
use rand::Rng;

// ============================================================================
// ROLLOUT RESULT
// ============================================================================

/// Result of a rollout simulation
#[derive(Clone, Debug, PartialEq)]
pub struct RolloutResult {
    /// How the simulated game ended
    pub outcome: Outcome,
    /// Number of moves played
    pub moves_played: u32,
}

// ============================================================================
// POLICIES (Level 4)
// ============================================================================

/// A rollout policy determines how to select moves during simulation
pub trait RolloutPolicy<G: Game> {
    /// Select a move from a non-empty list of legal moves
    fn select_move<R: Rng>(&self, state: &G, moves: &[G::Move], rng: &mut R) -> G::Move;
}

/// Uniform random policy - all moves equally likely
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformPolicy;

impl<G: Game> RolloutPolicy<G> for UniformPolicy {
    fn select_move<R: Rng>(&self, _state: &G, moves: &[G::Move], rng: &mut R) -> G::Move {
        moves[rng.gen_range(0..moves.len())]
    }
}

// ============================================================================
// CPU ROLLOUT (Level 3 - Single Rollout)
// ============================================================================

/// Random rollout from `state` with `to_move` acting first
pub fn cpu_rollout<G: Game, R: Rng>(state: &G, to_move: Mark, rng: &mut R) -> Result<RolloutResult, GameError> {
    rollout_with_policy(state, to_move, &UniformPolicy, rng)
}

/// Perform a rollout with a custom policy
pub fn rollout_with_policy<G, P, R>(
    state: &G,
    to_move: Mark,
    policy: &P,
    rng: &mut R,
) -> Result<RolloutResult, GameError>
where
    G: Game,
    P: RolloutPolicy<G>,
    R: Rng,
{
    let mut current = state.clone();
    let mut next = to_move;
    let mut moves_played = 0;

    // `legal_moves` is empty exactly when the position is decided.
    loop {
        let legal_moves = current.legal_moves();
        if legal_moves.is_empty() {
            break;
        }

        let mv = policy.select_move(&current, &legal_moves, rng);
        current.apply_move(next, mv)?;
        next = next.opponent();
        moves_played += 1;
    }

    Ok(RolloutResult {
        outcome: current.terminal_status().unwrap_or(Outcome::Draw),
        moves_played,
    })
}

// ============================================================================
// TESTS
// ============================================================================
