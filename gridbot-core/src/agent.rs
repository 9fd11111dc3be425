//! Move-choosing agents and a local game loop

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::board::Mark;
use crate::game::{Game, GameError, Outcome};

/// Anything that can pick a move for a mark
pub trait Agent<G: Game> {
    fn name(&self) -> &str;

    /// Choose a move for `mark`; `None` means the agent gives up
    fn next_move(&mut self, game: &G, mark: Mark) -> Option<G::Move>;
}

/// Uniformly random legal moves
pub struct RandomAgent {
    rng: ChaCha8Rng,
}

impl RandomAgent {
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: Game> Agent<G> for RandomAgent {
    fn name(&self) -> &str {
        "random"
    }

    fn next_move(&mut self, game: &G, _mark: Mark) -> Option<G::Move> {
        game.legal_moves().choose(&mut self.rng).copied()
    }
}

/// Finished local game
#[derive(Clone, Debug)]
pub struct GameRecord<G: Game> {
    pub final_state: G,
    /// Moves in play order
    pub moves: Vec<(Mark, G::Move)>,
    pub outcome: Outcome,
    /// Set when a mark gave up instead of moving
    pub resigned: Option<Mark>,
}

/// Play `initial` to the end, `first` to act, agents indexed by `Mark::index`.
///
/// Games that record whose turn it is start from that mark instead of `first`.
///
/// `on_move` sees every position after a move is applied.
pub fn play_game<G, F>(
    initial: G,
    first: Mark,
    mut agents: [&mut dyn Agent<G>; 2],
    mut on_move: F,
) -> Result<GameRecord<G>, GameError>
where
    G: Game,
    F: FnMut(&G, Mark, G::Move),
{
    // A state that tracks its own turn overrides `first`.
    let mut to_move = initial.to_move().unwrap_or(first);
    let mut state = initial;
    let mut moves = Vec::new();

    loop {
        if let Some(outcome) = state.terminal_status() {
            return Ok(GameRecord {
                final_state: state,
                moves,
                outcome,
                resigned: None,
            });
        }

        let Some(mv) = agents[to_move.index()].next_move(&state, to_move) else {
            return Ok(GameRecord {
                final_state: state,
                moves,
                outcome: Outcome::Win(to_move.opponent()),
                resigned: Some(to_move),
            });
        };

        state.apply_move(to_move, mv)?;
        on_move(&state, to_move, mv);
        moves.push((to_move, mv));
        to_move = to_move.opponent();
    }
}
