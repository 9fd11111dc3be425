//! MCTS Tree structure and node management
//!
//! Uses arena allocation for efficient tree operations. Children are owned
//! through the arena; each node keeps only its parent's index for the
//! backpropagation walk.
//!
//! ## Architecture
//! - Level 2: Tree operations (select_leaf, expand, backpropagate)
//! - Level 3: UCT calculation, child selection
//! - Level 4: Statistics, accessors

use gridbot_core::{Game, GameError, Mark, Outcome};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Factor under the square root of the UCT exploration term
pub const EXPLORATION: f64 = 2.0;

// ============================================================================
// TYPES
// ============================================================================

/// Node identifier (index into arena)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);
}

/// How a child is picked during descent
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SelectionMode {
    /// Highest UCT score, first child on ties
    #[default]
    Deterministic,
    /// Random child weighted by UCT score
    Stochastic,
}

/// Statistics for a tree node
#[derive(Clone, Debug, Default)]
pub struct NodeStats {
    /// Number of rollouts that passed through this node
    pub visits: u32,
    /// Win credit from the perspective of the mark that moved TO this node
    pub wins: f64,
}

impl NodeStats {
    /// Win rate from this node's perspective
    pub fn win_rate(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.wins / self.visits as f64
        }
    }
}

/// A node in the MCTS tree
#[derive(Clone, Debug)]
pub struct MctsNode<G: Game> {
    /// Game state at this node
    pub state: G,
    /// Mark that just moved to reach this node (the node's colour)
    pub mover: Mark,
    /// Move that led to this node (None for root)
    pub incoming_move: Option<G::Move>,
    /// Parent node (None for root)
    pub parent: Option<NodeId>,
    /// Children in move-generation order, empty until expanded
    pub children: Vec<NodeId>,
    /// Visit/win statistics
    pub stats: NodeStats,
}

impl<G: Game> MctsNode<G> {
    pub fn new(state: G, mover: Mark, incoming_move: Option<G::Move>, parent: Option<NodeId>) -> Self {
        Self {
            state,
            mover,
            incoming_move,
            parent,
            children: Vec::new(),
            stats: NodeStats::default(),
        }
    }

    /// Unexpanded or terminal
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Mark to act in this node's position
    pub fn to_move(&self) -> Mark {
        self.mover.opponent()
    }
}

// ============================================================================
// UCT (Level 3)
// ============================================================================

/// UCT score of a child.
///
/// Unvisited children score `f64::MAX` so they are always tried first.
pub fn uct_score(parent_visits: u32, visits: u32, wins: f64) -> f64 {
    if visits == 0 {
        return f64::MAX;
    }

    let visits = visits as f64;
    let exploitation = wins / visits;
    let exploration = (EXPLORATION * (parent_visits as f64).ln() / visits).sqrt();

    exploitation + exploration
}

/// Credit a node receives for a finished rollout
pub fn reward(outcome: Outcome, mover: Mark) -> f64 {
    match outcome {
        Outcome::Win(winner) if winner == mover => 1.0,
        Outcome::Win(_) => 0.0,
        Outcome::Draw => 0.5,
    }
}

// ============================================================================
// MCTS TREE (Level 2 - Tree Operations)
// ============================================================================

/// MCTS search tree with arena allocation
#[derive(Debug)]
pub struct MctsTree<G: Game> {
    /// Arena storage for nodes
    nodes: Vec<MctsNode<G>>,
}

impl<G: Game> MctsTree<G> {
    /// Create a new tree for `to_move` acting in `root_state`
    pub fn new(root_state: G, to_move: Mark) -> Self {
        let root = MctsNode::new(root_state, to_move.opponent(), None, None);
        Self { nodes: vec![root] }
    }

    /// Get the root node id
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a reference to a node
    pub fn get(&self, id: NodeId) -> &MctsNode<G> {
        &self.nodes[id.0]
    }

    /// Get a mutable reference to a node
    pub fn get_mut(&mut self, id: NodeId) -> &mut MctsNode<G> {
        &mut self.nodes[id.0]
    }

    /// Get the number of nodes in the tree
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Is the tree empty?
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of edges between `id` and the root
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.get(id).parent;
        while let Some(parent) = current {
            depth += 1;
            current = self.get(parent).parent;
        }
        depth
    }

    // ========================================================================
    // Level 2: Tree Operations
    // ========================================================================

    /// Descend from the root until reaching a node without children
    pub fn select_leaf<R: Rng>(&self, mode: SelectionMode, rng: &mut R) -> NodeId {
        let mut current = self.root();

        while let Some(child) = self.select_child(current, mode, rng) {
            current = child;
        }

        current
    }

    /// Expand a childless node with one child per legal move.
    ///
    /// Returns a uniformly chosen new child to continue from, or None if the
    /// position is terminal (the node then stays childless for good).
    pub fn expand<R: Rng>(&mut self, node_id: NodeId, rng: &mut R) -> Result<Option<NodeId>, GameError> {
        debug_assert!(self.get(node_id).is_leaf(), "node expanded twice");

        let node = self.get(node_id);
        let moves = node.state.legal_moves();
        if moves.is_empty() {
            return Ok(None);
        }

        let mover = node.to_move();
        let parent_state = node.state.clone();
        let mut children = Vec::with_capacity(moves.len());

        for mv in moves {
            let mut child_state = parent_state.clone();
            child_state.apply_move(mover, mv)?;

            let child_id = NodeId(self.nodes.len());
            self.nodes
                .push(MctsNode::new(child_state, mover, Some(mv), Some(node_id)));
            children.push(child_id);
        }

        let chosen = children[rng.gen_range(0..children.len())];
        self.get_mut(node_id).children = children;

        Ok(Some(chosen))
    }

    /// Backpropagate a rollout outcome from `leaf_id` up to the root
    pub fn backpropagate(&mut self, leaf_id: NodeId, outcome: Outcome) {
        let mut current = Some(leaf_id);

        while let Some(node_id) = current {
            let node = self.get_mut(node_id);
            node.stats.visits += 1;
            node.stats.wins += reward(outcome, node.mover);
            current = node.parent;
        }
    }

    // ========================================================================
    // Level 3: Selection Helpers
    // ========================================================================

    /// UCT score of a node relative to its parent
    pub fn uct(&self, node_id: NodeId) -> f64 {
        let node = self.get(node_id);
        let parent_visits = node
            .parent
            .map(|p| self.get(p).stats.visits)
            .unwrap_or(node.stats.visits);

        uct_score(parent_visits, node.stats.visits, node.stats.wins)
    }

    /// Pick the child to descend into, None for a leaf
    pub fn select_child<R: Rng>(&self, node_id: NodeId, mode: SelectionMode, rng: &mut R) -> Option<NodeId> {
        let children = &self.get(node_id).children;
        if children.is_empty() {
            return None;
        }

        let scores: Vec<f64> = children.iter().map(|&child| self.uct(child)).collect();

        let picked = match mode {
            SelectionMode::Deterministic => first_max_index(&scores),
            SelectionMode::Stochastic => self.sample_index(children, &scores, rng),
        };

        Some(children[picked])
    }

    /// Weighted draw over UCT scores.
    ///
    /// Unvisited children carry the `f64::MAX` sentinel as their weight, which
    /// swamps every finite score; a float sampler cannot sum several of them,
    /// so that limit is taken directly: any unvisited child forces a uniform
    /// draw among the unvisited ones.
    fn sample_index<R: Rng>(&self, children: &[NodeId], scores: &[f64], rng: &mut R) -> usize {
        let unvisited: Vec<usize> = children
            .iter()
            .enumerate()
            .filter(|(_, &child)| self.get(child).stats.visits == 0)
            .map(|(i, _)| i)
            .collect();
        if !unvisited.is_empty() {
            return unvisited[rng.gen_range(0..unvisited.len())];
        }

        match WeightedIndex::new(scores) {
            Ok(dist) => dist.sample(rng),
            // All-zero weights: nothing to prefer
            Err(_) => rng.gen_range(0..scores.len()),
        }
    }

    // ========================================================================
    // Level 3: Best Move Selection
    // ========================================================================

    /// Most visited child, first one on ties
    pub fn best_child(&self, node_id: NodeId) -> Option<NodeId> {
        let mut best: Option<NodeId> = None;

        for &child in &self.get(node_id).children {
            let better = match best {
                None => true,
                Some(current) => self.get(child).stats.visits > self.get(current).stats.visits,
            };
            if better {
                best = Some(child);
            }
        }

        best
    }

    /// Get the best move from root (most visits)
    pub fn best_move(&self) -> Option<G::Move> {
        self.best_child(self.root())
            .and_then(|id| self.get(id).incoming_move)
    }

    /// Get total simulations run (root visits)
    pub fn total_simulations(&self) -> u32 {
        self.get(self.root()).stats.visits
    }
}

/// Index of the first maximum
fn first_max_index(scores: &[f64]) -> usize {
    let mut best = 0;
    for (i, &score) in scores.iter().enumerate().skip(1) {
        if score > scores[best] {
            best = i;
        }
    }
    best
}

// ============================================================================
// TESTS
// ============================================================================
