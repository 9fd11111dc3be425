//! Game capability interface shared by every variant
//!
//! The search engine only ever talks to a game through [`Game`]: list the
//! legal moves, apply one for a given mark, and ask whether the position is
//! decided. Both bundled variants implement it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::board::Mark;

// ============================================================================
// OUTCOME
// ============================================================================

/// Result of a decided position
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Win(Mark),
    Draw,
}

impl Outcome {
    /// Winning mark (None for a draw)
    pub fn winner(self) -> Option<Mark> {
        match self {
            Outcome::Win(mark) => Some(mark),
            Outcome::Draw => None,
        }
    }

    pub fn is_draw(self) -> bool {
        self == Outcome::Draw
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Win(mark) => write!(f, "{} wins", mark),
            Outcome::Draw => write!(f, "draw"),
        }
    }
}

// ============================================================================
// ERRORS
// ============================================================================

/// Rule violations and malformed positions
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("column {column} is full")]
    ColumnFull { column: usize },

    #[error("column {column} is out of range (board has {width} columns)")]
    ColumnOutOfRange { column: usize, width: usize },

    #[error("expected {expected} columns, got {got}")]
    WrongWidth { expected: usize, got: usize },

    #[error("column {column} holds {len} marks but the board is only {height} high")]
    ColumnOverflow {
        column: usize,
        len: usize,
        height: usize,
    },

    #[error("grid {width}x{height} is too small")]
    GridTooSmall { width: i32, height: i32 },

    #[error("move to ({x}, {y}) leaves the grid")]
    OutOfBounds { x: i32, y: i32 },

    #[error("cell ({x}, {y}) is already taken")]
    CellOccupied { x: i32, y: i32 },

    #[error("{got} moved but it is {expected}'s turn")]
    OutOfTurn { expected: Mark, got: Mark },

    #[error("unknown mark {0:?}, expected O or X")]
    UnknownMark(String),

    #[error("unknown direction {0:?}, expected L, R, U or D")]
    UnknownDirection(String),

    #[error("unknown game variant {0:?}")]
    UnknownVariant(String),
}

// ============================================================================
// VARIANTS
// ============================================================================

/// Closed set of bundled games
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    FourInARow,
    GridMovement,
}

impl Variant {
    pub const ALL: [Variant; 2] = [Variant::FourInARow, Variant::GridMovement];

    pub fn name(self) -> &'static str {
        match self {
            Variant::FourInARow => "four-in-a-row",
            Variant::GridMovement => "grid-movement",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variant {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Variant::ALL
            .into_iter()
            .find(|v| v.name() == s)
            .ok_or_else(|| GameError::UnknownVariant(s.to_string()))
    }
}

// ============================================================================
// CAPABILITY TRAIT
// ============================================================================

/// What the search engine needs from a game
pub trait Game: Clone + fmt::Debug {
    type Move: Copy + Eq + fmt::Debug + fmt::Display;

    /// Which bundled game this is
    fn variant(&self) -> Variant;

    /// Moves available to the player to act; empty once the position is decided
    fn legal_moves(&self) -> Vec<Self::Move>;

    /// Apply `mv` for `mark` in place
    fn apply_move(&mut self, mark: Mark, mv: Self::Move) -> Result<(), GameError>;

    /// `None` while the game continues
    fn terminal_status(&self) -> Option<Outcome>;

    /// Mark whose turn the state itself records; `None` when any mark may move
    fn to_move(&self) -> Option<Mark> {
        None
    }

    fn is_terminal(&self) -> bool {
        self.terminal_status().is_some()
    }
}
