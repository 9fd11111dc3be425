//! Drop-grid board geometry and win detection
//!
//! The board is stored column-major with row 0 at the bottom. Columns only
//! ever grow upward, one mark per drop:
//! ```text
//! Row 5: [ ][ ][ ][ ][ ][ ][ ]  <- Top
//! Row 4: [ ][ ][ ][ ][ ][ ][ ]
//! Row 3: [ ][ ][ ][ ][ ][ ][ ]
//! Row 2: [ ][ ][ ][ ][ ][ ][ ]
//! Row 1: [ ][ ][ ][ ][ ][ ][ ]
//! Row 0: [ ][ ][ ][ ][ ][ ][ ]  <- Bottom
//!  Col    0  1  2  3  4  5  6
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::game::{Game, GameError, Outcome, Variant};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Number of columns
pub const WIDTH: usize = 7;

/// Maximum marks per column
pub const HEIGHT: usize = 6;

/// Run length needed to win
pub const CONNECT: usize = 4;

/// Axis vectors (dcol, drow) scanned for runs.
///
/// Every cell is tried as the start of a run along every axis, so each window
/// of `CONNECT` cells that fits on the board is examined exactly once.
pub const AXES: [(isize, isize); 4] = [
    (0, 1),  // vertical
    (1, 0),  // horizontal
    (1, 1),  // ascending diagonal
    (1, -1), // descending diagonal
];

// ============================================================================
// MARK
// ============================================================================

/// One of the two symmetric player tokens
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    O,
    X,
}

impl Mark {
    pub fn opponent(self) -> Self {
        match self {
            Mark::O => Mark::X,
            Mark::X => Mark::O,
        }
    }

    /// Stable slot for per-mark arrays
    pub fn index(self) -> usize {
        match self {
            Mark::O => 0,
            Mark::X => 1,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Mark::O => 'O',
            Mark::X => 'X',
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Mark {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "O" | "o" => Ok(Mark::O),
            "X" | "x" => Ok(Mark::X),
            other => Err(GameError::UnknownMark(other.to_string())),
        }
    }
}

// ============================================================================
// BOARD
// ============================================================================

/// Four-in-a-row board (copy to mutate)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Mark>>", into = "Vec<Vec<Mark>>")]
pub struct Board {
    /// cells[col][row], row 0 at the bottom
    cells: [[Option<Mark>; HEIGHT]; WIDTH],
    /// Number of marks in each column
    heights: [u8; WIDTH],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Empty board
    pub fn new() -> Self {
        Self {
            cells: [[None; HEIGHT]; WIDTH],
            heights: [0; WIDTH],
        }
    }

    /// Build a board from a column list, bottom mark first in each column
    pub fn from_columns(columns: &[Vec<Mark>]) -> Result<Self, GameError> {
        if columns.len() != WIDTH {
            return Err(GameError::WrongWidth {
                expected: WIDTH,
                got: columns.len(),
            });
        }

        let mut board = Self::new();
        for (col, marks) in columns.iter().enumerate() {
            if marks.len() > HEIGHT {
                return Err(GameError::ColumnOverflow {
                    column: col,
                    len: marks.len(),
                    height: HEIGHT,
                });
            }
            for &mark in marks {
                board.drop(mark, col)?;
            }
        }

        Ok(board)
    }

    /// Column list, bottom mark first (inverse of `from_columns`)
    pub fn columns(&self) -> Vec<Vec<Mark>> {
        (0..WIDTH)
            .map(|col| self.cells[col][..self.height(col)].iter().flatten().copied().collect())
            .collect()
    }

    /// Number of marks in a column
    pub fn height(&self, column: usize) -> usize {
        self.heights[column] as usize
    }

    /// Mark at (column, row), row 0 at the bottom
    pub fn get(&self, column: usize, row: usize) -> Option<Mark> {
        self.cells.get(column)?.get(row).copied().flatten()
    }

    /// Total marks on the board
    pub fn mark_count(&self) -> usize {
        self.heights.iter().map(|&h| h as usize).sum()
    }

    /// Every column is at maximum height
    pub fn is_full(&self) -> bool {
        self.heights.iter().all(|&h| h as usize == HEIGHT)
    }

    /// Append `mark` on top of `column`.
    ///
    /// A rejected drop leaves the board unchanged.
    pub fn drop(&mut self, mark: Mark, column: usize) -> Result<(), GameError> {
        if column >= WIDTH {
            return Err(GameError::ColumnOutOfRange {
                column,
                width: WIDTH,
            });
        }
        let row = self.height(column);
        if row >= HEIGHT {
            return Err(GameError::ColumnFull { column });
        }

        self.cells[column][row] = Some(mark);
        self.heights[column] += 1;
        Ok(())
    }

    /// Copying variant of `drop`
    pub fn with_drop(&self, mark: Mark, column: usize) -> Result<Self, GameError> {
        let mut next = *self;
        next.drop(mark, column)?;
        Ok(next)
    }

    /// Columns that can still take a mark; empty once the game is decided
    pub fn legal_columns(&self) -> Vec<usize> {
        if self.winner().is_some() {
            return Vec::new();
        }
        self.open_columns()
    }

    fn open_columns(&self) -> Vec<usize> {
        (0..WIDTH).filter(|&col| self.height(col) < HEIGHT).collect()
    }

    /// Scan all four axes for a run of `CONNECT`; `Draw` when full with no run
    pub fn winner(&self) -> Option<Outcome> {
        for col in 0..WIDTH {
            for row in 0..self.height(col) {
                let Some(mark) = self.cells[col][row] else {
                    continue;
                };
                for &(dc, dr) in &AXES {
                    if self.has_run(mark, col as isize, row as isize, dc, dr) {
                        return Some(Outcome::Win(mark));
                    }
                }
            }
        }

        if self.is_full() {
            Some(Outcome::Draw)
        } else {
            None
        }
    }

    /// Does a run of `mark` of length `CONNECT` start at (col, row) along (dc, dr)?
    fn has_run(&self, mark: Mark, col: isize, row: isize, dc: isize, dr: isize) -> bool {
        (1..CONNECT as isize).all(|i| self.cell_at(col + dc * i, row + dr * i) == Some(mark))
    }

    fn cell_at(&self, col: isize, row: isize) -> Option<Mark> {
        if col < 0 || row < 0 {
            return None;
        }
        self.get(col as usize, row as usize)
    }
}

impl TryFrom<Vec<Vec<Mark>>> for Board {
    type Error = GameError;

    fn try_from(columns: Vec<Vec<Mark>>) -> Result<Self, Self::Error> {
        Board::from_columns(&columns)
    }
}

impl From<Board> for Vec<Vec<Mark>> {
    fn from(board: Board) -> Self {
        board.columns()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..HEIGHT).rev() {
            write!(f, "|")?;
            for col in 0..WIDTH {
                match self.cells[col][row] {
                    Some(mark) => write!(f, " {}", mark)?,
                    None => write!(f, " .")?,
                }
            }
            writeln!(f, " |")?;
        }
        writeln!(f, "+{}+", "-".repeat(WIDTH * 2 + 1))?;
        write!(f, " ")?;
        for col in 0..WIDTH {
            write!(f, " {}", col)?;
        }
        Ok(())
    }
}

impl Game for Board {
    type Move = usize;

    fn variant(&self) -> Variant {
        Variant::FourInARow
    }

    fn legal_moves(&self) -> Vec<usize> {
        self.legal_columns()
    }

    fn apply_move(&mut self, mark: Mark, column: usize) -> Result<(), GameError> {
        self.drop(mark, column)
    }

    fn terminal_status(&self) -> Option<Outcome> {
        self.winner()
    }
}
