//! Grid-movement variant
//!
//! Two heads share a bounded grid. Marks alternate; on its turn a mark steps
//! its head one cell left, right, up or down, and every cell a head has
//! occupied stays blocked for the rest of the game. A mark with nowhere to go
//! on its turn loses; if neither mark can move the game is drawn.

use std::fmt;
use std::str::FromStr;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::board::Mark;
use crate::game::{Game, GameError, Outcome, Variant};

/// Default grid size
pub const DEFAULT_GRID_WIDTH: i32 = 8;
pub const DEFAULT_GRID_HEIGHT: i32 = 8;

/// Smallest grid that leaves both heads room to move
const MIN_GRID_SIDE: i32 = 3;

/// Grid cell, y grows upward
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn step(self, direction: Direction) -> Cell {
        let (dx, dy) = direction.delta();
        Cell::new(self.x + dx, self.y + dy)
    }
}

/// Head movement
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Up => (0, 1),
            Direction::Down => (0, -1),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Direction {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "l" | "left" => Ok(Direction::Left),
            "r" | "right" => Ok(Direction::Right),
            "u" | "up" => Ok(Direction::Up),
            "d" | "down" => Ok(Direction::Down),
            _ => Err(GameError::UnknownDirection(s.to_string())),
        }
    }
}

/// Grid-movement game state (clone to branch)
#[derive(Clone, Debug)]
pub struct GridGame {
    width: i32,
    height: i32,
    /// Current head of each mark, indexed by `Mark::index`
    heads: [Cell; 2],
    /// Every occupied cell and the mark that left it there
    trails: FxHashMap<Cell, Mark>,
    /// Mark to act
    next: Mark,
}

impl GridGame {
    /// Heads start on opposite edges of the middle row, O to move
    pub fn new(width: i32, height: i32) -> Result<Self, GameError> {
        if width < MIN_GRID_SIDE || height < MIN_GRID_SIDE {
            return Err(GameError::GridTooSmall { width, height });
        }

        let row = height / 2;
        let heads = [Cell::new(0, row), Cell::new(width - 1, row)];
        let mut trails = FxHashMap::default();
        trails.insert(heads[Mark::O.index()], Mark::O);
        trails.insert(heads[Mark::X.index()], Mark::X);

        Ok(Self {
            width,
            height,
            heads,
            trails,
            next: Mark::O,
        })
    }

    /// Same game with a different mark to act
    pub fn with_next(mut self, mark: Mark) -> Self {
        self.next = mark;
        self
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn next_mark(&self) -> Mark {
        self.next
    }

    pub fn head(&self, mark: Mark) -> Cell {
        self.heads[mark.index()]
    }

    pub fn occupant(&self, cell: Cell) -> Option<Mark> {
        self.trails.get(&cell).copied()
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        (0..self.width).contains(&cell.x) && (0..self.height).contains(&cell.y)
    }

    /// Directions `mark` could take from its head, ignoring turn order
    pub fn moves_for(&self, mark: Mark) -> Vec<Direction> {
        let head = self.head(mark);
        Direction::ALL
            .into_iter()
            .filter(|&dir| {
                let target = head.step(dir);
                self.in_bounds(target) && !self.trails.contains_key(&target)
            })
            .collect()
    }
}

impl Game for GridGame {
    type Move = Direction;

    fn variant(&self) -> Variant {
        Variant::GridMovement
    }

    fn to_move(&self) -> Option<Mark> {
        Some(self.next)
    }

    fn legal_moves(&self) -> Vec<Direction> {
        // The mark to act is never stuck in an undecided position.
        self.moves_for(self.next)
    }

    fn apply_move(&mut self, mark: Mark, direction: Direction) -> Result<(), GameError> {
        if mark != self.next {
            return Err(GameError::OutOfTurn {
                expected: self.next,
                got: mark,
            });
        }

        let target = self.head(mark).step(direction);
        if !self.in_bounds(target) {
            return Err(GameError::OutOfBounds {
                x: target.x,
                y: target.y,
            });
        }
        if self.trails.contains_key(&target) {
            return Err(GameError::CellOccupied {
                x: target.x,
                y: target.y,
            });
        }

        self.trails.insert(target, mark);
        self.heads[mark.index()] = target;
        self.next = mark.opponent();
        Ok(())
    }

    fn terminal_status(&self) -> Option<Outcome> {
        if !self.moves_for(self.next).is_empty() {
            return None;
        }
        let other = self.next.opponent();
        if self.moves_for(other).is_empty() {
            Some(Outcome::Draw)
        } else {
            Some(Outcome::Win(other))
        }
    }
}

impl fmt::Display for GridGame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in (0..self.height).rev() {
            for x in 0..self.width {
                let cell = Cell::new(x, y);
                let symbol = match self.occupant(cell) {
                    Some(mark) if self.head(mark) == cell => mark.symbol(),
                    Some(mark) => mark.symbol().to_ascii_lowercase(),
                    None => '.',
                };
                write!(f, "{}", symbol)?;
            }
            if y > 0 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
