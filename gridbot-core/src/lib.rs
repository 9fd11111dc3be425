//! Gridbot Core - Game rules for the bundled grid games
//!
//! This crate provides everything the search engine plays on:
//! - Four-in-a-row board (7 columns x 6 rows, drop-and-stack)
//! - Win/draw detection across all four axes
//! - The `Game` capability trait shared by every variant
//! - Grid-movement variant (two heads leaving walls behind them)
//! - Baseline agents and a local game loop

pub mod agent;
pub mod board;
pub mod game;
pub mod grid;

// Re-exports for convenient access
pub use agent::{play_game, Agent, GameRecord, RandomAgent};
pub use board::{Board, Mark, CONNECT, HEIGHT, WIDTH};
pub use game::{Game, GameError, Outcome, Variant};
pub use grid::{Cell, Direction, GridGame, DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH};
