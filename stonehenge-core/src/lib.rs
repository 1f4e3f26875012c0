//! Stonehenge Core - Game engine and search
//!
//! This crate provides the core logic for Stonehenge:
//! - Board generation (glyph grid, cells, ley-lines)
//! - Game state, move application and ley-line capture
//! - Game session wrapper and move-token parsing
//! - Search strategies: rough outcome, recursive and iterative minimax

pub mod board;
pub mod config;
pub mod error;
pub mod game;
pub mod search_tree;
pub mod session;
pub mod strategy;

// Re-exports for convenient access
pub use board::{cell_count, ley_line_count, Direction, Layout, MAX_LENGTH, MIN_LENGTH};
pub use config::{MatchConfig, StrategyKind};
pub use error::StonehengeError;
pub use game::{GameState, Move, Player};
pub use session::{new_game, parse_move_token, terminal_value, StonehengeGame, DRAW, LOSE, WIN};
pub use strategy::{
    iterative_minimax, minimax_value, play_game, recursive_minimax, rough_outcome,
    rough_outcome_move, IterativeMinimax, RandomStrategy, RecursiveMinimax,
    RoughOutcomeStrategy, SearchOutcome, Strategy,
};
