//! Error type shared by the core crate

use crate::board::{MAX_LENGTH, MIN_LENGTH};
use crate::game::Move;

/// Caller-facing errors. None of these are retried or corrected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StonehengeError {
    #[error("side length {length} is out of range ({}..={})", MIN_LENGTH, MAX_LENGTH)]
    OutOfRangeLength { length: usize },

    #[error("{0} is not a legal move in this position")]
    InvalidMove(Move),

    #[error("unknown strategy: {0}")]
    UnknownStrategy(String),

    #[error("unknown player: {0}")]
    UnknownPlayer(String),
}
