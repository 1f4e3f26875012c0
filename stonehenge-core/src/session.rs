//! Game session: owns the live state and answers who won
//!
//! Search never touches a session. Strategies take a `GameState` by
//! reference and the caller feeds the chosen move back through
//! [`StonehengeGame::play`].

use crate::error::StonehengeError;
use crate::game::{GameState, Move, Player};

/// Score of a won position for the player to move
pub const WIN: i32 = 1;
/// Score of an undecided or drawn position
pub const DRAW: i32 = 0;
/// Score of a lost position for the player to move
pub const LOSE: i32 = -1;

const INSTRUCTIONS: &str = "Players take turns claiming cells. \
Whoever takes at least half of the cells in a line captures that ley-line. \
Whoever captures at least half of the ley-lines wins.";

/// Start a game on a board of side `length`
pub fn new_game(is_p1_turn: bool, length: usize) -> Result<GameState, StonehengeError> {
    let first = if is_p1_turn { Player::P1 } else { Player::P2 };
    GameState::new(length, first)
}

/// Turn raw input into a move token.
///
/// Anything that is not a single upper-case letter becomes [`Move::INVALID`].
pub fn parse_move_token(raw: &str) -> Move {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_alphabetic() && c.is_uppercase() => Move::new(c),
        _ => Move::INVALID,
    }
}

/// Score of `state` for its player to move, once no moves remain.
///
/// A finished game is always lost by the player to move; a board with no
/// moves and no winner scores as a draw.
pub fn terminal_value(state: &GameState) -> i32 {
    match state.winner() {
        Some(winner) if winner == state.current_player() => WIN,
        Some(_) => LOSE,
        None => DRAW,
    }
}

/// A game in progress
#[derive(Clone, Debug)]
pub struct StonehengeGame {
    current_state: GameState,
}

impl StonehengeGame {
    pub fn new(is_p1_turn: bool, length: usize) -> Result<Self, StonehengeError> {
        Ok(Self {
            current_state: new_game(is_p1_turn, length)?,
        })
    }

    pub fn from_state(state: GameState) -> Self {
        Self {
            current_state: state,
        }
    }

    pub fn current_state(&self) -> &GameState {
        &self.current_state
    }

    pub fn instructions(&self) -> &'static str {
        INSTRUCTIONS
    }

    pub fn is_over(&self, state: &GameState) -> bool {
        state.is_over()
    }

    /// Whether `player` has won the live game
    pub fn is_winner(&self, player: Player) -> bool {
        self.current_state.winner() == Some(player)
    }

    pub fn str_to_move(&self, raw: &str) -> Move {
        parse_move_token(raw)
    }

    /// Replace the live state with the result of `mv`.
    ///
    /// On error the live state is left unchanged.
    pub fn play(&mut self, mv: Move) -> Result<&GameState, StonehengeError> {
        self.current_state = self.current_state.apply_move(mv)?;
        Ok(&self.current_state)
    }
}

// ============================================================================
// TESTS
// ============================================================================
