//! Configuration types for matches between strategies

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::board::{MAX_LENGTH, MIN_LENGTH};
use crate::error::StonehengeError;
use crate::game::{GameState, Player};
use crate::strategy::{
    IterativeMinimax, RandomStrategy, RecursiveMinimax, RoughOutcomeStrategy, Strategy,
};

/// Which strategy plays a side
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// Moves typed by a person (needs a front end)
    Interactive,
    Random,
    #[serde(rename = "rough")]
    RoughOutcome,
    #[serde(rename = "minimax")]
    RecursiveMinimax,
    #[serde(rename = "iterative")]
    IterativeMinimax,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 5] = [
        StrategyKind::Interactive,
        StrategyKind::Random,
        StrategyKind::RoughOutcome,
        StrategyKind::RecursiveMinimax,
        StrategyKind::IterativeMinimax,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StrategyKind::Interactive => "interactive",
            StrategyKind::Random => "random",
            StrategyKind::RoughOutcome => "rough",
            StrategyKind::RecursiveMinimax => "minimax",
            StrategyKind::IterativeMinimax => "iterative",
        }
    }

    /// Build the strategy. `None` for `Interactive`, which the caller supplies.
    pub fn build(self, seed: u64) -> Option<Box<dyn Strategy>> {
        match self {
            StrategyKind::Interactive => None,
            StrategyKind::Random => Some(Box::new(RandomStrategy::with_seed(seed))),
            StrategyKind::RoughOutcome => Some(Box::new(RoughOutcomeStrategy)),
            StrategyKind::RecursiveMinimax => Some(Box::new(RecursiveMinimax)),
            StrategyKind::IterativeMinimax => Some(Box::new(IterativeMinimax)),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrategyKind {
    type Err = StonehengeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StrategyKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| StonehengeError::UnknownStrategy(s.to_string()))
    }
}

/// Match configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Board side length
    pub length: usize,
    /// Whether P1 moves first in the first game
    pub p1_starts: bool,
    pub p1: StrategyKind,
    pub p2: StrategyKind,
    /// Number of games; the first player alternates between games
    pub games: usize,
    /// Seed for random strategies (None = fixed default)
    pub seed: Option<u64>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            length: 2,
            p1_starts: true,
            p1: StrategyKind::IterativeMinimax,
            p2: StrategyKind::RoughOutcome,
            games: 1,
            seed: None,
        }
    }
}

impl MatchConfig {
    pub fn with_length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    pub fn with_strategies(mut self, p1: StrategyKind, p2: StrategyKind) -> Self {
        self.p1 = p1;
        self.p2 = p2;
        self
    }

    pub fn with_games(mut self, games: usize) -> Self {
        self.games = games;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn p2_starts(mut self) -> Self {
        self.p1_starts = false;
        self
    }

    pub fn validate(&self) -> Result<(), StonehengeError> {
        if !(MIN_LENGTH..=MAX_LENGTH).contains(&self.length) {
            return Err(StonehengeError::OutOfRangeLength {
                length: self.length,
            });
        }
        Ok(())
    }

    /// Who moves first in game `game_index` (0-based)
    pub fn first_player(&self, game_index: usize) -> Player {
        let p1_first = self.p1_starts == (game_index % 2 == 0);
        if p1_first {
            Player::P1
        } else {
            Player::P2
        }
    }

    /// Opening state for game `game_index`
    pub fn initial_state(&self, game_index: usize) -> Result<GameState, StonehengeError> {
        GameState::new(self.length, self.first_player(game_index))
    }
}

// ============================================================================
// TESTS
// ============================================================================
