//! Game state, move application and ley-line capture

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::board::{Layout, DIRECTIONS};
use crate::error::StonehengeError;

// ============================================================================
// CORE TYPES
// ============================================================================

/// Player identity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    P1 = 0,
    P2 = 1,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::P1 => Player::P2,
            Player::P2 => Player::P1,
        }
    }

    /// Ownership glyph drawn on claimed cells and nodes
    pub fn symbol(self) -> char {
        match self {
            Player::P1 => '1',
            Player::P2 => '2',
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::P1 => write!(f, "p1"),
            Player::P2 => write!(f, "p2"),
        }
    }
}

impl FromStr for Player {
    type Err = StonehengeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "p1" => Ok(Player::P1),
            "p2" => Ok(Player::P2),
            other => Err(StonehengeError::UnknownPlayer(other.to_string())),
        }
    }
}

/// A move: the label of the cell to claim
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move(char);

impl Move {
    /// Token that never matches a legal move
    pub const INVALID: Move = Move('?');

    pub const fn new(label: char) -> Self {
        Move(label)
    }

    pub fn label(self) -> char {
        self.0
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Move::INVALID {
            write!(f, "Invalid Move")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

// ============================================================================
// GAME STATE
// ============================================================================

/// Game state (moves produce new states, the source state is never touched)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    /// Shared board geometry
    layout: Arc<Layout>,

    /// Owner per cell, indexed like `layout.cells()`
    cells: Vec<Option<Player>>,

    /// Owner per ley-line, `None` while the node is still a sentinel
    ley_lines: Vec<Option<Player>>,

    current_player: Player,

    /// Unclaimed cells in label order
    remaining: Vec<Move>,

    /// Ley-lines captured, indexed by player
    claimed: [usize; 2],

    over: bool,
}

impl GameState {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Fresh game: every cell unclaimed, every ley-line undecided
    pub fn new(length: usize, first: Player) -> Result<Self, StonehengeError> {
        let layout = Layout::generate(length)?;
        Ok(Self::from_layout(Arc::new(layout), first))
    }

    /// Fresh game over an already generated layout
    pub fn from_layout(layout: Arc<Layout>, first: Player) -> Self {
        let remaining = layout.cells().iter().map(|c| Move::new(c.label)).collect();
        Self {
            cells: vec![None; layout.cells().len()],
            ley_lines: vec![None; layout.ley_lines().len()],
            current_player: first,
            remaining,
            claimed: [0, 0],
            over: false,
            layout,
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn current_player(&self) -> Player {
        self.current_player
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn length(&self) -> usize {
        self.layout.length()
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    /// Moves available to the current player, in label order; empty once over
    pub fn possible_moves(&self) -> &[Move] {
        if self.over {
            &[]
        } else {
            &self.remaining
        }
    }

    pub fn is_valid_move(&self, mv: Move) -> bool {
        self.possible_moves().contains(&mv)
    }

    /// Ley-lines captured by `player`
    pub fn claimed(&self, player: Player) -> usize {
        self.claimed[player.index()]
    }

    pub fn total_ley_lines(&self) -> usize {
        self.ley_lines.len()
    }

    pub fn ley_line_owner(&self, index: usize) -> Option<Player> {
        self.ley_lines.get(index).copied().flatten()
    }

    /// Owner of the cell labelled `label`, `None` if unclaimed or not on the board
    pub fn cell_owner(&self, label: char) -> Option<Player> {
        let index = self.layout.cell_index(label)?;
        self.cells[index]
    }

    /// The winner of a finished game.
    ///
    /// The turn flips before termination is checked, so the player to move
    /// in a finished game is always the loser.
    pub fn winner(&self) -> Option<Player> {
        self.over.then(|| self.current_player.opponent())
    }

    // ========================================================================
    // APPLY MOVE
    // ========================================================================

    /// Apply move, return new state
    pub fn apply_move(&self, mv: Move) -> Result<Self, StonehengeError> {
        if !self.is_valid_move(mv) {
            return Err(StonehengeError::InvalidMove(mv));
        }
        let cell = self
            .layout
            .cell_index(mv.label())
            .ok_or(StonehengeError::InvalidMove(mv))?;

        let mut new_state = self.clone();
        new_state.apply_move_internal(cell, mv);
        Ok(new_state)
    }

    fn apply_move_internal(&mut self, cell: usize, mv: Move) {
        let mover = self.current_player;
        self.cells[cell] = Some(mover);
        self.remaining.retain(|&m| m != mv);

        let lines = self.layout.cells()[cell].ley_lines;
        for direction in DIRECTIONS {
            self.settle_ley_line(lines[direction.index()]);
        }

        self.current_player = mover.opponent();
        self.check_over();
    }

    /// Capture an undecided ley-line for the mover if they hold at least
    /// half of its cells. Decided lines are never revisited.
    fn settle_ley_line(&mut self, line: usize) {
        if self.ley_lines[line].is_some() {
            return;
        }

        let mover = self.current_player;
        let members = &self.layout.ley_lines()[line].members;
        let owned = members
            .iter()
            .filter(|&&member| self.cells[member] == Some(mover))
            .count();

        // Exactly half is enough, and only the mover can capture on a tie
        if 2 * owned >= members.len() {
            self.ley_lines[line] = Some(mover);
            self.claimed[mover.index()] += 1;
            tracing::trace!(line, player = %mover, "ley-line captured");
        }
    }

    fn check_over(&mut self) {
        let total = self.total_ley_lines();
        if self.claimed.iter().any(|&count| 2 * count >= total) {
            self.over = true;
        }
    }

    // ========================================================================
    // RENDERING
    // ========================================================================

    /// Glyph grid with ownership drawn over cells and captured nodes
    pub fn grid(&self) -> Vec<Vec<char>> {
        let mut grid = self.layout.grid().to_vec();
        for (cell, owner) in self.layout.cells().iter().zip(&self.cells) {
            if let Some(player) = owner {
                grid[cell.pos.row][cell.pos.col] = player.symbol();
            }
        }
        for (line, owner) in self.layout.ley_lines().iter().zip(&self.ley_lines) {
            if let Some(player) = owner {
                grid[line.node.row][line.node.col] = player.symbol();
            }
        }
        grid
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.grid() {
            let line: String = row.into_iter().collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
