//! Move-choosing strategies
//!
//! Every search here is a pure function of a `GameState`: successors are
//! fresh states, so branches never share mutable data.
//!
//! - `rough_outcome`: two-ply estimate
//! - `recursive_minimax`: exact negamax by recursion
//! - `iterative_minimax`: the same search over an explicit stack and tree

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::error::StonehengeError;
use crate::game::{GameState, Move, Player};
use crate::search_tree::{NodeId, SearchTree};
use crate::session::{terminal_value, DRAW, LOSE, WIN};

// ============================================================================
// STRATEGY TRAIT
// ============================================================================

/// Something that picks moves
pub trait Strategy {
    fn name(&self) -> &str;

    /// Choose a move for the player to move; `None` once the game is over
    fn choose_move(&mut self, state: &GameState) -> Option<Move>;
}

/// Uniformly random legal moves
pub struct RandomStrategy {
    rng: ChaCha8Rng,
}

impl RandomStrategy {
    pub fn new() -> Self {
        Self::with_seed(42)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for RandomStrategy {
    fn name(&self) -> &str {
        "random"
    }

    fn choose_move(&mut self, state: &GameState) -> Option<Move> {
        state.possible_moves().choose(&mut self.rng).copied()
    }
}

/// Picks the move that leaves the opponent the worst rough outcome
#[derive(Clone, Copy, Debug, Default)]
pub struct RoughOutcomeStrategy;

impl Strategy for RoughOutcomeStrategy {
    fn name(&self) -> &str {
        "rough"
    }

    fn choose_move(&mut self, state: &GameState) -> Option<Move> {
        rough_outcome_move(state)
    }
}

/// Exact negamax, recursive form
#[derive(Clone, Copy, Debug, Default)]
pub struct RecursiveMinimax;

impl Strategy for RecursiveMinimax {
    fn name(&self) -> &str {
        "minimax"
    }

    fn choose_move(&mut self, state: &GameState) -> Option<Move> {
        recursive_minimax(state)
    }
}

/// Exact negamax, explicit-stack form
#[derive(Clone, Copy, Debug, Default)]
pub struct IterativeMinimax;

impl Strategy for IterativeMinimax {
    fn name(&self) -> &str {
        "iterative"
    }

    fn choose_move(&mut self, state: &GameState) -> Option<Move> {
        iterative_minimax(state).best_move
    }
}

// ============================================================================
// SUCCESSORS
// ============================================================================

/// Apply a move taken from `possible_moves`.
///
/// Search only ever applies generated moves, so a failure here is a bug.
fn successor(state: &GameState, mv: Move) -> GameState {
    state
        .apply_move(mv)
        .expect("search applied a move outside possible_moves")
}

// ============================================================================
// ROUGH OUTCOME
// ============================================================================

/// Two-ply estimate of the best outcome the player to move can guarantee.
///
/// - finished game: `LOSE`
/// - some move ends the game: `WIN`
/// - some move leaves the opponent at least one reply that does not end
///   the game: `DRAW`
/// - otherwise every move hands the opponent a win: `LOSE`
pub fn rough_outcome(state: &GameState) -> i32 {
    if state.is_over() {
        return LOSE;
    }

    let successors: Vec<GameState> = state
        .possible_moves()
        .iter()
        .map(|&mv| successor(state, mv))
        .collect();

    if successors.iter().any(GameState::is_over) {
        return WIN;
    }

    let has_safe_move = successors.iter().any(|next| {
        next.possible_moves()
            .iter()
            .any(|&reply| !successor(next, reply).is_over())
    });

    if has_safe_move {
        DRAW
    } else {
        LOSE
    }
}

/// First move whose successor has the lowest rough outcome for the opponent
pub fn rough_outcome_move(state: &GameState) -> Option<Move> {
    let mut best: Option<(Move, i32)> = None;
    for &mv in state.possible_moves() {
        let score = -rough_outcome(&successor(state, mv));
        if best.map_or(true, |(_, b)| score > b) {
            best = Some((mv, score));
        }
    }
    best.map(|(mv, _)| mv)
}

// ============================================================================
// RECURSIVE MINIMAX
// ============================================================================

/// Exact game value for the player to move
pub fn minimax_value(state: &GameState) -> i32 {
    let moves = state.possible_moves();
    if moves.is_empty() {
        return terminal_value(state);
    }

    let mut best = LOSE;
    for &mv in moves {
        best = best.max(-minimax_value(&successor(state, mv)));
        // Nothing beats a win
        if best == WIN {
            break;
        }
    }
    best
}

/// First move, in possible-move order, that achieves the minimax value
pub fn recursive_minimax(state: &GameState) -> Option<Move> {
    let mut best: Option<(Move, i32)> = None;
    for &mv in state.possible_moves() {
        let score = -minimax_value(&successor(state, mv));
        if best.map_or(true, |(_, b)| score > b) {
            best = Some((mv, score));
        }
        if score == WIN {
            break;
        }
    }

    if let Some((mv, value)) = best {
        tracing::debug!(%mv, value, "recursive minimax");
    }
    best.map(|(mv, _)| mv)
}

// ============================================================================
// ITERATIVE MINIMAX
// ============================================================================

/// Result of an iterative minimax search
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchOutcome {
    pub best_move: Option<Move>,
    /// Exact value of the root for the player to move
    pub value: i32,
    /// Nodes created in the search tree
    pub nodes: usize,
}

/// Exact negamax without recursion.
///
/// Pops a node; terminal nodes are scored directly, unexpanded nodes are
/// pushed back followed by one child per move, and a node seen the second
/// time takes the best negated score of its children.
pub fn iterative_minimax(state: &GameState) -> SearchOutcome {
    let mut tree = SearchTree::new(state.clone());
    let mut stack = vec![NodeId::ROOT];

    while let Some(id) = stack.pop() {
        match tree.get(id).state() {
            Some(node_state) if node_state.possible_moves().is_empty() => {
                let score = terminal_value(node_state);
                tree.set_score(id, score);
            }
            Some(node_state) => {
                let successors: Vec<(Move, GameState)> = node_state
                    .possible_moves()
                    .iter()
                    .map(|&mv| (mv, successor(node_state, mv)))
                    .collect();
                stack.push(id);
                stack.extend(tree.expand(id, successors));
            }
            None => {
                let score = tree
                    .score_from_children(id)
                    .expect("children are scored before their parent is revisited");
                tree.set_score(id, score);
            }
        }
    }

    let value = tree.get(tree.root()).score().unwrap_or(DRAW);
    let best_move = tree.best_move();
    tracing::debug!(nodes = tree.len(), value, ?best_move, "iterative minimax");

    SearchOutcome {
        best_move,
        value,
        nodes: tree.len(),
    }
}

// ============================================================================
// GAME DRIVER
// ============================================================================

/// Play a full game between two strategies.
///
/// Stops when the game is over or a strategy has no move. A strategy that
/// returns an illegal move ends the game with an error.
pub fn play_game(
    initial: GameState,
    p1: &mut dyn Strategy,
    p2: &mut dyn Strategy,
) -> Result<(GameState, Vec<Move>), StonehengeError> {
    let mut state = initial;
    let mut history = Vec::new();

    while !state.is_over() {
        let strategy: &mut dyn Strategy = match state.current_player() {
            Player::P1 => &mut *p1,
            Player::P2 => &mut *p2,
        };
        let Some(mv) = strategy.choose_move(&state) else {
            break;
        };
        tracing::debug!(player = %state.current_player(), strategy = strategy.name(), %mv, "move");
        state = state.apply_move(mv)?;
        history.push(mv);
    }

    Ok((state, history))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn play(length: usize, labels: &str) -> GameState {
        let mut state = GameState::new(length, Player::P1).unwrap();
        for label in labels.chars() {
            state = state.apply_move(Move::new(label)).unwrap();
        }
        state
    }

    #[test]
    fn test_rough_outcome_terminal() {
        assert_eq!(rough_outcome(&play(1, "A")), LOSE);
    }

    #[test]
    fn test_rough_outcome_immediate_win() {
        // Length 1: every opening move wins
        assert_eq!(rough_outcome(&play(1, "")), WIN);
        // P1 wins at once with G
        assert_eq!(rough_outcome(&play(2, "AB")), WIN);
        assert_eq!(rough_outcome(&play(2, "AD")), WIN);
    }

    #[test]
    fn test_rough_outcome_undecided() {
        assert_eq!(rough_outcome(&play(2, "")), DRAW);
        assert_eq!(rough_outcome(&play(2, "A")), DRAW);
        assert_eq!(rough_outcome(&play(2, "AG")), DRAW);
    }

    #[test]
    fn test_rough_outcome_move() {
        assert_eq!(rough_outcome_move(&play(2, "AB")), Some(Move::new('G')));
        assert_eq!(rough_outcome_move(&play(2, "A")), Some(Move::new('E')));
        assert_eq!(rough_outcome_move(&play(2, "")), Some(Move::new('A')));
        assert_eq!(rough_outcome_move(&play(1, "A")), None);
    }

    #[test]
    fn test_minimax_value() {
        assert_eq!(minimax_value(&play(1, "")), WIN);
        assert_eq!(minimax_value(&play(1, "B")), LOSE);
        assert_eq!(minimax_value(&play(2, "")), WIN);
        assert_eq!(minimax_value(&play(2, "A")), LOSE);
        assert_eq!(minimax_value(&play(2, "AB")), WIN);
    }

    #[test]
    fn test_recursive_minimax_choices() {
        assert_eq!(recursive_minimax(&play(1, "")), Some(Move::new('A')));
        assert_eq!(recursive_minimax(&play(2, "")), Some(Move::new('A')));
        assert_eq!(recursive_minimax(&play(2, "A")), Some(Move::new('B')));
        // C and G both win; C comes first
        assert_eq!(recursive_minimax(&play(2, "AB")), Some(Move::new('C')));
        assert_eq!(recursive_minimax(&play(2, "ABG")), None);
    }

    #[test]
    fn test_iterative_matches_recursive() {
        for labels in ["", "A", "AB", "AD", "AG", "ABC", "ABCD"] {
            let state = play(2, labels);
            let outcome = iterative_minimax(&state);
            assert_eq!(outcome.best_move, recursive_minimax(&state), "after {labels:?}");
            assert_eq!(outcome.value, minimax_value(&state), "after {labels:?}");
        }
    }

    #[test]
    fn test_iterative_length_one_exhaustive() {
        let outcome = iterative_minimax(&play(1, ""));
        assert_eq!(outcome.best_move, Some(Move::new('A')));
        assert_eq!(outcome.value, WIN);
        // Root plus three terminal children
        assert_eq!(outcome.nodes, 4);
    }

    #[test]
    fn test_iterative_on_finished_game() {
        let outcome = iterative_minimax(&play(1, "C"));
        assert_eq!(outcome.best_move, None);
        assert_eq!(outcome.value, LOSE);
        assert_eq!(outcome.nodes, 1);
    }

    #[test]
    fn test_search_leaves_state_untouched() {
        let state = play(2, "A");
        let before = state.clone();
        let _ = iterative_minimax(&state);
        let _ = recursive_minimax(&state);
        let _ = rough_outcome(&state);
        assert_eq!(state, before);
    }

    #[test]
    fn test_random_strategy_deterministic() {
        let state = play(3, "");
        let mut a = RandomStrategy::with_seed(7);
        let mut b = RandomStrategy::with_seed(7);
        for _ in 0..5 {
            let mv = a.choose_move(&state);
            assert_eq!(mv, b.choose_move(&state));
            assert!(state.is_valid_move(mv.unwrap()));
        }
    }

    #[test]
    fn test_play_game_minimax_vs_rough() {
        let initial = play(2, "");
        let (final_state, history) =
            play_game(initial, &mut IterativeMinimax, &mut RoughOutcomeStrategy).unwrap();

        assert!(final_state.is_over());
        assert!(history.len() <= 7);
        // The opening position is a win for P1 and minimax never lets it go
        assert_eq!(final_state.winner(), Some(Player::P1));
    }
}
