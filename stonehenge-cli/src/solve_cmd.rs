//! Solve command - exact value and best move of a position
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_position(), analyse()
//! - Level 4: formatting utilities

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;

use stonehenge_core::{
    iterative_minimax, minimax_value, new_game, parse_move_token, recursive_minimax,
    rough_outcome, GameState, Move,
};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct SolveArgs {
    /// Board side length (1-5)
    #[arg(long, default_value = "2")]
    pub length: usize,

    /// Let p2 move first
    #[arg(long)]
    pub p2_starts: bool,

    /// Moves to play before solving, e.g. "A B"
    #[arg(long, value_delimiter = ' ', num_args = 0..)]
    pub after: Vec<String>,

    /// Skip the recursive search
    #[arg(long)]
    pub iterative_only: bool,
}

/// Analysis of one position
#[derive(Clone, Debug)]
struct Analysis {
    value: i32,
    rough: i32,
    recursive: Option<Move>,
    iterative: Option<Move>,
    nodes: usize,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run solve command
pub fn run(args: SolveArgs) -> Result<()> {
    let state = build_position(&args)?;
    print!("{}", state);

    tracing::info!(
        "Solving length {} with {} to move",
        state.length(),
        state.current_player()
    );

    let start = Instant::now();
    let analysis = analyse(&state, !args.iterative_only);
    tracing::info!("Search finished in {:?}", start.elapsed());

    println!("Value for {}: {}", state.current_player(), format_value(analysis.value));
    println!("Rough outcome: {}", format_value(analysis.rough));
    if !args.iterative_only {
        println!("Recursive minimax: {}", format_move(analysis.recursive));
    }
    println!(
        "Iterative minimax: {} ({} nodes)",
        format_move(analysis.iterative),
        analysis.nodes
    );
    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn build_position(args: &SolveArgs) -> Result<GameState> {
    let mut state = new_game(!args.p2_starts, args.length)?;
    for raw in args.after.iter().filter(|raw| !raw.is_empty()) {
        state = state
            .apply_move(parse_move_token(raw))
            .with_context(|| format!("cannot play {:?}", raw))?;
    }
    Ok(state)
}

fn analyse(state: &GameState, with_recursive: bool) -> Analysis {
    let outcome = iterative_minimax(state);
    let (recursive, value) = if with_recursive {
        let value = minimax_value(state);
        (recursive_minimax(state), value)
    } else {
        (None, outcome.value)
    };

    if with_recursive && recursive != outcome.best_move {
        tracing::warn!(
            "Recursive ({:?}) and iterative ({:?}) searches disagree",
            recursive,
            outcome.best_move
        );
    }

    Analysis {
        value,
        rough: rough_outcome(state),
        recursive,
        iterative: outcome.best_move,
        nodes: outcome.nodes,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn format_value(value: i32) -> &'static str {
    match value.signum() {
        1 => "win",
        -1 => "loss",
        _ => "draw",
    }
}

fn format_move(mv: Option<Move>) -> String {
    mv.map_or_else(|| "-".to_string(), |m| m.to_string())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn args(after: &[&str]) -> SolveArgs {
        SolveArgs {
            length: 2,
            p2_starts: false,
            after: after.iter().map(|s| s.to_string()).collect(),
            iterative_only: false,
        }
    }

    #[test]
    fn test_build_position() {
        let state = build_position(&args(&["A", "B"])).unwrap();
        assert_eq!(state.possible_moves().len(), 5);
        assert!(build_position(&args(&["A", "A"])).is_err());
        assert!(build_position(&args(&["a"])).is_err());
    }

    #[test]
    fn test_analyse() {
        let state = build_position(&args(&["A", "B"])).unwrap();
        let analysis = analyse(&state, true);
        assert_eq!(analysis.value, 1);
        assert_eq!(analysis.rough, 1);
        assert_eq!(analysis.recursive, Some(Move::new('C')));
        assert_eq!(analysis.iterative, Some(Move::new('C')));
        assert!(analysis.nodes > 5);
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(1), "win");
        assert_eq!(format_value(0), "draw");
        assert_eq!(format_value(-1), "loss");
        assert_eq!(format_move(None), "-");
    }
}
