//! Play command - a person against a strategy
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_players(), play_session(), announce_result()
//! - Level 3: InteractiveStrategy (reads moves from stdin)
//! - Level 4: prompt formatting

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};
use clap::Args;

use stonehenge_core::{
    parse_move_token, GameState, Move, Player, StonehengeGame, Strategy, StrategyKind,
};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct PlayArgs {
    /// Board side length (1-5)
    #[arg(long, default_value = "2")]
    pub length: usize,

    /// Let p2 move first
    #[arg(long)]
    pub p2_starts: bool,

    /// Which side you play (p1 or p2)
    #[arg(long, default_value = "p1")]
    pub side: Player,

    /// Strategy for the computer side
    #[arg(long, default_value = "iterative")]
    pub opponent: StrategyKind,

    /// Seed for the random strategy
    #[arg(long, default_value = "42")]
    pub seed: u64,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
///
/// 1. Set up the session and both players
/// 2. Alternate moves until the game ends
/// 3. Announce the winner
pub fn run(args: PlayArgs) -> Result<()> {
    let mut game = StonehengeGame::new(!args.p2_starts, args.length)?;
    let mut human = InteractiveStrategy::new(io::stdin().lock(), io::stdout());
    let Some(mut computer) = args.opponent.build(args.seed) else {
        bail!("the opponent must be a computer strategy");
    };

    println!("{}", game.instructions());
    tracing::info!(
        "You are {} against {} on a board of length {}",
        args.side,
        computer.name(),
        args.length
    );

    play_session(&mut game, args.side, &mut human, computer.as_mut())?;
    announce_result(&game, args.side);
    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Alternate moves on the live session until it ends or input runs out
fn play_session(
    game: &mut StonehengeGame,
    human_side: Player,
    human: &mut dyn Strategy,
    computer: &mut dyn Strategy,
) -> Result<()> {
    while !game.is_over(game.current_state()) {
        let state = game.current_state();
        print!("{}", state);
        let mover = state.current_player();

        let strategy: &mut dyn Strategy = if mover == human_side {
            &mut *human
        } else {
            &mut *computer
        };
        let Some(mv) = strategy.choose_move(state) else {
            tracing::info!("No move from {}, stopping", strategy.name());
            return Ok(());
        };

        if mover != human_side {
            println!("{} plays {}", mover, mv);
        }
        game.play(mv)
            .with_context(|| format!("{} chose an illegal move", strategy.name()))?;
    }

    print!("{}", game.current_state());
    Ok(())
}

fn announce_result(game: &StonehengeGame, human_side: Player) {
    if game.is_winner(human_side) {
        println!("You win!");
    } else if game.is_winner(human_side.opponent()) {
        println!("{} wins.", human_side.opponent());
    } else {
        println!("Game abandoned.");
    }
}

// ============================================================================
// LEVEL 3 - INTERACTIVE STRATEGY
// ============================================================================

/// Reads moves line by line, re-prompting until a legal one arrives
pub struct InteractiveStrategy<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> InteractiveStrategy<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn prompt(&mut self, state: &GameState) -> io::Result<()> {
        write!(self.output, "{}", prompt_text(state))?;
        self.output.flush()
    }
}

impl<R: BufRead, W: Write> Strategy for InteractiveStrategy<R, W> {
    fn name(&self) -> &str {
        "interactive"
    }

    fn choose_move(&mut self, state: &GameState) -> Option<Move> {
        if state.is_over() {
            return None;
        }

        loop {
            self.prompt(state).ok()?;

            let mut line = String::new();
            if self.input.read_line(&mut line).ok()? == 0 {
                return None;
            }

            let mv = parse_move_token(line.trim());
            if state.is_valid_move(mv) {
                return Some(mv);
            }
            tracing::warn!("{:?} is not a possible move", line.trim());
        }
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn prompt_text(state: &GameState) -> String {
    let moves: Vec<String> = state.possible_moves().iter().map(|m| m.to_string()).collect();
    format!("{} to move [{}]: ", state.current_player(), moves.join(" "))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use stonehenge_core::new_game;

    #[test]
    fn test_interactive_skips_invalid_input() {
        let state = new_game(true, 2).unwrap();
        let input = io::Cursor::new("a\nA1\n\nZ\nC\n");
        let mut strategy = InteractiveStrategy::new(input, Vec::new());

        assert_eq!(strategy.choose_move(&state), Some(Move::new('C')));
    }

    #[test]
    fn test_interactive_end_of_input() {
        let state = new_game(true, 2).unwrap();
        let mut strategy = InteractiveStrategy::new(io::Cursor::new("x\n"), Vec::new());
        assert_eq!(strategy.choose_move(&state), None);
    }

    #[test]
    fn test_prompt_text() {
        let state = new_game(false, 1).unwrap();
        assert_eq!(prompt_text(&state), "p2 to move [A B C]: ");
    }

    #[test]
    fn test_play_session_human_wins() {
        let mut game = StonehengeGame::new(true, 1).unwrap();
        let mut human = InteractiveStrategy::new(io::Cursor::new("B\n"), Vec::new());
        let mut computer = stonehenge_core::IterativeMinimax;

        play_session(&mut game, Player::P1, &mut human, &mut computer).unwrap();
        assert!(game.is_winner(Player::P1));
    }
}
