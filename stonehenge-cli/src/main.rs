//! Stonehenge CLI - Command-line interface
//!
//! Commands:
//! - show: Print a fresh board
//! - play: Play against a strategy from the terminal
//! - match: Pit two strategies against each other
//! - solve: Exact value and best opening move

mod match_cmd;
mod play_cmd;
mod solve_cmd;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use stonehenge_core::{new_game, StonehengeGame};

#[derive(Parser)]
#[command(name = "stonehenge")]
#[command(about = "Stonehenge ley-line game with minimax search")]
struct Cli {
    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a fresh board and its possible moves
    Show(ShowArgs),
    /// Play against a strategy from the terminal
    Play(play_cmd::PlayArgs),
    /// Play strategies against each other
    Match(match_cmd::MatchArgs),
    /// Solve the opening position exactly
    Solve(solve_cmd::SolveArgs),
}

#[derive(Args)]
struct ShowArgs {
    /// Board side length (1-5)
    #[arg(long, default_value = "2")]
    length: usize,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Show(args) => show(args),
        Commands::Play(args) => play_cmd::run(args),
        Commands::Match(args) => match_cmd::run(args),
        Commands::Solve(args) => solve_cmd::run(args),
    }
}

/// Install the tracing subscriber; `RUST_LOG` overrides the default level
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn show(args: ShowArgs) -> Result<()> {
    let state = new_game(true, args.length)?;
    let game = StonehengeGame::from_state(state);
    let moves: Vec<String> = game
        .current_state()
        .possible_moves()
        .iter()
        .map(|m| m.to_string())
        .collect();

    println!("{}", game.instructions());
    println!();
    print!("{}", game.current_state());
    println!("Possible moves: {}", moves.join(", "));
    println!(
        "Ley-lines: {} (capture {} to win)",
        game.current_state().total_ley_lines(),
        game.current_state().total_ley_lines().div_ceil(2)
    );
    Ok(())
}
