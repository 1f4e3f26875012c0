//! Match command - play games between two strategies
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_config(), play_match(), report_results()
//! - Level 3: play_single_game(), compute_match_statistics()
//! - Level 4: formatting utilities

use anyhow::{bail, Context, Result};
use clap::Args;

use stonehenge_core::{play_game, MatchConfig, Move, Player, Strategy, StrategyKind};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct MatchArgs {
    /// Board side length (1-5)
    #[arg(long, default_value = "2")]
    pub length: usize,

    /// Strategy for p1
    #[arg(long, default_value = "iterative")]
    pub p1: StrategyKind,

    /// Strategy for p2
    #[arg(long, default_value = "rough")]
    pub p2: StrategyKind,

    /// Number of games to play (first player alternates)
    #[arg(long, default_value = "2")]
    pub games: usize,

    /// Let p2 move first in the first game
    #[arg(long)]
    pub p2_starts: bool,

    /// Seed for random strategies
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Result of a single game
#[derive(Clone, Debug)]
struct GameRecord {
    game_number: usize,
    first_player: Player,
    winner: Option<Player>,
    moves: Vec<Move>,
}

/// Aggregated match results
#[derive(Clone, Debug)]
struct MatchResults {
    games: Vec<GameRecord>,
    p1_wins: usize,
    p2_wins: usize,
    unfinished: usize,
    avg_moves: f32,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run match command
///
/// 1. Build and validate the configuration
/// 2. Play the match (multiple games)
/// 3. Report results
pub fn run(args: MatchArgs) -> Result<()> {
    let config = build_config(&args)?;

    tracing::info!(
        "Starting match: {} vs {} ({} games, length {})",
        config.p1,
        config.p2,
        config.games,
        config.length
    );

    let results = play_match(&config)?;
    report_results(&results, &config, args.json);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn build_config(args: &MatchArgs) -> Result<MatchConfig> {
    if args.p1 == StrategyKind::Interactive || args.p2 == StrategyKind::Interactive {
        bail!("match needs two computer strategies; use `play` for interactive games");
    }

    let mut config = MatchConfig::default()
        .with_length(args.length)
        .with_strategies(args.p1, args.p2)
        .with_games(args.games);
    if args.p2_starts {
        config = config.p2_starts();
    }
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    config.validate().context("invalid match configuration")?;
    Ok(config)
}

/// Play all games in the match
fn play_match(config: &MatchConfig) -> Result<MatchResults> {
    let seed = config.seed.unwrap_or(42);
    let mut games = Vec::with_capacity(config.games);

    for game_index in 0..config.games {
        // Fresh strategies per game, each side with its own random stream
        let mut p1 = build_strategy(config.p1, seed.wrapping_add(2 * game_index as u64))?;
        let mut p2 = build_strategy(config.p2, seed.wrapping_add(2 * game_index as u64 + 1))?;

        let record = play_single_game(config, game_index, p1.as_mut(), p2.as_mut())?;

        tracing::info!(
            "Game {}: {} started, winner {} ({} moves)",
            record.game_number,
            record.first_player,
            format_winner(record.winner),
            record.moves.len()
        );

        games.push(record);
    }

    Ok(compute_match_statistics(games))
}

fn report_results(results: &MatchResults, config: &MatchConfig, json: bool) {
    if json {
        print_json_results(results, config);
    } else {
        print_text_results(results, config);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn build_strategy(kind: StrategyKind, seed: u64) -> Result<Box<dyn Strategy>> {
    kind.build(seed)
        .with_context(|| format!("{} cannot play in a match", kind))
}

fn play_single_game(
    config: &MatchConfig,
    game_index: usize,
    p1: &mut dyn Strategy,
    p2: &mut dyn Strategy,
) -> Result<GameRecord> {
    let initial = config.initial_state(game_index)?;
    let first_player = initial.current_player();
    let (final_state, moves) = play_game(initial, p1, p2)?;

    Ok(GameRecord {
        game_number: game_index + 1,
        first_player,
        winner: final_state.winner(),
        moves,
    })
}

/// Compute aggregate statistics from game records
fn compute_match_statistics(games: Vec<GameRecord>) -> MatchResults {
    let p1_wins = games
        .iter()
        .filter(|g| g.winner == Some(Player::P1))
        .count();
    let p2_wins = games
        .iter()
        .filter(|g| g.winner == Some(Player::P2))
        .count();
    let unfinished = games.iter().filter(|g| g.winner.is_none()).count();

    let total_moves: usize = games.iter().map(|g| g.moves.len()).sum();
    let avg_moves = if games.is_empty() {
        0.0
    } else {
        total_moves as f32 / games.len() as f32
    };

    MatchResults {
        games,
        p1_wins,
        p2_wins,
        unfinished,
        avg_moves,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn format_winner(winner: Option<Player>) -> String {
    winner.map_or_else(|| "none".to_string(), |p| p.to_string())
}

fn format_moves(moves: &[Move]) -> String {
    moves.iter().map(|m| m.to_string()).collect::<Vec<_>>().join(" ")
}

fn percent(count: usize, total: usize) -> f32 {
    if total > 0 {
        count as f32 / total as f32 * 100.0
    } else {
        0.0
    }
}

/// Print results as JSON
fn print_json_results(results: &MatchResults, config: &MatchConfig) {
    #[derive(serde::Serialize)]
    struct JsonGame {
        game_number: usize,
        first_player: Player,
        winner: Option<Player>,
        moves: String,
    }

    #[derive(serde::Serialize)]
    struct JsonOutput<'a> {
        config: &'a MatchConfig,
        total_games: usize,
        p1_wins: usize,
        p2_wins: usize,
        unfinished: usize,
        avg_moves: f32,
        games: Vec<JsonGame>,
    }

    let output = JsonOutput {
        config,
        total_games: results.games.len(),
        p1_wins: results.p1_wins,
        p2_wins: results.p2_wins,
        unfinished: results.unfinished,
        avg_moves: results.avg_moves,
        games: results
            .games
            .iter()
            .map(|g| JsonGame {
                game_number: g.game_number,
                first_player: g.first_player,
                winner: g.winner,
                moves: format_moves(&g.moves),
            })
            .collect(),
    };

    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{}", json),
        Err(e) => tracing::warn!("Failed to serialize results: {}", e),
    }
}

/// Print results as text
fn print_text_results(results: &MatchResults, config: &MatchConfig) {
    let total = results.games.len();

    println!("\n=== Match Results ===");
    println!("p1 ({}) vs p2 ({}), length {}", config.p1, config.p2, config.length);
    println!("Total games: {}", total);
    println!(
        "p1 wins:     {} ({:.1}%)",
        results.p1_wins,
        percent(results.p1_wins, total)
    );
    println!(
        "p2 wins:     {} ({:.1}%)",
        results.p2_wins,
        percent(results.p2_wins, total)
    );
    println!(
        "Unfinished:  {} ({:.1}%)",
        results.unfinished,
        percent(results.unfinished, total)
    );
    println!("Avg moves:   {:.1}", results.avg_moves);

    println!("\nGame details:");
    for game in &results.games {
        println!(
            "  Game {}: {} first, winner {} [{}]",
            game.game_number,
            game.first_player,
            format_winner(game.winner),
            format_moves(&game.moves)
        );
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> MatchArgs {
        MatchArgs {
            length: 1,
            p1: StrategyKind::IterativeMinimax,
            p2: StrategyKind::RoughOutcome,
            games: 2,
            p2_starts: false,
            seed: Some(3),
            json: false,
        }
    }

    #[test]
    fn test_compute_match_statistics_empty() {
        let results = compute_match_statistics(vec![]);
        assert_eq!(results.p1_wins, 0);
        assert_eq!(results.p2_wins, 0);
        assert_eq!(results.unfinished, 0);
        assert_eq!(results.avg_moves, 0.0);
    }

    #[test]
    fn test_compute_match_statistics() {
        let record = |game_number, winner, moves: &str| GameRecord {
            game_number,
            first_player: Player::P1,
            winner,
            moves: moves.chars().map(Move::new).collect(),
        };
        let games = vec![
            record(1, Some(Player::P1), "ABC"),
            record(2, Some(Player::P2), "ABCDE"),
            record(3, None, "A"),
        ];

        let results = compute_match_statistics(games);
        assert_eq!(results.p1_wins, 1);
        assert_eq!(results.p2_wins, 1);
        assert_eq!(results.unfinished, 1);
        assert_eq!(results.avg_moves, 3.0);
    }

    #[test]
    fn test_build_config() {
        let config = build_config(&args()).unwrap();
        assert_eq!(config.length, 1);
        assert_eq!(config.seed, Some(3));
        assert!(config.p1_starts);
    }

    #[test]
    fn test_build_config_rejects_interactive_and_length() {
        let mut bad = args();
        bad.p2 = StrategyKind::Interactive;
        assert!(build_config(&bad).is_err());

        let mut bad = args();
        bad.length = 9;
        assert!(build_config(&bad).is_err());
    }

    #[test]
    fn test_play_match_alternates_first_player() {
        let config = build_config(&args()).unwrap();
        let results = play_match(&config).unwrap();

        // On length 1 whoever moves first wins in one move
        assert_eq!(results.games.len(), 2);
        assert_eq!(results.games[0].first_player, Player::P1);
        assert_eq!(results.games[0].winner, Some(Player::P1));
        assert_eq!(results.games[1].first_player, Player::P2);
        assert_eq!(results.games[1].winner, Some(Player::P2));
        assert_eq!(results.avg_moves, 1.0);
    }

    #[test]
    fn test_format_moves() {
        assert_eq!(format_moves(&[Move::new('A'), Move::new('C')]), "A C");
        assert_eq!(format_winner(None), "none");
    }
}
