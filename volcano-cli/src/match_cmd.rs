//! Match command - play games between two engines
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_config(), play_with_progress(), report_results()
//! - Level 3: text and JSON reports
//! - Level 4: formatting utilities

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use volcano_engine::{play_match, EngineConfig, EngineKind, MatchConfig, MatchResult};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct MatchArgs {
    /// First engine (longest-path, kitty-corner, random)
    #[arg(long, default_value = "longest-path")]
    pub first: EngineKind,

    /// Second engine
    #[arg(long, default_value = "kitty-corner")]
    pub second: EngineKind,

    /// Number of games to play (will alternate sides)
    #[arg(long, default_value = "10")]
    pub games: usize,

    /// Maximum turns per game before it is scored as a draw
    #[arg(long, default_value = "400")]
    pub max_turns: u32,

    /// Per-move time limit in milliseconds
    #[arg(long, value_name = "MS")]
    pub time_limit: Option<u64>,

    /// Rules JSON file (defaults when omitted)
    #[arg(long, value_name = "FILE")]
    pub rules: Option<PathBuf>,

    /// Play games one after another instead of in parallel
    #[arg(long)]
    pub sequential: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run match command
///
/// 1. Build the match configuration
/// 2. Play the match (multiple games)
/// 3. Report results
pub fn run(args: MatchArgs, seed: Option<u64>) -> Result<()> {
    let config = build_config(&args, seed)?;

    tracing::info!(
        "Starting match: {} vs {} ({} games, max {} turns)",
        config.first.kind,
        config.second.kind,
        config.games,
        config.max_turns
    );

    let results = play_with_progress(&config, !args.json)?;

    report_results(&results, &config, args.json)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn build_config(args: &MatchArgs, seed: Option<u64>) -> Result<MatchConfig> {
    let rules = crate::load_rules(args.rules.as_deref())?;

    let engine = |kind: EngineKind| match args.time_limit {
        Some(ms) => EngineConfig::new(kind).with_time_limit(ms),
        None => EngineConfig::new(kind),
    };

    Ok(MatchConfig {
        rules,
        first: engine(args.first),
        second: engine(args.second),
        games: args.games,
        max_turns: args.max_turns,
        parallel: !args.sequential,
        seed: create_rng(seed).gen(),
    })
}

/// Play all games, ticking a progress bar as each one finishes
fn play_with_progress(config: &MatchConfig, show_progress: bool) -> Result<MatchResult> {
    let progress = if show_progress {
        let bar = ProgressBar::new(config.games as u64);
        bar.set_style(
            ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} games")
                .context("Invalid progress template")?,
        );
        bar
    } else {
        ProgressBar::hidden()
    };

    let results = play_match(config, |_| progress.inc(1)).context("Match aborted")?;
    progress.finish_and_clear();
    Ok(results)
}

fn report_results(results: &MatchResult, config: &MatchConfig, json: bool) -> Result<()> {
    if json {
        let output = serde_json::to_string_pretty(&JsonOutput::new(results, config))
            .context("Failed to serialize results")?;
        println!("{}", output);
    } else {
        print_text_results(results, config);
    }
    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

#[derive(serde::Serialize)]
struct JsonGame {
    game_number: usize,
    result: String,
    win_condition: String,
    turns: u32,
    moves: usize,
}

#[derive(serde::Serialize)]
struct JsonOutput {
    first: String,
    second: String,
    total_games: u32,
    first_wins: u32,
    second_wins: u32,
    draws: u32,
    avg_turns: f32,
    first_win_rate: f32,
    first_score: f32,
    second_score: f32,
    games: Vec<JsonGame>,
}

impl JsonOutput {
    fn new(results: &MatchResult, config: &MatchConfig) -> Self {
        Self {
            first: config.first.kind.to_string(),
            second: config.second.kind.to_string(),
            total_games: results.games_played,
            first_wins: results.first_wins,
            second_wins: results.second_wins,
            draws: results.draws,
            avg_turns: results.avg_turns,
            first_win_rate: results.first_win_rate(),
            first_score: results.score_for_first(),
            second_score: results.score_for_second(),
            games: results
                .game_outcomes
                .iter()
                .enumerate()
                .map(|(i, g)| JsonGame {
                    game_number: i + 1,
                    result: format!("{:?}", g.result),
                    win_condition: format!("{:?}", g.win_condition),
                    turns: g.turns,
                    moves: g.moves.len(),
                })
                .collect(),
        }
    }
}

fn print_text_results(results: &MatchResult, config: &MatchConfig) {
    println!("\n=== Match Results ===");
    println!("Total games: {}", results.games_played);
    println!(
        "{:<13} {} ({})",
        format!("{}:", config.first.kind),
        results.first_wins,
        percent(results.first_win_rate())
    );
    println!(
        "{:<13} {} ({})",
        format!("{}:", config.second.kind),
        results.second_wins,
        percent(results.second_win_rate())
    );
    println!("{:<13} {} ({})", "Draws:", results.draws, percent(results.draw_rate()));
    println!(
        "Score:        {:.1} - {:.1}",
        results.score_for_first(),
        results.score_for_second()
    );
    println!("Avg turns:    {:.1}", results.avg_turns);

    println!("\nGame details:");
    for (i, game) in results.game_outcomes.iter().enumerate() {
        let (one, two) = if i % 2 == 0 {
            (config.first.kind, config.second.kind)
        } else {
            (config.second.kind, config.first.kind)
        };
        println!(
            "  Game {}: {} (One) vs {} (Two): {:?} after {} turns",
            i + 1,
            one,
            two,
            game.result,
            game.turns
        );
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Create RNG from seed or random
fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

fn percent(rate: f32) -> String {
    format!("{:.1}%", rate * 100.0)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use volcano_core::GameResult;
    use volcano_engine::GameOutcome;

    fn args() -> MatchArgs {
        MatchArgs {
            first: EngineKind::Random,
            second: EngineKind::KittyCorner,
            games: 2,
            max_turns: 50,
            time_limit: Some(20),
            rules: None,
            sequential: true,
            json: true,
        }
    }

    #[test]
    fn test_build_config() {
        let config = build_config(&args(), Some(7)).unwrap();
        assert_eq!(config.first.kind, EngineKind::Random);
        assert_eq!(config.second.time_limit_ms, Some(20));
        assert!(!config.parallel);
        assert_eq!(config.seed, build_config(&args(), Some(7)).unwrap().seed);
    }

    #[test]
    fn test_json_output_counts() {
        let config = build_config(&args(), Some(1)).unwrap();
        let results = play_with_progress(&config, false).unwrap();
        let output = JsonOutput::new(&results, &config);

        assert_eq!(output.total_games, 2);
        assert_eq!(output.games.len(), 2);
        assert_eq!(output.first, "random");
        assert_eq!(output.first_score + output.second_score, 2.0);
        assert!(serde_json::to_string(&output).is_ok());
    }

    #[test]
    fn test_json_game_labels() {
        let results = MatchResult {
            first_wins: 1,
            games_played: 1,
            avg_turns: 33.0,
            game_outcomes: vec![GameOutcome {
                result: GameResult::OneWins,
                win_condition: Default::default(),
                winning_path: vec![0, 40],
                turns: 33,
                moves: vec![],
            }],
            ..Default::default()
        };
        let config = build_config(&args(), Some(1)).unwrap();
        let output = JsonOutput::new(&results, &config);
        assert_eq!(output.games[0].result, "OneWins");
        assert_eq!(output.games[0].win_condition, "Normal");
    }

    #[test]
    fn test_create_rng_deterministic() {
        let mut rng1 = create_rng(Some(42));
        let mut rng2 = create_rng(Some(42));
        assert_eq!(rng1.gen::<u64>(), rng2.gen::<u64>());
    }
}
