//! Volcano CLI - Command-line interface
//!
//! Commands:
//! - match: Play a series of engine-vs-engine games
//! - play: Watch a single game with background engine search
//! - rules: Write or print a rule configuration

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use volcano_core::Rules;

mod match_cmd;
mod play_cmd;
mod rules_cmd;

#[derive(Parser)]
#[command(name = "volcano")]
#[command(about = "Volcanoes rules engine and engine matches")]
struct Cli {
    /// Random seed for reproducibility
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a match between two engines
    Match(match_cmd::MatchArgs),
    /// Play a single game move by move
    Play(play_cmd::PlayArgs),
    /// Write the rule configuration as JSON
    Rules(rules_cmd::RulesArgs),
}

fn main() -> Result<()> {
    // Initialize logging (RUST_LOG overrides the default level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Match(args) => match_cmd::run(args, cli.seed),
        Commands::Play(args) => play_cmd::run(args, cli.seed),
        Commands::Rules(args) => rules_cmd::run(args),
    }
}

/// Rules from a JSON file, or the defaults
pub(crate) fn load_rules(path: Option<&Path>) -> Result<Rules> {
    match path {
        Some(path) => {
            Rules::load(path).with_context(|| format!("Failed to load rules: {}", path.display()))
        }
        None => Ok(Rules::default()),
    }
}
