//! Volcano Engine - Move advisors and engine play
//!
//! This crate builds on the core rules:
//! - Engine trait with a time budget and cooperative cancellation
//! - Longest-path, kitty-corner and random engines
//! - Single games and parallel matches between engines
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 2: play_match (phases)
//! - Level 3: engines, play_engines (steps)
//! - Level 4: budget, cancellation, configuration

mod config;
mod engine;
mod game_runner;
mod kitty_corner;
mod longest_path;
mod match_play;
mod random;

pub use config::{EngineConfig, EngineKind, MatchConfig, UnknownEngine};
pub use engine::{CancellationToken, Engine, SearchBudget, SearchResult};
pub use game_runner::{play_engines, GameOutcome, GameRunner};
pub use kitty_corner::{KittyCornerEngine, KittyCornerPolicy};
pub use longest_path::{LongestPathEngine, TerritoryPolicy, WIN_SCORE};
pub use match_play::{play_match, MatchResult};
pub use random::RandomEngine;
