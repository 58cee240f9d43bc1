//! Configuration types for engine play
//!
//! Level 4 - Utilities and configuration

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use volcano_core::Rules;

use crate::engine::{Engine, SearchBudget};
use crate::kitty_corner::KittyCornerEngine;
use crate::longest_path::LongestPathEngine;
use crate::random::RandomEngine;

/// Unrecognised engine name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown engine '{0}' (expected longest-path, kitty-corner or random)")]
pub struct UnknownEngine(pub String);

/// Engine type
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EngineKind {
    /// Greedy territory-path maximiser
    #[default]
    LongestPath,
    /// Face-centre kitty-corner pattern player
    KittyCorner,
    /// Random expansion
    Random,
}

impl EngineKind {
    pub const ALL: [EngineKind; 3] = [EngineKind::LongestPath, EngineKind::KittyCorner, EngineKind::Random];

    /// Fresh engine instance
    pub fn build(self, seed: u64) -> Box<dyn Engine> {
        match self {
            EngineKind::LongestPath => Box::new(LongestPathEngine::new(seed)),
            EngineKind::KittyCorner => Box::new(KittyCornerEngine::new(seed)),
            EngineKind::Random => Box::new(RandomEngine::new(seed)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EngineKind::LongestPath => "longest-path",
            EngineKind::KittyCorner => "kitty-corner",
            EngineKind::Random => "random",
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for EngineKind {
    type Err = UnknownEngine;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        EngineKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| UnknownEngine(s.to_string()))
    }
}

/// Engine configuration for one seat
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub kind: EngineKind,
    /// Optional time limit per move in milliseconds
    pub time_limit_ms: Option<u64>,
    /// Random seed for reproducibility (None = 42)
    pub seed: Option<u64>,
}

impl EngineConfig {
    pub fn new(kind: EngineKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    pub fn with_time_limit(mut self, millis: u64) -> Self {
        self.time_limit_ms = Some(millis);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Fresh budget for one move
    pub fn budget(&self) -> SearchBudget {
        match self.time_limit_ms {
            Some(ms) => SearchBudget::with_duration(Duration::from_millis(ms)),
            None => SearchBudget::unlimited(),
        }
    }
}

/// Configuration for a match between two engines
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatchConfig {
    pub rules: Rules,
    /// Engine listed first; plays Player One in even-numbered games
    pub first: EngineConfig,
    pub second: EngineConfig,
    /// Number of games (seats alternate every game)
    pub games: usize,
    /// Turn limit; an unfinished game counts as a draw
    pub max_turns: u32,
    /// Whether to run games in parallel
    pub parallel: bool,
    /// Base seed; game `i` uses `seed + i`
    pub seed: u64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            rules: Rules::default(),
            first: EngineConfig::new(EngineKind::LongestPath),
            second: EngineConfig::new(EngineKind::KittyCorner),
            games: 10,
            max_turns: 400,
            parallel: true,
            seed: 42,
        }
    }
}

impl MatchConfig {
    pub fn new(first: EngineKind, second: EngineKind, games: usize) -> Self {
        Self {
            first: EngineConfig::new(first),
            second: EngineConfig::new(second),
            games,
            ..Default::default()
        }
    }

    pub fn with_rules(mut self, rules: Rules) -> Self {
        self.rules = rules;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_kind_parsing() {
        assert_eq!("longest-path".parse::<EngineKind>(), Ok(EngineKind::LongestPath));
        assert_eq!("Kitty_Corner".parse::<EngineKind>(), Ok(EngineKind::KittyCorner));
        assert_eq!(" random ".parse::<EngineKind>(), Ok(EngineKind::Random));
        assert!("minimax".parse::<EngineKind>().is_err());

        for kind in EngineKind::ALL {
            assert_eq!(kind.to_string().parse::<EngineKind>(), Ok(kind));
            assert_eq!(kind.build(1).name(), kind.as_str());
        }
    }

    #[test]
    fn test_engine_config_budget() {
        let config = EngineConfig::new(EngineKind::Random);
        assert_eq!(config.budget().max_duration, None);

        let timed = config.with_time_limit(250).with_seed(3);
        assert_eq!(timed.budget().max_duration, Some(Duration::from_millis(250)));
        assert_eq!(timed.seed, Some(3));
    }

    #[test]
    fn test_match_config_defaults() {
        let config = MatchConfig::default();
        assert_eq!(config.games, 10);
        assert!(config.parallel);
        assert_eq!(config.rules, Rules::default());

        let config = MatchConfig::new(EngineKind::Random, EngineKind::Random, 4);
        assert_eq!(config.games, 4);
        assert_eq!(config.first.kind, EngineKind::Random);
    }

    #[test]
    fn test_engine_kind_json_names() {
        let json = serde_json::to_string(&EngineKind::KittyCorner).unwrap();
        assert_eq!(json, "\"kitty-corner\"");
    }
}
