//! Rules - game variant configuration
//!
//! A `Rules` value is fixed for the lifetime of a game and is handed to
//! [`crate::Board::new`]. It can be stored as JSON alongside match results.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::tile::Tile;

/// Highest eruption threshold accepted by [`Rules::validate`]
pub const MAX_SUPPORTED_LEVEL: u8 = 100;

/// Invalid rule combination
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RulesError {
    #[error("max_magma_chamber_level must be at least 1")]
    NoMagmaChambers,

    #[error("max_volcano_level ({volcano}) must be above max_magma_chamber_level ({chamber}) + 1")]
    NoVolcanoRange { volcano: u8, chamber: u8 },

    #[error("max_volcano_level {0} exceeds the supported maximum of {}", MAX_SUPPORTED_LEVEL)]
    LevelTooHigh(u8),
}

/// Rule configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// Level at which a tile erupts
    pub max_volcano_level: u8,
    /// Claimed tiles at or below this level are magma chambers
    pub max_magma_chamber_level: u8,
    /// Overflow added to an empty neighbour of an eruption
    pub erupt_overflow_empty: u8,
    /// Overflow added to a friendly neighbour of an eruption
    pub erupt_overflow_friendly: u8,
    /// Overflow pushed onto an enemy neighbour of an eruption
    pub erupt_overflow_enemy: u8,
    /// Whether overflow may flip an enemy tile to the erupting owner
    pub erupt_overflow_allow_capture: bool,
    /// Erupted tiles stay at max level and stop growing
    pub allow_dormant_volcanoes: bool,
    /// Enemy magma chambers can be attacked directly
    pub allow_magma_chamber_captures: bool,
    /// Enemy volcanoes can be attacked directly
    pub allow_volcano_captures: bool,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            max_volcano_level: 10,
            max_magma_chamber_level: 4,
            erupt_overflow_empty: 1,
            erupt_overflow_friendly: 1,
            erupt_overflow_enemy: 1,
            erupt_overflow_allow_capture: true,
            allow_dormant_volcanoes: false,
            allow_magma_chamber_captures: false,
            allow_volcano_captures: true,
        }
    }
}

impl Rules {
    /// Check that the thresholds describe a playable game
    pub fn validate(&self) -> Result<(), RulesError> {
        if self.max_magma_chamber_level == 0 {
            return Err(RulesError::NoMagmaChambers);
        }
        if self.max_volcano_level > MAX_SUPPORTED_LEVEL {
            return Err(RulesError::LevelTooHigh(self.max_volcano_level));
        }
        if self.max_magma_chamber_level as u16 + 1 >= self.max_volcano_level as u16 {
            return Err(RulesError::NoVolcanoRange {
                volcano: self.max_volcano_level,
                chamber: self.max_magma_chamber_level,
            });
        }
        Ok(())
    }

    /// Level an erupted tile drops back to when dormancy is off
    pub fn post_eruption_level(&self) -> u8 {
        self.max_magma_chamber_level + 1
    }

    pub fn is_magma_chamber(&self, tile: Tile) -> bool {
        !tile.is_empty() && tile.level() <= self.max_magma_chamber_level
    }

    pub fn is_volcano(&self, tile: Tile) -> bool {
        tile.level() > self.max_magma_chamber_level
    }

    pub fn erupts(&self, tile: Tile) -> bool {
        tile.level() >= self.max_volcano_level
    }

    /// Load from JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading rules from {}", path.display()))?;
        let rules: Rules = serde_json::from_str(&content)
            .with_context(|| format!("parsing rules in {}", path.display()))?;
        rules.validate()?;
        Ok(rules)
    }

    /// Save to JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
