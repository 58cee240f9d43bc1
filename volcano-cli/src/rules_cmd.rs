//! Rules command - write a rule configuration
//!
//! Starts from the defaults (or an existing file), applies any overrides
//! given on the command line, validates, and writes JSON.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use volcano_core::Rules;

#[derive(Args, Default)]
pub struct RulesArgs {
    /// Write to this file instead of stdout
    #[arg(long, short, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Start from an existing rules file
    #[arg(long, value_name = "FILE")]
    pub base: Option<PathBuf>,

    #[arg(long)]
    pub max_volcano_level: Option<u8>,

    #[arg(long)]
    pub max_magma_chamber_level: Option<u8>,

    #[arg(long)]
    pub overflow_empty: Option<u8>,

    #[arg(long)]
    pub overflow_friendly: Option<u8>,

    #[arg(long)]
    pub overflow_enemy: Option<u8>,

    /// Whether eruption overflow may flip enemy tiles
    #[arg(long)]
    pub overflow_capture: Option<bool>,

    /// Erupted tiles stay at the eruption level and stop growing
    #[arg(long)]
    pub dormant: Option<bool>,

    /// Enemy magma chambers can be attacked directly
    #[arg(long)]
    pub chamber_captures: Option<bool>,

    /// Enemy volcanoes can be attacked directly
    #[arg(long)]
    pub volcano_captures: Option<bool>,
}

pub fn run(args: RulesArgs) -> Result<()> {
    let rules = build_rules(&args)?;

    match &args.output {
        Some(path) => {
            rules
                .save(path)
                .with_context(|| format!("Failed to write rules: {}", path.display()))?;
            tracing::info!("Rules written to {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&rules)?),
    }
    Ok(())
}

fn build_rules(args: &RulesArgs) -> Result<Rules> {
    let mut rules = crate::load_rules(args.base.as_deref())?;

    fn set<T: Copy>(field: &mut T, value: Option<T>) {
        if let Some(value) = value {
            *field = value;
        }
    }
    set(&mut rules.max_volcano_level, args.max_volcano_level);
    set(&mut rules.max_magma_chamber_level, args.max_magma_chamber_level);
    set(&mut rules.erupt_overflow_empty, args.overflow_empty);
    set(&mut rules.erupt_overflow_friendly, args.overflow_friendly);
    set(&mut rules.erupt_overflow_enemy, args.overflow_enemy);
    set(&mut rules.erupt_overflow_allow_capture, args.overflow_capture);
    set(&mut rules.allow_dormant_volcanoes, args.dormant);
    set(&mut rules.allow_magma_chamber_captures, args.chamber_captures);
    set(&mut rules.allow_volcano_captures, args.volcano_captures);

    rules.validate().context("Rejected rule combination")?;
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_overrides() {
        assert_eq!(build_rules(&RulesArgs::default()).unwrap(), Rules::default());
    }

    #[test]
    fn test_overrides_apply() {
        let args = RulesArgs {
            dormant: Some(true),
            overflow_enemy: Some(3),
            max_volcano_level: Some(12),
            ..Default::default()
        };
        let rules = build_rules(&args).unwrap();
        assert!(rules.allow_dormant_volcanoes);
        assert_eq!(rules.erupt_overflow_enemy, 3);
        assert_eq!(rules.max_volcano_level, 12);
        assert_eq!(rules.max_magma_chamber_level, 4);
    }

    #[test]
    fn test_invalid_combination_rejected() {
        let args = RulesArgs {
            max_volcano_level: Some(5),
            ..Default::default()
        };
        assert!(build_rules(&args).is_err());
    }

    #[test]
    fn test_written_file_round_trips() {
        let path = std::env::temp_dir().join(format!("volcano-rules-cmd-{}.json", std::process::id()));
        let args = RulesArgs {
            output: Some(path.clone()),
            chamber_captures: Some(true),
            ..Default::default()
        };
        run(args).unwrap();

        let base = RulesArgs {
            base: Some(path.clone()),
            ..Default::default()
        };
        let rules = build_rules(&base).unwrap();
        std::fs::remove_file(&path).ok();
        assert!(rules.allow_magma_chamber_captures);
    }
}
