//! Run configuration loaded from YAML. Every field has a default, so an
//! empty document is a valid config.

use crate::RuntimeError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sim_econ::{Economy, DEFAULT_HISTORY_LEN};
use sim_effects::DEFAULT_MAX_EVENT_DEPTH;
use std::path::Path;

/// Multiplier range applied to the development, revenue and market
/// intervals each time they are rescheduled.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CycleJitter {
    pub min: f32,
    pub max: f32,
}

impl Default for CycleJitter {
    fn default() -> Self {
        Self { min: 0.4, max: 1.4 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub rng_seed: u64,
    pub start_date: NaiveDate,
    /// Simulated seconds in one game week.
    pub week_seconds: f32,
    pub cycle_jitter: CycleJitter,
    /// Deepest chain of events triggering events.
    pub max_event_depth: u32,
    pub player_name: String,
    pub starting_cash: f32,
    /// Harvest cycles kept in each company's revenue history.
    pub history_len: usize,
    /// Starting economy; `economy.revenue_jitter` is the revenue noise.
    pub economy: Economy,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            rng_seed: 42,
            start_date: NaiveDate::from_ymd_opt(2015, 1, 1).unwrap_or_default(),
            week_seconds: 15.0,
            cycle_jitter: CycleJitter::default(),
            max_event_depth: DEFAULT_MAX_EVENT_DEPTH,
            player_name: "Foobar Inc".to_string(),
            starting_cash: 100_000.0,
            history_len: DEFAULT_HISTORY_LEN,
            economy: Economy::default(),
        }
    }
}

impl SimConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, RuntimeError> {
        // An empty document deserializes as unit, not as an empty map.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: Self = serde_yaml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, RuntimeError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn validate(&self) -> Result<(), RuntimeError> {
        let invalid = |msg: &str| Err(RuntimeError::InvalidConfig(msg.to_string()));
        if !(self.week_seconds.is_finite() && self.week_seconds > 0.0) {
            return invalid("week_seconds must be > 0");
        }
        let j = self.cycle_jitter;
        if !(j.min.is_finite() && j.max.is_finite() && j.min > 0.0 && j.min <= j.max) {
            return invalid("cycle_jitter needs 0 < min <= max");
        }
        if self.history_len == 0 {
            return invalid("history_len must be > 0");
        }
        if !self.starting_cash.is_finite() {
            return invalid("starting_cash must be finite");
        }
        if self.player_name.trim().is_empty() {
            return invalid("player_name is empty");
        }
        let rj = self.economy.revenue_jitter;
        if !(rj.is_finite() && (0.0..1.0).contains(&rj)) {
            return invalid("economy.revenue_jitter must be in [0, 1)");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let cfg = SimConfig::from_yaml_str("").unwrap();
        assert_eq!(cfg, SimConfig::default());
        assert_eq!(cfg.week_seconds, 15.0);
        assert_eq!(cfg.max_event_depth, 3);
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let cfg = SimConfig::from_yaml_str(
            "rng_seed: 7\nstart_date: 2016-03-01\neconomy:\n  tax_rate: 0.1\n",
        )
        .unwrap();
        assert_eq!(cfg.rng_seed, 7);
        assert_eq!(cfg.start_date, NaiveDate::from_ymd_opt(2016, 3, 1).unwrap());
        assert_eq!(cfg.economy.tax_rate, 0.1);
        assert_eq!(cfg.economy.wage_multiplier, 1.0);
        assert_eq!(cfg.cycle_jitter, CycleJitter::default());
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(matches!(
            SimConfig::from_yaml_str("week_seconds: 0"),
            Err(RuntimeError::InvalidConfig(_))
        ));
        assert!(SimConfig::from_yaml_str("cycle_jitter: {min: 2.0, max: 1.0}").is_err());
        assert!(SimConfig::from_yaml_str("history_len: 0").is_err());
        assert!(matches!(
            SimConfig::from_yaml_str("week_seconds: [1]"),
            Err(RuntimeError::Yaml(_))
        ));
    }
}
