//! Session Configuration
//!
//! Seed and phase timings, with defaults taken from the shipped game.
//! Configs load from JSON or from `BRAIN_BENCH_*` environment variables.

use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::warn;

use crate::core::schedule::Millis;
use crate::game::scoring::Points;

/// Ticks in a detection round, one progress point each.
const DETECTION_TICKS: Millis = (100 / Points::DETECTION_TICK) as Millis;

/// Errors building a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable did not parse.
    #[error("invalid value {value:?} for {var}")]
    InvalidEnv {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
    },

    /// Timings are inconsistent.
    #[error("invalid timing: {0}")]
    InvalidTiming(&'static str),

    /// JSON did not parse.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Phase durations in milliseconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Feedback pause after a scored answer.
    pub settle_ms: Millis,
    /// Pause before a new stimulus is drawn.
    pub generate_delay_ms: Millis,
    /// Display time per element of a span sequence.
    pub span_reveal_ms: Millis,
    /// Display time per object in the objects list.
    pub object_reveal_ms: Millis,
    /// Pause before each objects question.
    pub object_options_delay_ms: Millis,
    /// Shortest reaction foreperiod.
    pub reaction_min_ms: Millis,
    /// Longest reaction foreperiod.
    pub reaction_max_ms: Millis,
    /// Detection grid update interval.
    pub detection_tick_ms: Millis,
    /// Detection round length; exactly 100 ticks, one progress point each.
    pub detection_budget_ms: Millis,
    /// How long a tapped detection cell stays highlighted.
    pub detection_feedback_ms: Millis,
    /// Pause between the end of a detection round and completion.
    pub detection_round_end_ms: Millis,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            settle_ms: 1000,
            generate_delay_ms: 1000,
            span_reveal_ms: 1000,
            object_reveal_ms: 2000,
            object_options_delay_ms: 500,
            reaction_min_ms: 2000,
            reaction_max_ms: 5000,
            detection_tick_ms: 300,
            detection_budget_ms: 30_000,
            detection_feedback_ms: 400,
            detection_round_end_ms: 1000,
        }
    }
}

impl TimingConfig {
    /// Check the timings are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reaction_min_ms > self.reaction_max_ms {
            return Err(ConfigError::InvalidTiming("reaction_min_ms exceeds reaction_max_ms"));
        }
        if self.detection_tick_ms == 0 {
            return Err(ConfigError::InvalidTiming("detection_tick_ms must be positive"));
        }
        if self.detection_tick_ms.checked_mul(DETECTION_TICKS) != Some(self.detection_budget_ms) {
            return Err(ConfigError::InvalidTiming("detection_budget_ms must be 100 detection ticks"));
        }
        Ok(())
    }
}

/// Configuration for one session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// RNG seed. Derived from a fresh session id when absent.
    pub seed: Option<u64>,
    /// Phase timings.
    pub timing: TimingConfig,
}

impl SessionConfig {
    /// Config with a fixed seed and default timings.
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Parse from JSON; missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.timing.validate()?;
        Ok(config)
    }

    /// Create config from environment variables.
    ///
    /// Reads `BRAIN_BENCH_SEED` and `BRAIN_BENCH_SETTLE_MS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Create config from any variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("BRAIN_BENCH_SEED") {
            config.seed = Some(parse_var("BRAIN_BENCH_SEED", &raw)?);
        }
        if let Some(raw) = lookup("BRAIN_BENCH_SETTLE_MS") {
            config.timing.settle_ms = parse_var("BRAIN_BENCH_SETTLE_MS", &raw)?;
        }

        config.timing.validate()?;
        Ok(config)
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| {
        warn!(var, value = raw, "invalid environment value");
        ConfigError::InvalidEnv {
            var,
            value: raw.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_shipped_timings() {
        let timing = TimingConfig::default();
        assert_eq!(timing.settle_ms, 1000);
        assert_eq!(timing.detection_budget_ms / timing.detection_tick_ms, 100);
        assert!(timing.validate().is_ok());
    }

    #[test]
    fn test_lookup_reads_seed_and_settle() {
        let config = SessionConfig::from_lookup(|var| match var {
            "BRAIN_BENCH_SEED" => Some("42".into()),
            "BRAIN_BENCH_SETTLE_MS" => Some(" 250 ".into()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.seed, Some(42));
        assert_eq!(config.timing.settle_ms, 250);
    }

    #[test]
    fn test_lookup_rejects_garbage() {
        let err = SessionConfig::from_lookup(|var| (var == "BRAIN_BENCH_SEED").then(|| "soon".into())).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { var: "BRAIN_BENCH_SEED", .. }));
    }

    #[test]
    fn test_json_partial_config() {
        let config = SessionConfig::from_json_str(r#"{ "seed": 7, "timing": { "settle_ms": 10 } }"#).unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.timing.settle_ms, 10);
        assert_eq!(config.timing.detection_tick_ms, 300);
    }

    #[test]
    fn test_detection_budget_must_match_ticks() {
        let mut timing = TimingConfig { detection_tick_ms: 200, ..TimingConfig::default() };
        assert!(matches!(timing.validate(), Err(ConfigError::InvalidTiming(_))));

        timing.detection_budget_ms = 20_000;
        assert!(timing.validate().is_ok());

        timing.detection_tick_ms = 0;
        timing.detection_budget_ms = 0;
        assert!(matches!(timing.validate(), Err(ConfigError::InvalidTiming(_))));
    }

    #[test]
    fn test_json_rejects_inverted_foreperiod() {
        let json = r#"{ "timing": { "reaction_min_ms": 6000 } }"#;
        assert!(matches!(
            SessionConfig::from_json_str(json),
            Err(ConfigError::InvalidTiming(_))
        ));
    }
}
