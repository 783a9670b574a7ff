//! Data-driven game balance
//!
//! Every timing constant the round engine uses can be overridden from JSON.
//! Missing fields fall back to the values in [`crate::consts`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Longest accepted duration for any timing value (one hour)
pub const MAX_DURATION_MS: u64 = 60 * 60 * 1000;
/// Largest accepted deadline multiplier
pub const MAX_DEADLINE_MULTIPLIER: f64 = 10.0;

/// Errors from loading or validating a tuning file
#[derive(Error, Debug)]
pub enum TuningError {
    #[error("Tuning JSON could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid tuning value for `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Balance values for a round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub base_interval_ms: u64,
    pub min_interval_ms: u64,
    pub interval_ratio: f64,
    pub score_step: u32,
    pub cycles_before_target: u8,
    pub deadline_multiplier: f64,
    pub min_deadline_ms: u64,
    pub grace_ms: u64,
    pub score_pause_ms: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            base_interval_ms: BASE_INTERVAL_MS,
            min_interval_ms: MIN_INTERVAL_MS,
            interval_ratio: INTERVAL_RATIO,
            score_step: SCORE_STEP,
            cycles_before_target: CYCLES_BEFORE_TARGET,
            deadline_multiplier: DEADLINE_MULTIPLIER,
            min_deadline_ms: MIN_DEADLINE_MS,
            grace_ms: GRACE_MS,
            score_pause_ms: SCORE_PAUSE_MS,
        }
    }
}

impl Tuning {
    /// Parse and validate a tuning JSON document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn to_json(&self) -> String {
        // Plain struct of numbers, serialization cannot fail
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Check that the values describe a playable round
    pub fn validate(&self) -> Result<(), TuningError> {
        let invalid = |field: &'static str, reason: &'static str| -> Result<(), TuningError> {
            Err(TuningError::Invalid { field, reason })
        };

        let durations = [
            ("base_interval_ms", self.base_interval_ms),
            ("min_interval_ms", self.min_interval_ms),
            ("min_deadline_ms", self.min_deadline_ms),
            ("grace_ms", self.grace_ms),
            ("score_pause_ms", self.score_pause_ms),
        ];
        for (field, value) in durations {
            if value > MAX_DURATION_MS {
                return invalid(field, "must not exceed one hour");
            }
        }

        if self.base_interval_ms == 0 {
            return invalid("base_interval_ms", "must be positive");
        }
        if self.min_interval_ms == 0 {
            return invalid("min_interval_ms", "must be positive");
        }
        if self.min_interval_ms > self.base_interval_ms {
            return invalid("min_interval_ms", "must not exceed base_interval_ms");
        }
        if !(self.interval_ratio > 0.0 && self.interval_ratio <= 1.0) {
            return invalid("interval_ratio", "must be in (0, 1]");
        }
        if self.score_step == 0 {
            return invalid("score_step", "must be positive");
        }
        if !(self.deadline_multiplier > 0.0
            && self.deadline_multiplier <= MAX_DEADLINE_MULTIPLIER)
        {
            return invalid("deadline_multiplier", "must be in (0, 10]");
        }
        if self.min_deadline_ms == 0 {
            return invalid("min_deadline_ms", "must be positive");
        }
        if self.grace_ms >= self.min_deadline_ms {
            return invalid("grace_ms", "must be shorter than min_deadline_ms");
        }
        if self.score_pause_ms == 0 {
            return invalid("score_pause_ms", "must be positive");
        }
        Ok(())
    }

    /// Interval after a difficulty step, never below the floor
    pub fn next_interval(&self, interval_ms: u64) -> u64 {
        let stepped = (interval_ms as f64 * self.interval_ratio).round() as u64;
        stepped.max(self.min_interval_ms)
    }

    /// Time allowed to tap the target for the given interval
    pub fn deadline_for(&self, interval_ms: u64) -> u64 {
        let scaled = (interval_ms as f64 * self.deadline_multiplier).round() as u64;
        scaled.max(self.min_deadline_ms)
    }

    /// Whether reaching `score` triggers a difficulty step
    pub fn is_step_score(&self, score: u32) -> bool {
        score > 0 && score.is_multiple_of(self.score_step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let tuning = Tuning::default();
        assert!(tuning.validate().is_ok());
        assert_eq!(tuning.base_interval_ms, 1000);
        assert_eq!(tuning.grace_ms, 200);
    }

    #[test]
    fn test_next_interval_floor() {
        let tuning = Tuning::default();
        assert_eq!(tuning.next_interval(1000), 850);
        assert_eq!(tuning.next_interval(600), 510);
        assert_eq!(tuning.next_interval(550), 500);
        assert_eq!(tuning.next_interval(500), 500);
    }

    #[test]
    fn test_deadline_law() {
        let tuning = Tuning::default();
        assert_eq!(tuning.deadline_for(1000), 1500);
        assert_eq!(tuning.deadline_for(850), 1275);
        assert_eq!(tuning.deadline_for(500), 750);
    }

    #[test]
    fn test_step_scores() {
        let tuning = Tuning::default();
        assert!(!tuning.is_step_score(0));
        assert!(!tuning.is_step_score(4));
        assert!(tuning.is_step_score(5));
        assert!(tuning.is_step_score(10));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let tuning = Tuning::from_json(r#"{ "base_interval_ms": 2000 }"#).unwrap();
        assert_eq!(tuning.base_interval_ms, 2000);
        assert_eq!(tuning.min_interval_ms, MIN_INTERVAL_MS);
    }

    #[test]
    fn test_json_roundtrip() {
        let tuning = Tuning {
            interval_ratio: 0.9,
            ..Default::default()
        };
        assert_eq!(Tuning::from_json(&tuning.to_json()).unwrap(), tuning);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = Tuning::from_json(r#"{ "interval_ratio": 1.5 }"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::Invalid {
                field: "interval_ratio",
                ..
            }
        ));

        let err = Tuning::from_json(r#"{ "min_interval_ms": 5000 }"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::Invalid {
                field: "min_interval_ms",
                ..
            }
        ));

        let err = Tuning::from_json(r#"{ "grace_ms": 750 }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid { field: "grace_ms", .. }));
    }

    #[test]
    fn test_oversized_values_rejected() {
        let err = Tuning::from_json(r#"{ "deadline_multiplier": 1e300 }"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::Invalid {
                field: "deadline_multiplier",
                ..
            }
        ));

        let json = format!(r#"{{ "base_interval_ms": {} }}"#, u64::MAX);
        let err = Tuning::from_json(&json).unwrap_err();
        assert!(matches!(
            err,
            TuningError::Invalid {
                field: "base_interval_ms",
                ..
            }
        ));

        let err = Tuning::from_json(r#"{ "score_pause_ms": 3600001 }"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::Invalid {
                field: "score_pause_ms",
                ..
            }
        ));
    }

    #[test]
    fn test_largest_accepted_values_stay_in_range() {
        let tuning = Tuning {
            base_interval_ms: MAX_DURATION_MS,
            min_interval_ms: MAX_DURATION_MS,
            deadline_multiplier: MAX_DEADLINE_MULTIPLIER,
            ..Default::default()
        };
        assert!(tuning.validate().is_ok());
        assert_eq!(tuning.deadline_for(MAX_DURATION_MS), 10 * MAX_DURATION_MS);
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            Tuning::from_json("{ not json"),
            Err(TuningError::Parse(_))
        ));
    }
}
