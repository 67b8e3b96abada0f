//! # Engine Configuration
//!
//! Product constants that are tuning decisions rather than derived
//! invariants: score weights, currency rates, cache timings, the analytics
//! cap and the projection multipliers.
//!
//! Every field has a default taken from [`crate::primitives`], so an empty
//! TOML table (or no file at all) yields the shipped behaviour. The shell
//! deserializes this from the `[engine]` section of its config file.

use crate::FlightpathError;
use crate::primitives;
use serde::{Deserialize, Serialize};

// =============================================================================
// SECTIONS
// =============================================================================

/// Share of the combined score taken by each input, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub assessment_percent: u8,
    pub tech_stack_percent: u8,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            assessment_percent: primitives::ASSESSMENT_WEIGHT_PERCENT,
            tech_stack_percent: primitives::TECH_STACK_WEIGHT_PERCENT,
        }
    }
}

impl ScoreWeights {
    /// Weights must sum to exactly 100 percent.
    pub fn validate(&self) -> Result<(), FlightpathError> {
        let total = u16::from(self.assessment_percent) + u16::from(self.tech_stack_percent);
        if total != 100 {
            return Err(FlightpathError::InvalidConfig(format!(
                "score weights must sum to 100, got {} + {} = {}",
                self.assessment_percent, self.tech_stack_percent, total
            )));
        }
        Ok(())
    }
}

/// Flight-miles earning rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MilesRates {
    pub per_score_point: u64,
    pub per_unlocked_city: u64,
}

impl Default for MilesRates {
    fn default() -> Self {
        Self {
            per_score_point: primitives::MILES_PER_SCORE_POINT,
            per_unlocked_city: primitives::MILES_PER_UNLOCKED_CITY,
        }
    }
}

/// Persistence cache timings and limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub debounce_ms: u64,
    pub assessment_progress_ttl_ms: u64,
    pub quota_retry_keep: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            debounce_ms: primitives::DEBOUNCE_MS,
            assessment_progress_ttl_ms: primitives::ASSESSMENT_PROGRESS_TTL_MS,
            quota_retry_keep: primitives::QUOTA_RETRY_KEEP,
        }
    }
}

/// Analytics ring buffer size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsSettings {
    pub max_events: usize,
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            max_events: primitives::MAX_ANALYTICS_EVENTS,
        }
    }
}

/// Linear multipliers (percent of combined score) used by what-if projections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionMultipliers {
    pub readiness_percent: u16,
    pub efficiency_percent: u16,
    pub alignment_percent: u16,
    pub opportunity_percent: u16,
}

impl Default for ProjectionMultipliers {
    fn default() -> Self {
        Self {
            readiness_percent: primitives::PROJECTED_READINESS_PERCENT,
            efficiency_percent: primitives::PROJECTED_EFFICIENCY_PERCENT,
            alignment_percent: primitives::PROJECTED_ALIGNMENT_PERCENT,
            opportunity_percent: primitives::PROJECTED_OPPORTUNITY_PERCENT,
        }
    }
}

// =============================================================================
// ENGINE CONFIG
// =============================================================================

/// Complete engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub weights: ScoreWeights,
    pub miles: MilesRates,
    pub cache: CacheSettings,
    pub analytics: AnalyticsSettings,
    pub projection: ProjectionMultipliers,
}

impl EngineConfig {
    /// Check every cross-field constraint.
    pub fn validate(&self) -> Result<(), FlightpathError> {
        self.weights.validate()?;
        if self.analytics.max_events == 0 {
            return Err(FlightpathError::InvalidConfig(
                "analytics.max_events must be at least 1".to_string(),
            ));
        }
        if self.cache.quota_retry_keep == 0 {
            return Err(FlightpathError::InvalidConfig(
                "cache.quota_retry_keep must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn weights_not_summing_to_hundred_rejected() {
        let config = EngineConfig {
            weights: ScoreWeights {
                assessment_percent: 60,
                tech_stack_percent: 30,
            },
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(FlightpathError::InvalidConfig(_))
        ));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"weights":{"assessment_percent":80,"tech_stack_percent":20}}"#)
                .expect("deserialize");
        assert_eq!(config.weights.assessment_percent, 80);
        assert_eq!(config.cache.debounce_ms, primitives::DEBOUNCE_MS);
        assert!(config.validate().is_ok());
    }
}
