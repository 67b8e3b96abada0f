//! # Tier Classifier
//!
//! Maps a combined score onto one ordered maturity tier ("plane level").
//!
//! ## Default Plane Levels
//!
//! | Level | Score Range |
//! |-------|-------------|
//! | Paper Plane | 0–20 |
//! | Propeller | 21–40 |
//! | Regional Jet | 41–60 |
//! | Commercial Jet | 61–80 |
//! | Supersonic | 81–100 |
//!
//! ## Partition Invariant
//!
//! The ordered tiers partition `[0, 100]` with no gaps and no overlaps, so
//! exactly one tier matches any score. [`TierTable::new`] enforces this at
//! construction; the classifier itself still falls back to the first tier
//! when nothing matches and logs it as a reference-data bug.

use crate::FlightpathError;
use crate::types::MAX_SCORE;
use serde::{Deserialize, Serialize};

// =============================================================================
// PLANE LEVEL
// =============================================================================

/// A named maturity bracket covering a contiguous score sub-range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaneLevel {
    pub name: String,
    pub min_score: u8,
    pub max_score: u8,
    pub color: String,
    pub icon: String,
}

impl PlaneLevel {
    #[must_use]
    pub fn new(name: &str, min_score: u8, max_score: u8, color: &str, icon: &str) -> Self {
        Self {
            name: name.to_string(),
            min_score,
            max_score,
            color: color.to_string(),
            icon: icon.to_string(),
        }
    }

    /// Whether `score` falls inside this level's inclusive range.
    #[must_use]
    pub fn contains(&self, score: u8) -> bool {
        self.min_score <= score && score <= self.max_score
    }
}

/// Linear scan for the tier containing `score`.
///
/// Falls back to the first tier when no tier matches. Returns `None` only
/// for an empty table.
#[must_use]
pub fn classify(score: u8, tiers: &[PlaneLevel]) -> Option<&PlaneLevel> {
    tiers.iter().find(|tier| tier.contains(score)).or_else(|| {
        tracing::warn!(
            score,
            "no plane level covers score; falling back to first tier (tier table does not partition 0-100)"
        );
        tiers.first()
    })
}

/// Check that `tiers`, in order, partition `[0, 100]`.
pub fn validate_partition(tiers: &[PlaneLevel]) -> Result<(), FlightpathError> {
    let Some(first) = tiers.first() else {
        return Err(FlightpathError::InvalidReferenceData(
            "tier table is empty".to_string(),
        ));
    };
    if first.min_score != 0 {
        return Err(FlightpathError::InvalidReferenceData(format!(
            "first tier '{}' starts at {} instead of 0",
            first.name, first.min_score
        )));
    }

    let mut expected_min: u16 = 0;
    for tier in tiers {
        if u16::from(tier.min_score) != expected_min {
            return Err(FlightpathError::InvalidReferenceData(format!(
                "tier '{}' starts at {} but previous tier ended at {}",
                tier.name,
                tier.min_score,
                expected_min.saturating_sub(1)
            )));
        }
        if tier.min_score > tier.max_score {
            return Err(FlightpathError::InvalidReferenceData(format!(
                "tier '{}' has min {} above max {}",
                tier.name, tier.min_score, tier.max_score
            )));
        }
        expected_min = u16::from(tier.max_score) + 1;
    }

    if expected_min != u16::from(MAX_SCORE) + 1 {
        return Err(FlightpathError::InvalidReferenceData(format!(
            "tier table ends at {} instead of {}",
            expected_min.saturating_sub(1),
            MAX_SCORE
        )));
    }
    Ok(())
}

// =============================================================================
// TIER TABLE
// =============================================================================

/// Validated, ordered plane-level table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierTable {
    levels: Vec<PlaneLevel>,
}

impl Default for TierTable {
    fn default() -> Self {
        Self {
            levels: default_plane_levels(),
        }
    }
}

impl TierTable {
    /// Build a table, rejecting any set of levels that does not partition `[0, 100]`.
    pub fn new(levels: Vec<PlaneLevel>) -> Result<Self, FlightpathError> {
        validate_partition(&levels)?;
        Ok(Self { levels })
    }

    /// All levels in ascending order.
    #[must_use]
    pub fn levels(&self) -> &[PlaneLevel] {
        &self.levels
    }

    /// The level containing `score`.
    #[must_use]
    pub fn classify(&self, score: u8) -> &PlaneLevel {
        match classify(score, &self.levels) {
            Some(level) => level,
            None => &self.levels[0],
        }
    }

    /// The level above the one containing `score`, if any.
    #[must_use]
    pub fn next_level(&self, score: u8) -> Option<&PlaneLevel> {
        self.levels.iter().find(|level| level.min_score > score)
    }

    /// Progress through the current level toward the next one.
    #[must_use]
    pub fn progress(&self, score: u8) -> TierProgress {
        let current = self.classify(score).clone();
        let Some(next) = self.next_level(score).cloned() else {
            return TierProgress {
                current,
                next: None,
                percent: 100,
                points_to_next: 0,
            };
        };

        let span = u64::from(next.min_score.saturating_sub(current.min_score));
        let into = u64::from(score.saturating_sub(current.min_score));
        let percent = if span > 0 {
            (into.saturating_mul(100) / span).min(100) as u8
        } else {
            100
        };

        TierProgress {
            points_to_next: next.min_score.saturating_sub(score),
            current,
            next: Some(next),
            percent,
        }
    }
}

/// Progress information toward the next plane level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierProgress {
    pub current: PlaneLevel,
    pub next: Option<PlaneLevel>,
    pub percent: u8,
    pub points_to_next: u8,
}

/// The shipped five-level table.
#[must_use]
pub fn default_plane_levels() -> Vec<PlaneLevel> {
    vec![
        PlaneLevel::new("Paper Plane", 0, 20, "#94a3b8", "paper-plane"),
        PlaneLevel::new("Propeller", 21, 40, "#60a5fa", "propeller"),
        PlaneLevel::new("Regional Jet", 41, 60, "#34d399", "regional-jet"),
        PlaneLevel::new("Commercial Jet", 61, 80, "#fbbf24", "commercial-jet"),
        PlaneLevel::new("Supersonic", 81, 100, "#f472b6", "supersonic"),
    ]
}

// =============================================================================
// TESTS
// =============================================================================
