//! # Core Type Definitions
//!
//! This module contains the data model of the Flightpath Progression Engine:
//! - Engine inputs (`AssessmentResponse`, `TechStackEntry`, `UserProfile`)
//! - Reference data identifiers (`CityId`, `RouteId`, `City`, `Route`)
//! - Derived outputs (`UnlockState`, `RouteStatus`, `ReaoScores`)
//! - Ledger snapshots (`HistoryEntry`, `AssessmentType`)
//! - Error types (`FlightpathError`)
//!
//! ## Serialization
//!
//! Every type that reaches durable storage serializes to camelCase JSON so
//! existing client storage blobs remain readable.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// SCORE RANGE
// =============================================================================

/// Upper bound of every score in the engine (assessment, tech stack, combined).
pub const MAX_SCORE: u8 = 100;

/// Inclusive bounds of a tech-stack utilization rating.
pub const MIN_UTILIZATION: u8 = 1;
pub const MAX_UTILIZATION: u8 = 10;

// =============================================================================
// ENGINE INPUTS
// =============================================================================

/// One answered assessment question.
///
/// Immutable once created. A collection of these, unique by `question_id`,
/// is the atomic unit submitted to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResponse {
    pub question_id: u32,
    pub category: String,
    /// Answer score in `[0, 100]`. Larger values are clamped on use.
    pub score: u8,
}

impl AssessmentResponse {
    #[must_use]
    pub fn new(question_id: u32, category: impl Into<String>, score: u8) -> Self {
        Self {
            question_id,
            category: category.into(),
            score: score.min(MAX_SCORE),
        }
    }

    /// Score clamped to the valid range.
    #[must_use]
    pub fn clamped_score(&self) -> u8 {
        self.score.min(MAX_SCORE)
    }
}

/// One tool in the user's marketing tech stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechStackEntry {
    pub name: String,
    pub category: String,
    /// Utilization rating in `[1, 10]`. Out-of-range values are clamped on use.
    pub utilization_score: u8,
}

impl TechStackEntry {
    #[must_use]
    pub fn new(name: impl Into<String>, category: impl Into<String>, utilization: u8) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            utilization_score: utilization.clamp(MIN_UTILIZATION, MAX_UTILIZATION),
        }
    }

    /// Utilization clamped to `[1, 10]`.
    #[must_use]
    pub fn clamped_utilization(&self) -> u8 {
        self.utilization_score
            .clamp(MIN_UTILIZATION, MAX_UTILIZATION)
    }
}

/// Contextual profile of the person taking the assessment.
///
/// Never part of the scoring math. Every field is optional because the
/// profile is filled in progressively by the onboarding pages.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub role: Option<String>,
    pub industry: Option<String>,
    pub company_size: Option<String>,
    pub company_type: Option<String>,
    pub revenue: Option<String>,
    pub goals: Vec<String>,
}

/// Which flavour of assessment produced a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssessmentType {
    Quick,
    Deep,
}

impl AssessmentType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentType::Quick => "quick",
            AssessmentType::Deep => "deep",
        }
    }
}

impl std::fmt::Display for AssessmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for AssessmentType {
    type Err = FlightpathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "quick" => Ok(Self::Quick),
            "deep" => Ok(Self::Deep),
            other => Err(FlightpathError::InvalidInput(format!(
                "unknown assessment type: {other}"
            ))),
        }
    }
}

/// Completion state of one Operations Center scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

// =============================================================================
// REFERENCE DATA IDENTIFIERS
// =============================================================================

/// Identifier of a capability city on the journey map.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CityId(pub String);

impl CityId {
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.0)
    }
}

/// Identifier of a route between two cities.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteId(pub String);

impl RouteId {
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RouteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.0)
    }
}

/// A capability city (map node).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub id: CityId,
    pub name: String,
}

impl City {
    #[must_use]
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: CityId::new(id),
            name: name.to_string(),
        }
    }
}

/// A capability-pair route. The requirement pair is the unlock threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub id: RouteId,
    pub from: CityId,
    pub to: CityId,
    pub required_score: u8,
    pub required_miles: u64,
}

impl Route {
    #[must_use]
    pub fn new(id: &str, from: &str, to: &str, required_score: u8, required_miles: u64) -> Self {
        Self {
            id: RouteId::new(id),
            from: CityId::new(from),
            to: CityId::new(to),
            required_score,
            required_miles,
        }
    }

    /// Whether this route has `city` as one of its endpoints.
    #[must_use]
    pub fn touches(&self, city: &CityId) -> bool {
        &self.from == city || &self.to == city
    }
}

// =============================================================================
// DERIVED OUTPUTS
// =============================================================================

/// Unlock state of a route or city.
///
/// The variant order is the total order the evaluator respects:
/// `Locked < Partial < Unlocked`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum UnlockState {
    #[default]
    Locked,
    Partial,
    Unlocked,
}

impl UnlockState {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            UnlockState::Locked => "locked",
            UnlockState::Partial => "partial",
            UnlockState::Unlocked => "unlocked",
        }
    }
}

impl std::fmt::Display for UnlockState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Derived status of one route. Never persisted on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStatus {
    pub status: UnlockState,
    /// Readiness toward unlocking, `[0, 100]`.
    pub current_progress: u8,
}

/// Readiness / Efficiency / Alignment / Opportunity breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReaoScores {
    pub readiness: u8,
    pub efficiency: u8,
    pub alignment: u8,
    pub opportunity: u8,
}

// =============================================================================
// LEDGER SNAPSHOT
// =============================================================================

/// Immutable snapshot of engine outputs taken at one assessment submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Epoch milliseconds of the submission.
    pub timestamp: u64,
    pub assessment_type: AssessmentType,
    pub combined_score: u8,
    /// Name of the plane level reached.
    pub plane_level: String,
    pub flight_miles: u64,
    pub unlocked_routes: Vec<RouteId>,
    pub readiness_score: u8,
    pub efficiency_score: u8,
    pub alignment_score: u8,
    pub opportunity_score: u8,
}

impl HistoryEntry {
    /// REAO breakdown carried by this entry.
    #[must_use]
    pub fn reao(&self) -> ReaoScores {
        ReaoScores {
            readiness: self.readiness_score,
            efficiency: self.efficiency_score,
            alignment: self.alignment_score,
            opportunity: self.opportunity_score,
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Flightpath engine.
///
/// - Engine API calls never return storage errors; those are logged and
///   degraded at the cache boundary
/// - Construction-time validation of configuration and reference data
///   returns these errors so bad data is caught at startup
#[derive(Debug, Error)]
pub enum FlightpathError {
    /// Caller-supplied input could not be interpreted.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Engine configuration violates a constraint (e.g. weights not summing to 100).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Static reference data (tiers, routes, cities) is inconsistent.
    #[error("Invalid reference data: {0}")]
    InvalidReferenceData(String),

    /// The requested route does not exist in the network.
    #[error("Unknown route: {0}")]
    UnknownRoute(String),

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A deserialization error occurred.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// The durable store refused a write because it is full.
    #[error("Storage quota exceeded writing {key} ({bytes} bytes)")]
    QuotaExceeded { key: String, bytes: usize },

    /// An I/O error occurred in the durable store.
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlock_state_total_order() {
        assert!(UnlockState::Locked < UnlockState::Partial);
        assert!(UnlockState::Partial < UnlockState::Unlocked);
        assert_eq!(UnlockState::default(), UnlockState::Locked);
    }

    #[test]
    fn constructors_clamp_out_of_range_input() {
        assert_eq!(AssessmentResponse::new(1, "strategy", 140).score, 100);
        assert_eq!(TechStackEntry::new("crm", "sales", 0).utilization_score, 1);
        assert_eq!(TechStackEntry::new("crm", "sales", 12).utilization_score, 10);
    }

    #[test]
    fn history_entry_uses_camel_case_keys() {
        let entry = HistoryEntry {
            timestamp: 1,
            assessment_type: AssessmentType::Deep,
            combined_score: 67,
            plane_level: "Commercial Jet".to_string(),
            flight_miles: 8700,
            unlocked_routes: vec![RouteId::new("seo-content")],
            readiness_score: 60,
            efficiency_score: 70,
            alignment_score: 65,
            opportunity_score: 72,
        };

        let json = serde_json::to_string(&entry).expect("serialize");
        assert!(json.contains("\"assessmentType\":\"deep\""));
        assert!(json.contains("\"combinedScore\":67"));
        assert!(json.contains("\"unlockedRoutes\":[\"seo-content\"]"));
    }

    #[test]
    fn assessment_type_parses_from_str() {
        assert_eq!("quick".parse::<AssessmentType>().ok(), Some(AssessmentType::Quick));
        assert!("medium".parse::<AssessmentType>().is_err());
    }

    #[test]
    fn partial_profile_deserializes() {
        let profile: UserProfile =
            serde_json::from_str(r#"{"role":"CMO"}"#).expect("deserialize");
        assert_eq!(profile.role.as_deref(), Some("CMO"));
        assert!(profile.goals.is_empty());
    }
}
