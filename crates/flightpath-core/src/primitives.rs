//! # Engine Primitives
//!
//! Default product constants and durable storage keys for the Flightpath engine.
//!
//! The tunable values here are only defaults: [`crate::config::EngineConfig`]
//! carries the live values so product tuning never requires a code change.
//!
//! ## Primitives
//!
//! 1. **Weighting**: assessment vs tech-stack share of the combined score.
//! 2. **Currency**: miles earned per score point and per unlocked city.
//! 3. **Persistence**: debounce window, TTLs and capped collection sizes.

// =============================================================================
// SCORING
// =============================================================================

/// Default share of the combined score taken by the assessment, in percent.
pub const ASSESSMENT_WEIGHT_PERCENT: u8 = 70;

/// Default share of the combined score taken by the tech stack, in percent.
///
/// Must sum to 100 with [`ASSESSMENT_WEIGHT_PERCENT`].
pub const TECH_STACK_WEIGHT_PERCENT: u8 = 30;

// =============================================================================
// CURRENCY
// =============================================================================

/// Flight miles earned per combined-score point.
pub const MILES_PER_SCORE_POINT: u64 = 100;

/// Flight miles earned per unlocked city.
pub const MILES_PER_UNLOCKED_CITY: u64 = 250;

// =============================================================================
// PROJECTION MULTIPLIERS (percent of combined score)
// =============================================================================

pub const PROJECTED_READINESS_PERCENT: u16 = 100;
pub const PROJECTED_EFFICIENCY_PERCENT: u16 = 90;
pub const PROJECTED_ALIGNMENT_PERCENT: u16 = 85;
pub const PROJECTED_OPPORTUNITY_PERCENT: u16 = 110;

// =============================================================================
// PERSISTENCE
// =============================================================================

/// Debounce window for batched durable writes.
pub const DEBOUNCE_MS: u64 = 100;

/// Time-to-live of an in-progress assessment (24 hours).
pub const ASSESSMENT_PROGRESS_TTL_MS: u64 = 24 * 60 * 60 * 1000;

/// Maximum number of analytics events kept; oldest dropped first.
pub const MAX_ANALYTICS_EVENTS: usize = 1000;

/// Entries kept from a collection payload when a quota failure forces a
/// reduced-payload retry.
pub const QUOTA_RETRY_KEEP: usize = 50;

/// Maximum size of a single durable value accepted on read.
///
/// Checked before deserialization so a corrupt or hostile blob cannot force
/// an unbounded allocation.
pub const MAX_STORED_VALUE_BYTES: usize = 5 * 1024 * 1024;

// =============================================================================
// STORAGE KEYS
// =============================================================================

/// In-flight answers of an unfinished assessment (24h TTL).
pub const KEY_ASSESSMENT_PROGRESS: &str = "assessmentProgress";

/// Raw responses of the most recent submission.
pub const KEY_ASSESSMENT_RESPONSES: &str = "assessmentResponses";

/// Type of the most recent submission.
pub const KEY_ASSESSMENT_TYPE: &str = "assessmentType";

/// History ledger (array of history entries).
pub const KEY_ASSESSMENT_HISTORY: &str = "assessmentHistory";

/// Analytics ring buffer.
pub const KEY_ANALYTICS_EVENTS: &str = "analyticsEvents";

/// Current tech stack entries.
pub const KEY_TECH_STACK: &str = "techStack";

/// Per-scenario completion statuses.
pub const KEY_SCENARIO_STATUSES: &str = "scenarioStatuses";

/// Contextual user profile.
pub const KEY_USER_PROFILE: &str = "userProfile";
