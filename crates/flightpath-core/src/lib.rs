//! # flightpath-core
//!
//! The Progression Engine of the Flightpath marketing-maturity quiz: turns
//! assessment answers and a tech-stack inventory into an aviation-themed
//! progression state.
//!
//! ## Pipeline
//!
//! - `score` → combined 0–100 score from responses and tech stack
//! - `tier` → plane level for that score
//! - `miles` + `routes` → flight miles and route/city unlock states,
//!   resolved together as a fixed point
//! - `ledger` → append-only history of submissions
//! - `projection` → the same pipeline over hypothetical inputs
//!
//! ## Persistence
//!
//! All durable state goes through one [`PersistentCache`]: an in-memory
//! read-your-writes layer with debounced flushes to a [`StorageBackend`]
//! (in-memory or redb).
//!
//! ## Constraints
//!
//! - Integer arithmetic only; rounding is half-up
//! - Ordered collections only (`BTreeMap`/`BTreeSet`) for deterministic output
//! - No async, no network dependencies

// =============================================================================
// MODULES
// =============================================================================

pub mod analytics;
pub mod config;
pub mod engine;
pub mod formats;
pub mod ledger;
pub mod miles;
pub mod primitives;
pub mod progress;
pub mod projection;
pub mod reference;
pub mod routes;
pub mod score;
pub mod storage;
pub mod tier;
pub mod trend;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types
// =============================================================================

pub use types::{
    AssessmentResponse, AssessmentType, City, CityId, FlightpathError, HistoryEntry, ReaoScores,
    Route, RouteId, RouteStatus, ScenarioStatus, TechStackEntry, UnlockState, UserProfile,
};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use analytics::{AnalyticsEvent, AnalyticsLog};
pub use config::{
    AnalyticsSettings, CacheSettings, EngineConfig, MilesRates, ProjectionMultipliers,
    ScoreWeights,
};
pub use engine::{Engine, EngineSnapshot};
pub use ledger::HistoryLedger;
pub use progress::AssessmentProgress;
pub use projection::ProjectedResult;
pub use reference::default_network;
pub use routes::{Resolution, RouteNetwork, resolve};
pub use score::ScoreBreakdown;
pub use tier::{PlaneLevel, TierProgress, TierTable};
pub use trend::{HistoryTrend, ReaoDelta};

// =============================================================================
// RE-EXPORTS: Storage
// =============================================================================

pub use formats::CacheEntry;
pub use storage::{
    CacheStats, Clock, DurableStore, ManualClock, MemoryStore, PersistentCache, RedbStore,
    StorageBackend,
};
