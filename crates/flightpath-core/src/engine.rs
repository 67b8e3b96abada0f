//! # Engine
//!
//! The store object owned by the application shell: a single composition
//! root wiring the pure scoring functions to the Persistence Cache Layer and
//! the History Ledger.
//!
//! ## Live State
//!
//! Only the engine *inputs* are held and persisted: the most recent
//! submission's responses and the current tech stack. Everything derived
//! (combined score, plane level, miles, route and city states, REAO) is
//! recomputed on every read. Each submission also appends one immutable
//! [`HistoryEntry`] to the ledger.
//!
//! ## Projection Isolation
//!
//! `project` and `project_score` take `&self`, while every cache operation
//! needs `&mut PersistentCache`, so a projection cannot read or write
//! persisted state.

use crate::analytics::{AnalyticsEvent, AnalyticsLog};
use crate::config::EngineConfig;
use crate::ledger::HistoryLedger;
use crate::primitives::{
    KEY_ASSESSMENT_RESPONSES, KEY_ASSESSMENT_TYPE, KEY_SCENARIO_STATUSES, KEY_TECH_STACK,
    KEY_USER_PROFILE,
};
use crate::progress::{self, AssessmentProgress};
use crate::projection::{self, ProjectedResult};
use crate::reference::default_network;
use crate::routes::{RouteNetwork, resolve, unlocked_routes};
use crate::score::{ScoreBreakdown, aggregate, dedupe_responses, live_reao};
use crate::storage::{Clock, PersistentCache, StorageBackend};
use crate::tier::{PlaneLevel, TierProgress, TierTable};
use crate::trend::HistoryTrend;
use crate::types::{
    AssessmentResponse, AssessmentType, CityId, HistoryEntry, ReaoScores, RouteId, RouteStatus,
    ScenarioStatus, TechStackEntry, UnlockState, UserProfile,
};
use crate::FlightpathError;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Every derived field of the live engine at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSnapshot {
    pub score: ScoreBreakdown,
    pub combined_score: u8,
    pub plane_level: PlaneLevel,
    pub flight_miles: u64,
    pub unlocked_city_count: usize,
    pub unlocked_routes: Vec<RouteId>,
    pub route_statuses: BTreeMap<RouteId, RouteStatus>,
    pub city_states: BTreeMap<CityId, UnlockState>,
    pub reao: ReaoScores,
}

// =============================================================================
// ENGINE
// =============================================================================

/// The Progression Engine store.
#[derive(Debug)]
pub struct Engine {
    cache: PersistentCache,
    config: EngineConfig,
    tiers: TierTable,
    network: RouteNetwork,
    ledger: HistoryLedger,
    analytics: AnalyticsLog,
    responses: Vec<AssessmentResponse>,
    assessment_type: Option<AssessmentType>,
    tech_stack: Vec<TechStackEntry>,
}

impl Engine {
    /// Open an engine over `backend`, restoring the last submission and tech
    /// stack from storage.
    ///
    /// Fails only on invalid configuration; storage problems degrade to an
    /// empty engine.
    pub fn open(
        backend: StorageBackend,
        clock: Clock,
        config: EngineConfig,
        tiers: TierTable,
        network: RouteNetwork,
    ) -> Result<Self, FlightpathError> {
        config.validate()?;

        let mut cache = PersistentCache::new(backend, clock, &config.cache);
        let responses: Vec<AssessmentResponse> = cache
            .get_item(KEY_ASSESSMENT_RESPONSES, None)
            .unwrap_or_default();
        let assessment_type = cache.get_item(KEY_ASSESSMENT_TYPE, None);
        let tech_stack: Vec<TechStackEntry> =
            cache.get_item(KEY_TECH_STACK, None).unwrap_or_default();

        tracing::info!(
            persistent = cache.backend().is_persistent(),
            responses = responses.len(),
            tools = tech_stack.len(),
            routes = network.routes().len(),
            "engine opened"
        );

        Ok(Self {
            analytics: AnalyticsLog::new(config.analytics.max_events),
            ledger: HistoryLedger::new(),
            cache,
            config,
            tiers,
            network,
            responses,
            assessment_type,
            tech_stack,
        })
    }

    /// Engine over a fresh in-memory store with default configuration and
    /// reference data.
    pub fn in_memory() -> Result<Self, FlightpathError> {
        Self::open(
            StorageBackend::default(),
            Clock::System,
            EngineConfig::default(),
            TierTable::default(),
            default_network()?,
        )
    }

    // =========================================================================
    // SUBMISSIONS
    // =========================================================================

    /// Submit a quick assessment. Returns the ledger entry it produced, or
    /// `None` for an empty submission.
    pub fn submit_quick_assessment(
        &mut self,
        responses: &[AssessmentResponse],
    ) -> Option<HistoryEntry> {
        self.submit(AssessmentType::Quick, responses)
    }

    /// Submit a deep assessment. Returns the ledger entry it produced, or
    /// `None` for an empty submission.
    pub fn submit_deep_assessment(
        &mut self,
        responses: &[AssessmentResponse],
    ) -> Option<HistoryEntry> {
        self.submit(AssessmentType::Deep, responses)
    }

    fn submit(
        &mut self,
        assessment_type: AssessmentType,
        responses: &[AssessmentResponse],
    ) -> Option<HistoryEntry> {
        let responses = dedupe_responses(responses);
        if responses.is_empty() {
            tracing::warn!(%assessment_type, "ignoring empty assessment submission");
            return None;
        }

        self.responses = responses;
        self.assessment_type = Some(assessment_type);
        self.cache
            .set_item(KEY_ASSESSMENT_RESPONSES, &self.responses, false);
        self.cache
            .set_item(KEY_ASSESSMENT_TYPE, &assessment_type, false);
        progress::clear(&mut self.cache);

        let snapshot = self.snapshot();
        let entry = HistoryEntry {
            timestamp: self.cache.now_ms(),
            assessment_type,
            combined_score: snapshot.combined_score,
            plane_level: snapshot.plane_level.name.clone(),
            flight_miles: snapshot.flight_miles,
            unlocked_routes: snapshot.unlocked_routes.clone(),
            readiness_score: snapshot.reao.readiness,
            efficiency_score: snapshot.reao.efficiency,
            alignment_score: snapshot.reao.alignment,
            opportunity_score: snapshot.reao.opportunity,
        };
        self.ledger.append(&mut self.cache, entry.clone());

        let mut properties = BTreeMap::new();
        properties.insert("assessmentType".to_string(), Value::from(assessment_type.as_str()));
        properties.insert("combinedScore".to_string(), Value::from(entry.combined_score));
        properties.insert("planeLevel".to_string(), Value::from(entry.plane_level.clone()));
        self.analytics
            .record(&mut self.cache, "assessment_submitted", properties);

        tracing::info!(
            %assessment_type,
            combined_score = entry.combined_score,
            plane_level = %entry.plane_level,
            flight_miles = entry.flight_miles,
            unlocked_routes = entry.unlocked_routes.len(),
            "assessment submitted"
        );
        Some(entry)
    }

    /// Replace the tech stack. An empty stack hands its weight back to the
    /// assessment.
    pub fn set_tech_stack(&mut self, entries: &[TechStackEntry]) {
        self.tech_stack = entries
            .iter()
            .map(|e| TechStackEntry::new(e.name.clone(), e.category.clone(), e.utilization_score))
            .collect();
        self.cache.set_item(KEY_TECH_STACK, &self.tech_stack, false);

        let mut properties = BTreeMap::new();
        properties.insert("tools".to_string(), Value::from(self.tech_stack.len()));
        self.analytics
            .record(&mut self.cache, "tech_stack_updated", properties);
    }

    // =========================================================================
    // DERIVED READS
    // =========================================================================

    /// Whether any assessment has been submitted.
    #[must_use]
    pub fn has_assessment(&self) -> bool {
        !self.responses.is_empty()
    }

    /// Score Aggregator output for the live inputs.
    ///
    /// All zero until the first submission, even with a tech stack entered.
    #[must_use]
    pub fn score(&self) -> ScoreBreakdown {
        if !self.has_assessment() {
            return ScoreBreakdown::default();
        }
        aggregate(&self.responses, &self.tech_stack, &self.config.weights)
    }

    /// Recompute every derived field.
    ///
    /// With no assessment yet, the downstream stages are skipped: score 0,
    /// no miles, empty route and city sets.
    #[must_use]
    pub fn snapshot(&self) -> EngineSnapshot {
        let score = self.score();
        let plane_level = self.tiers.classify(score.combined_score).clone();

        if !self.has_assessment() {
            return EngineSnapshot {
                score,
                combined_score: 0,
                plane_level,
                flight_miles: 0,
                unlocked_city_count: 0,
                unlocked_routes: Vec::new(),
                route_statuses: BTreeMap::new(),
                city_states: BTreeMap::new(),
                reao: ReaoScores::default(),
            };
        }

        let resolution = resolve(score.combined_score, &self.network, &self.config.miles);
        EngineSnapshot {
            combined_score: score.combined_score,
            plane_level,
            flight_miles: resolution.flight_miles,
            unlocked_city_count: resolution.unlocked_city_count,
            unlocked_routes: unlocked_routes(&resolution.route_statuses),
            route_statuses: resolution.route_statuses,
            city_states: resolution.city_states,
            reao: live_reao(&self.responses, &self.tech_stack, &score, &self.config.weights),
            score,
        }
    }

    #[must_use]
    pub fn combined_score(&self) -> u8 {
        self.score().combined_score
    }

    #[must_use]
    pub fn plane_level(&self) -> PlaneLevel {
        self.tiers.classify(self.combined_score()).clone()
    }

    /// Progress through the current plane level.
    #[must_use]
    pub fn tier_progress(&self) -> TierProgress {
        self.tiers.progress(self.combined_score())
    }

    #[must_use]
    pub fn flight_miles(&self) -> u64 {
        self.snapshot().flight_miles
    }

    #[must_use]
    pub fn reao(&self) -> ReaoScores {
        self.snapshot().reao
    }

    #[must_use]
    pub fn readiness_score(&self) -> u8 {
        self.reao().readiness
    }

    #[must_use]
    pub fn efficiency_score(&self) -> u8 {
        self.reao().efficiency
    }

    #[must_use]
    pub fn alignment_score(&self) -> u8 {
        self.reao().alignment
    }

    #[must_use]
    pub fn opportunity_score(&self) -> u8 {
        self.reao().opportunity
    }

    #[must_use]
    pub fn unlocked_routes(&self) -> Vec<RouteId> {
        self.snapshot().unlocked_routes
    }

    /// Status of one route. Unknown routes, and every route before the first
    /// submission, read as locked with no progress.
    #[must_use]
    pub fn get_route_status(&self, route_id: &RouteId) -> RouteStatus {
        self.snapshot()
            .route_statuses
            .get(route_id)
            .copied()
            .unwrap_or_default()
    }

    /// Derived unlock state of every city (map coloring).
    #[must_use]
    pub fn city_states(&self) -> BTreeMap<CityId, UnlockState> {
        self.snapshot().city_states
    }

    #[must_use]
    pub fn assessment_type(&self) -> Option<AssessmentType> {
        self.assessment_type
    }

    #[must_use]
    pub fn responses(&self) -> &[AssessmentResponse] {
        &self.responses
    }

    #[must_use]
    pub fn tech_stack(&self) -> &[TechStackEntry] {
        &self.tech_stack
    }

    // =========================================================================
    // HISTORY
    // =========================================================================

    /// Ledger entries, oldest first.
    pub fn get_assessment_history(&mut self) -> Vec<HistoryEntry> {
        self.ledger.history(&mut self.cache)
    }

    /// Remove the whole ledger.
    pub fn clear_history(&mut self) {
        let removed = self.ledger.len(&mut self.cache);
        self.ledger.clear(&mut self.cache);

        let mut properties = BTreeMap::new();
        properties.insert("entriesRemoved".to_string(), Value::from(removed));
        self.analytics
            .record(&mut self.cache, "history_cleared", properties);
        tracing::info!(removed, "assessment history cleared");
    }

    /// First-vs-last deltas across the ledger.
    pub fn history_trend(&mut self) -> Option<HistoryTrend> {
        HistoryTrend::from_entries(&self.get_assessment_history())
    }

    // =========================================================================
    // PROJECTION
    // =========================================================================

    /// What-if run against hypothetical inputs. Touches no persisted state.
    #[must_use]
    pub fn project(
        &self,
        responses: &[AssessmentResponse],
        tech_stack: &[TechStackEntry],
    ) -> ProjectedResult {
        projection::project(responses, tech_stack, &self.network, &self.tiers, &self.config)
    }

    /// What-if run for a slider-chosen combined score. Touches no persisted state.
    #[must_use]
    pub fn project_score(&self, combined_score: u8) -> ProjectedResult {
        projection::project_score(combined_score, &self.network, &self.tiers, &self.config)
    }

    // =========================================================================
    // ASSESSMENT PROGRESS
    // =========================================================================

    pub fn save_assessment_progress(&mut self, progress: &AssessmentProgress) {
        progress::save(
            &mut self.cache,
            progress,
            self.config.cache.assessment_progress_ttl_ms,
        );
    }

    /// Unfinished assessment, if one was saved within the TTL.
    pub fn assessment_progress(&mut self) -> Option<AssessmentProgress> {
        progress::load(&mut self.cache, self.config.cache.assessment_progress_ttl_ms)
    }

    pub fn clear_assessment_progress(&mut self) {
        progress::clear(&mut self.cache);
    }

    // =========================================================================
    // SCENARIOS, PROFILE, ANALYTICS
    // =========================================================================

    pub fn set_scenario_status(&mut self, scenario_id: &str, status: ScenarioStatus) {
        let mut statuses = self.scenario_statuses();
        statuses.insert(scenario_id.to_string(), status);
        self.cache.set_item(KEY_SCENARIO_STATUSES, &statuses, false);
    }

    pub fn scenario_statuses(&mut self) -> BTreeMap<String, ScenarioStatus> {
        self.cache
            .get_item(KEY_SCENARIO_STATUSES, None)
            .unwrap_or_default()
    }

    pub fn set_user_profile(&mut self, profile: &UserProfile) {
        self.cache.set_item(KEY_USER_PROFILE, profile, false);
    }

    pub fn user_profile(&mut self) -> UserProfile {
        self.cache
            .get_item(KEY_USER_PROFILE, None)
            .unwrap_or_default()
    }

    pub fn analytics_events(&mut self) -> Vec<AnalyticsEvent> {
        self.analytics.events(&mut self.cache)
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Flush debounced writes if their deadline has passed.
    pub fn tick(&mut self) -> bool {
        self.cache.tick()
    }

    /// Write every pending change to durable storage now.
    pub fn flush(&mut self) {
        self.cache.flush();
    }

    #[must_use]
    pub fn cache(&self) -> &PersistentCache {
        &self.cache
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn tiers(&self) -> &TierTable {
        &self.tiers
    }

    #[must_use]
    pub fn network(&self) -> &RouteNetwork {
        &self.network
    }
}

// =============================================================================
// TESTS
// =============================================================================
