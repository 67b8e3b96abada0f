//! # Projection Engine ("what-if")
//!
//! Re-runs Score Aggregator → Tier Classifier → Currency Calculator → Route
//! Unlock Evaluator against hypothetical inputs.
//!
//! Nothing in this module can reach the cache or the ledger: every function
//! takes only values and reference data. Running a projection any number of
//! times leaves the live engine untouched.
//!
//! ## Simplified REAO
//!
//! Projected REAO scores are linear transforms of the combined score using
//! the configured multipliers (readiness 100%, efficiency 90%, alignment 85%,
//! opportunity 110%, each capped at 100). This is deliberately separate from
//! the live category-level breakdown in [`crate::score::live_reao`].

use crate::config::{EngineConfig, ProjectionMultipliers};
use crate::routes::{RouteNetwork, resolve, unlocked_routes};
use crate::score::{aggregate, dedupe_responses, percent_of};
use crate::tier::{PlaneLevel, TierTable};
use crate::types::{
    AssessmentResponse, MAX_SCORE, ReaoScores, RouteId, RouteStatus, TechStackEntry,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// Same shape as a live engine read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectedResult {
    pub combined_score: u8,
    pub plane_level: PlaneLevel,
    pub flight_miles: u64,
    pub unlocked_routes: Vec<RouteId>,
    pub route_statuses: BTreeMap<RouteId, RouteStatus>,
    pub reao: ReaoScores,
}

/// REAO scores as fixed multiples of the combined score.
#[must_use]
pub fn projected_reao(combined_score: u8, multipliers: &ProjectionMultipliers) -> ReaoScores {
    let scale = |percent: u16| -> u8 {
        percent_of(u64::from(combined_score), u64::from(percent)).min(u64::from(MAX_SCORE)) as u8
    };
    ReaoScores {
        readiness: scale(multipliers.readiness_percent),
        efficiency: scale(multipliers.efficiency_percent),
        alignment: scale(multipliers.alignment_percent),
        opportunity: scale(multipliers.opportunity_percent),
    }
}

/// Project a combined score set directly (simulator sliders).
#[must_use]
pub fn project_score(
    combined_score: u8,
    network: &RouteNetwork,
    tiers: &TierTable,
    config: &EngineConfig,
) -> ProjectedResult {
    let combined_score = combined_score.min(MAX_SCORE);
    let resolution = resolve(combined_score, network, &config.miles);

    ProjectedResult {
        combined_score,
        plane_level: tiers.classify(combined_score).clone(),
        flight_miles: resolution.flight_miles,
        unlocked_routes: unlocked_routes(&resolution.route_statuses),
        route_statuses: resolution.route_statuses,
        reao: projected_reao(combined_score, &config.projection),
    }
}

/// Project hypothetical responses and tech stack.
///
/// Without responses there is no assessment to project: the result is the
/// zero-score level with no miles, routes or REAO scores, whatever the stack.
#[must_use]
pub fn project(
    responses: &[AssessmentResponse],
    tech_stack: &[TechStackEntry],
    network: &RouteNetwork,
    tiers: &TierTable,
    config: &EngineConfig,
) -> ProjectedResult {
    let responses = dedupe_responses(responses);
    if responses.is_empty() {
        return ProjectedResult {
            combined_score: 0,
            plane_level: tiers.classify(0).clone(),
            flight_miles: 0,
            unlocked_routes: Vec::new(),
            route_statuses: BTreeMap::new(),
            reao: ReaoScores::default(),
        };
    }
    let breakdown = aggregate(&responses, tech_stack, &config.weights);
    project_score(breakdown.combined_score, network, tiers, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::default_network;
    use crate::types::UnlockState;

    #[test]
    fn multipliers_scale_and_cap() {
        let reao = projected_reao(95, &ProjectionMultipliers::default());
        assert_eq!(reao.readiness, 95);
        assert_eq!(reao.efficiency, 86); // 85.5 rounds up
        assert_eq!(reao.alignment, 81); // 80.75
        assert_eq!(reao.opportunity, 100); // 104.5 capped
    }

    #[test]
    fn projection_matches_pipeline() {
        let network = default_network().expect("network");
        let tiers = TierTable::default();
        let config = EngineConfig::default();
        let responses = vec![
            AssessmentResponse::new(1, "strategy", 60),
            AssessmentResponse::new(2, "data", 70),
            AssessmentResponse::new(3, "content", 65),
        ];
        let stack = vec![
            TechStackEntry::new("crm", "sales", 7),
            TechStackEntry::new("cms", "content", 7),
            TechStackEntry::new("esp", "email", 7),
        ];

        let result = project(&responses, &stack, &network, &tiers, &config);

        assert_eq!(result.combined_score, 67);
        assert_eq!(result.plane_level.name, "Commercial Jet");
        assert_eq!(result.reao.efficiency, 60);
        for id in &result.unlocked_routes {
            assert_eq!(result.route_statuses[id].status, UnlockState::Unlocked);
        }
    }

    #[test]
    fn tech_stack_without_responses_projects_nothing() {
        let network = default_network().expect("network");
        let tiers = TierTable::default();
        let stack = vec![TechStackEntry::new("crm", "sales", 10)];

        let result = project(&[], &stack, &network, &tiers, &EngineConfig::default());

        assert_eq!(result.combined_score, 0);
        assert_eq!(result.plane_level, *tiers.classify(0));
        assert_eq!(result.flight_miles, 0);
        assert!(result.unlocked_routes.is_empty());
        assert!(result.route_statuses.is_empty());
        assert_eq!(result.reao, ReaoScores::default());
    }

    #[test]
    fn slider_score_is_clamped() {
        let network = default_network().expect("network");
        let result = project_score(250, &network, &TierTable::default(), &EngineConfig::default());
        assert_eq!(result.combined_score, 100);
        assert_eq!(result.plane_level.name, "Supersonic");
    }
}
