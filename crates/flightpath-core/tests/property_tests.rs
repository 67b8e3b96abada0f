//! # Property-Based Tests
//!
//! Range, partition, monotonicity and isolation invariants of the
//! progression pipeline, checked with proptest.

use flightpath_core::config::{MilesRates, ScoreWeights};
use flightpath_core::routes::{current_progress, evaluate};
use flightpath_core::score::{aggregate, assessment_score};
use flightpath_core::{
    AssessmentResponse, Engine, Route, TechStackEntry, TierTable, UnlockState, default_network,
    resolve,
};
use proptest::collection::vec;
use proptest::prelude::*;

const CATEGORIES: &[&str] = &["strategy", "data", "content", "technology", "growth", "misc"];

fn responses_strategy() -> impl Strategy<Value = Vec<AssessmentResponse>> {
    vec((0u32..40, 0usize..CATEGORIES.len(), any::<u8>()), 0..30).prop_map(|items| {
        items
            .into_iter()
            .map(|(id, category, score)| AssessmentResponse {
                question_id: id,
                category: CATEGORIES[category].to_string(),
                score,
            })
            .collect()
    })
}

fn stack_strategy() -> impl Strategy<Value = Vec<TechStackEntry>> {
    vec(("[a-z]{3,8}", any::<u8>()), 0..10).prop_map(|items| {
        items
            .into_iter()
            .map(|(name, utilization)| TechStackEntry {
                name,
                category: "tools".to_string(),
                utilization_score: utilization,
            })
            .collect()
    })
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// The combined score stays in 0..=100 even for out-of-range raw inputs.
    #[test]
    fn combined_score_in_range(
        responses in responses_strategy(),
        stack in stack_strategy(),
    ) {
        let breakdown = aggregate(&responses, &stack, &ScoreWeights::default());
        prop_assert!(breakdown.combined_score <= 100);
        prop_assert!(breakdown.assessment_score <= 100);
        if let Some(tech) = breakdown.tech_stack_score {
            prop_assert!(tech <= 100);
        }
    }

    /// Without a tech stack the assessment carries the full weight.
    #[test]
    fn empty_stack_hands_weight_to_assessment(responses in responses_strategy()) {
        let breakdown = aggregate(&responses, &[], &ScoreWeights::default());
        prop_assert_eq!(breakdown.tech_stack_score, None);
        prop_assert_eq!(breakdown.combined_score, assessment_score(&responses));
    }

    /// Every score belongs to exactly one default plane level.
    #[test]
    fn tiers_partition_score_range(score in 0u8..=100) {
        let tiers = TierTable::default();
        let matching = tiers.levels().iter().filter(|level| level.contains(score)).count();
        prop_assert_eq!(matching, 1);
        prop_assert!(tiers.classify(score).contains(score));
    }

    /// Progress is a percentage, and an unlocked route always reports its
    /// state consistently with both thresholds.
    #[test]
    fn route_status_consistent(
        required_score in 0u8..=100,
        required_miles in 0u64..20_000,
        score in 0u8..=100,
        miles in 0u64..30_000,
    ) {
        let route = Route::new("r", "a", "b", required_score, required_miles);
        let status = evaluate(&route, score, miles);

        prop_assert!(status.current_progress <= 100);
        let both_met = score >= required_score && miles >= required_miles;
        prop_assert_eq!(status.status == UnlockState::Unlocked, both_met);
    }

    /// More score or more miles never lowers route progress.
    #[test]
    fn route_progress_monotone(
        required_score in 0u8..=100,
        required_miles in 0u64..20_000,
        score in 0u8..100,
        miles in 0u64..30_000,
        extra_miles in 0u64..5_000,
    ) {
        let route = Route::new("r", "a", "b", required_score, required_miles);
        let base = current_progress(&route, score, miles);
        prop_assert!(current_progress(&route, score + 1, miles) >= base);
        prop_assert!(current_progress(&route, score, miles + extra_miles) >= base);
    }

    /// Route status follows Locked < Partial < Unlocked and never drops when
    /// score or miles grow.
    #[test]
    fn route_status_monotone(
        required_score in 0u8..=100,
        required_miles in 0u64..20_000,
        score in 0u8..=100,
        miles in 0u64..30_000,
        extra_score in 0u8..=100,
        extra_miles in 0u64..10_000,
    ) {
        let route = Route::new("r", "a", "b", required_score, required_miles);
        let base = evaluate(&route, score, miles).status;
        let grown_score = score.saturating_add(extra_score).min(100);

        prop_assert!(evaluate(&route, grown_score, miles).status >= base);
        prop_assert!(evaluate(&route, score, miles + extra_miles).status >= base);
        prop_assert!(evaluate(&route, grown_score, miles + extra_miles).status >= base);
    }

    /// A higher score never yields fewer miles or fewer unlocked routes.
    #[test]
    fn resolution_monotone_in_score(score in 0u8..100, bump in 1u8..=20) {
        let network = default_network().expect("network");
        let rates = MilesRates::default();
        let higher = score.saturating_add(bump).min(100);

        let low = resolve(score, &network, &rates);
        let high = resolve(higher, &network, &rates);

        prop_assert!(high.flight_miles >= low.flight_miles);
        prop_assert!(high.unlocked_city_count >= low.unlocked_city_count);
        for (id, status) in &low.route_statuses {
            if status.status == UnlockState::Unlocked {
                prop_assert_eq!(high.route_statuses[id].status, UnlockState::Unlocked);
            }
        }
    }

    /// Resolution is self-consistent: miles match the unlocked-city count.
    #[test]
    fn resolution_is_fixed_point(score in 0u8..=100) {
        let network = default_network().expect("network");
        let rates = MilesRates::default();
        let resolution = resolve(score, &network, &rates);

        let unlocked = resolution
            .city_states
            .values()
            .filter(|state| **state == UnlockState::Unlocked)
            .count();
        prop_assert_eq!(unlocked, resolution.unlocked_city_count);
        prop_assert_eq!(
            resolution.flight_miles,
            u64::from(score) * rates.per_score_point + unlocked as u64 * rates.per_unlocked_city
        );
    }

    /// Projections never change what the live engine reports.
    #[test]
    fn projection_leaves_engine_untouched(
        live in responses_strategy(),
        hypothetical in responses_strategy(),
        stack in stack_strategy(),
        slider in 0u8..=100,
    ) {
        let mut engine = Engine::in_memory().expect("engine");
        engine.submit_quick_assessment(&live);

        let before = engine.snapshot();
        let history_before = engine.get_assessment_history();
        let stats_before = engine.cache().stats();

        let projected = engine.project(&hypothetical, &stack);
        let slid = engine.project_score(slider);
        prop_assert!(projected.combined_score <= 100);
        prop_assert_eq!(slid.combined_score, slider);

        prop_assert_eq!(engine.snapshot(), before);
        prop_assert_eq!(engine.cache().stats(), stats_before);
        prop_assert_eq!(engine.get_assessment_history(), history_before);
    }
}
