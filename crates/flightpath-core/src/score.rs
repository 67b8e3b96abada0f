//! # Score Aggregator
//!
//! Combines assessment responses and tech-stack entries into a `[0, 100]`
//! combined score, and derives the live REAO breakdown from category-level
//! response averages.
//!
//! ## Weighting Policy
//!
//! With a non-empty tech stack the combined score is
//! `round(assessment * W_A + tech_stack * W_T)`. With an empty tech stack the
//! assessment takes the full weight: `combined == assessment`. The missing
//! share is reassigned, never silently dropped.
//!
//! All arithmetic is integer: weights are percentages and rounding is
//! half-up on exact rationals. The tech-stack mean enters the blend as an
//! exact `sum / count` pair, so the blend is rounded once.

use crate::config::ScoreWeights;
use crate::types::{AssessmentResponse, MAX_SCORE, ReaoScores, TechStackEntry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// INTEGER HELPERS
// =============================================================================

/// `round(sum / count)` with halves rounded up. Returns 0 for `count == 0`.
#[must_use]
pub(crate) fn rounded_mean(sum: u64, count: u64) -> u64 {
    if count == 0 {
        return 0;
    }
    (sum.saturating_mul(2).saturating_add(count)) / count.saturating_mul(2)
}

/// `round(value * percent / 100)` with halves rounded up.
#[must_use]
pub(crate) fn percent_of(value: u64, percent: u64) -> u64 {
    (value.saturating_mul(percent).saturating_add(50)) / 100
}

fn clamp_score(value: u64) -> u8 {
    value.min(u64::from(MAX_SCORE)) as u8
}

// =============================================================================
// AGGREGATION
// =============================================================================

/// Output of the Score Aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub assessment_score: u8,
    /// `None` when no tech stack has been entered.
    pub tech_stack_score: Option<u8>,
    pub combined_score: u8,
}

/// Mean response score, rounded. 0 for an empty response set.
#[must_use]
pub fn assessment_score(responses: &[AssessmentResponse]) -> u8 {
    let sum: u64 = responses.iter().map(|r| u64::from(r.clamped_score())).sum();
    clamp_score(rounded_mean(sum, responses.len() as u64))
}

/// Unrounded mean of `utilization * 10` over a tech stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TechStackMean {
    sum: u64,
    count: u64,
}

impl TechStackMean {
    /// `None` for an empty stack.
    #[must_use]
    pub fn of(tech_stack: &[TechStackEntry]) -> Option<Self> {
        if tech_stack.is_empty() {
            return None;
        }
        let sum = tech_stack
            .iter()
            .map(|t| u64::from(t.clamped_utilization()) * 10)
            .sum();
        Some(Self {
            sum,
            count: tech_stack.len() as u64,
        })
    }

    /// The mean rounded for display.
    #[must_use]
    pub fn rounded(&self) -> u8 {
        clamp_score(rounded_mean(self.sum, self.count))
    }
}

/// Mean of `utilization * 10`, rounded. `None` for an empty stack.
#[must_use]
pub fn tech_stack_score(tech_stack: &[TechStackEntry]) -> Option<u8> {
    TechStackMean::of(tech_stack).map(|mean| mean.rounded())
}

/// Blend an assessment score with an optional tech-stack mean.
///
/// `round((A * W_A * n + sum * W_T) / (100 * n))`: the tech-stack mean is
/// never rounded before weighting.
#[must_use]
pub fn combine(assessment: u8, tech_stack: Option<TechStackMean>, weights: &ScoreWeights) -> u8 {
    match tech_stack {
        Some(mean) => {
            let weighted = u64::from(assessment)
                * u64::from(weights.assessment_percent)
                * mean.count
                + mean.sum * u64::from(weights.tech_stack_percent);
            clamp_score(rounded_mean(weighted, 100 * mean.count))
        }
        None => assessment,
    }
}

/// Run the Score Aggregator.
///
/// Pure. An empty `responses` slice yields an assessment score of 0; callers
/// treat that as "no assessment yet" and skip the downstream stages.
#[must_use]
pub fn aggregate(
    responses: &[AssessmentResponse],
    tech_stack: &[TechStackEntry],
    weights: &ScoreWeights,
) -> ScoreBreakdown {
    let assessment = assessment_score(responses);
    let tech = TechStackMean::of(tech_stack);
    ScoreBreakdown {
        assessment_score: assessment,
        tech_stack_score: tech.map(|mean| mean.rounded()),
        combined_score: combine(assessment, tech, weights),
    }
}

/// Collapse duplicate question ids, keeping the last answer given.
///
/// Output is ordered by question id.
#[must_use]
pub fn dedupe_responses(responses: &[AssessmentResponse]) -> Vec<AssessmentResponse> {
    let mut by_question: BTreeMap<u32, &AssessmentResponse> = BTreeMap::new();
    for response in responses {
        by_question.insert(response.question_id, response);
    }
    by_question.into_values().cloned().collect()
}

// =============================================================================
// LIVE REAO BREAKDOWN
// =============================================================================

/// One of the four REAO dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReaoDimension {
    Readiness,
    Efficiency,
    Alignment,
    Opportunity,
}

const READINESS_KEYWORDS: &[&str] = &[
    "readiness",
    "strategy",
    "leadership",
    "budget",
    "team",
    "skills",
];
const EFFICIENCY_KEYWORDS: &[&str] = &[
    "efficiency",
    "technology",
    "tech",
    "automation",
    "operations",
    "process",
];
const ALIGNMENT_KEYWORDS: &[&str] = &[
    "alignment",
    "data",
    "analytics",
    "measurement",
    "attribution",
    "sales",
];
const OPPORTUNITY_KEYWORDS: &[&str] = &[
    "opportunity",
    "growth",
    "content",
    "channels",
    "channel",
    "customer",
    "innovation",
];

impl ReaoDimension {
    /// Map a question category onto a dimension by keyword.
    ///
    /// Categories are split on non-alphanumeric characters and compared
    /// case-insensitively, so `"Data & Analytics"` maps to `Alignment`.
    #[must_use]
    pub fn for_category(category: &str) -> Option<Self> {
        let lowered = category.to_ascii_lowercase();
        let tokens: Vec<&str> = lowered
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();

        let table: [(ReaoDimension, &[&str]); 4] = [
            (ReaoDimension::Readiness, READINESS_KEYWORDS),
            (ReaoDimension::Efficiency, EFFICIENCY_KEYWORDS),
            (ReaoDimension::Alignment, ALIGNMENT_KEYWORDS),
            (ReaoDimension::Opportunity, OPPORTUNITY_KEYWORDS),
        ];
        table
            .into_iter()
            .find(|(_, keywords)| tokens.iter().any(|t| keywords.contains(t)))
            .map(|(dimension, _)| dimension)
    }
}

/// Category-level REAO scores for the live engine.
///
/// Each dimension is the rounded mean of the responses whose category maps to
/// it; a dimension without responses falls back to the combined score.
/// Efficiency additionally blends in the tech-stack mean with the configured
/// weights when a stack exists.
#[must_use]
pub fn live_reao(
    responses: &[AssessmentResponse],
    tech_stack: &[TechStackEntry],
    breakdown: &ScoreBreakdown,
    weights: &ScoreWeights,
) -> ReaoScores {
    if responses.is_empty() {
        return ReaoScores::default();
    }

    let mut sums: BTreeMap<ReaoDimension, (u64, u64)> = BTreeMap::new();
    for response in responses {
        if let Some(dimension) = ReaoDimension::for_category(&response.category) {
            let slot = sums.entry(dimension).or_insert((0, 0));
            slot.0 += u64::from(response.clamped_score());
            slot.1 += 1;
        }
    }

    let dimension_score = |dimension: ReaoDimension| -> u8 {
        sums.get(&dimension)
            .map(|&(sum, count)| clamp_score(rounded_mean(sum, count)))
            .unwrap_or(breakdown.combined_score)
    };

    let efficiency_base = dimension_score(ReaoDimension::Efficiency);

    ReaoScores {
        readiness: dimension_score(ReaoDimension::Readiness),
        efficiency: combine(efficiency_base, TechStackMean::of(tech_stack), weights),
        alignment: dimension_score(ReaoDimension::Alignment),
        opportunity: dimension_score(ReaoDimension::Opportunity),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn responses(scores: &[u8]) -> Vec<AssessmentResponse> {
        scores
            .iter()
            .enumerate()
            .map(|(i, &s)| AssessmentResponse::new(i as u32, "strategy", s))
            .collect()
    }

    fn stack(utilizations: &[u8]) -> Vec<TechStackEntry> {
        utilizations
            .iter()
            .enumerate()
            .map(|(i, &u)| TechStackEntry::new(format!("tool-{i}"), "crm", u))
            .collect()
    }

    #[test]
    fn rounded_mean_rounds_half_up() {
        assert_eq!(rounded_mean(131, 2), 66); // 65.5
        assert_eq!(rounded_mean(130, 2), 65);
        assert_eq!(rounded_mean(10, 3), 3); // 3.33
        assert_eq!(rounded_mean(0, 0), 0);
    }

    #[test]
    fn worked_example_combines_to_67() {
        let weights = ScoreWeights::default();
        let result = aggregate(&responses(&[60, 70, 65]), &stack(&[7, 7, 7]), &weights);

        assert_eq!(result.assessment_score, 65);
        assert_eq!(result.tech_stack_score, Some(70));
        assert_eq!(result.combined_score, 67);
    }

    #[test]
    fn empty_tech_stack_reassigns_full_weight() {
        let weights = ScoreWeights::default();
        let result = aggregate(&responses(&[40, 81]), &[], &weights);

        assert_eq!(result.tech_stack_score, None);
        assert_eq!(result.combined_score, result.assessment_score);
        assert_eq!(result.combined_score, 61);
    }

    #[test]
    fn tech_stack_mean_is_rounded_only_in_the_blend() {
        let weights = ScoreWeights::default();
        // Tech mean 11.67 displays as 12; 7 * 0.7 + 11.67 * 0.3 = 8.4
        let result = aggregate(&responses(&[7]), &stack(&[1, 1, 1, 1, 1, 2]), &weights);

        assert_eq!(result.tech_stack_score, Some(12));
        assert_eq!(result.combined_score, 8);
    }

    #[test]
    fn empty_input_is_zero() {
        let result = aggregate(&[], &[], &ScoreWeights::default());
        assert_eq!(result, ScoreBreakdown::default());
    }

    #[test]
    fn extremes_stay_in_range() {
        let weights = ScoreWeights::default();
        let top = aggregate(&responses(&[100, 100]), &stack(&[10]), &weights);
        assert_eq!(top.combined_score, 100);

        let bottom = aggregate(&responses(&[0]), &stack(&[1]), &weights);
        assert_eq!(bottom.combined_score, 3);
    }

    #[test]
    fn dedupe_keeps_last_answer() {
        let input = vec![
            AssessmentResponse::new(2, "data", 10),
            AssessmentResponse::new(1, "data", 50),
            AssessmentResponse::new(2, "data", 90),
        ];
        let deduped = dedupe_responses(&input);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].question_id, 1);
        assert_eq!(deduped[1].score, 90);
    }

    #[test]
    fn category_keywords_map_to_dimensions() {
        assert_eq!(
            ReaoDimension::for_category("Data & Analytics"),
            Some(ReaoDimension::Alignment)
        );
        assert_eq!(
            ReaoDimension::for_category("Marketing Automation"),
            Some(ReaoDimension::Efficiency)
        );
        assert_eq!(
            ReaoDimension::for_category("growth"),
            Some(ReaoDimension::Opportunity)
        );
        assert_eq!(ReaoDimension::for_category("misc"), None);
    }

    #[test]
    fn live_reao_uses_category_means_with_fallback() {
        let weights = ScoreWeights::default();
        let input = vec![
            AssessmentResponse::new(1, "strategy", 80),
            AssessmentResponse::new(2, "strategy", 60),
            AssessmentResponse::new(3, "data", 40),
        ];
        let breakdown = aggregate(&input, &[], &weights);
        let reao = live_reao(&input, &[], &breakdown, &weights);

        assert_eq!(reao.readiness, 70);
        assert_eq!(reao.alignment, 40);
        // No efficiency or opportunity questions: combined score fallback.
        assert_eq!(reao.efficiency, breakdown.combined_score);
        assert_eq!(reao.opportunity, breakdown.combined_score);
    }

    #[test]
    fn live_efficiency_blends_tech_stack() {
        let weights = ScoreWeights::default();
        let input = vec![AssessmentResponse::new(1, "operations", 50)];
        let tools = stack(&[10]);
        let breakdown = aggregate(&input, &tools, &weights);
        let reao = live_reao(&input, &tools, &breakdown, &weights);

        // round(50 * 0.7 + 100 * 0.3) = 65
        assert_eq!(reao.efficiency, 65);
    }
}
