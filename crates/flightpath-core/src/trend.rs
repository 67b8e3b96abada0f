//! # Flight Log Trend
//!
//! First-vs-last deltas across the history ledger, as shown on the Flight
//! Log page. Pure: computed from a slice of entries, never stored.

use crate::types::{HistoryEntry, RouteId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Signed change in each REAO dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReaoDelta {
    pub readiness: i16,
    pub efficiency: i16,
    pub alignment: i16,
    pub opportunity: i16,
}

/// Change between the first and the last ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryTrend {
    pub submissions: usize,
    pub first_timestamp: u64,
    pub last_timestamp: u64,
    pub first_plane_level: String,
    pub last_plane_level: String,
    pub score_delta: i16,
    pub miles_delta: i64,
    /// Routes unlocked at the last entry but not at the first.
    pub routes_gained: Vec<RouteId>,
    pub reao_delta: ReaoDelta,
}

fn delta(first: u8, last: u8) -> i16 {
    i16::from(last) - i16::from(first)
}

impl HistoryTrend {
    /// Trend over `entries` (ascending timestamp order). `None` when empty.
    #[must_use]
    pub fn from_entries(entries: &[HistoryEntry]) -> Option<Self> {
        let first = entries.first()?;
        let last = entries.last()?;

        let before: BTreeSet<&RouteId> = first.unlocked_routes.iter().collect();
        let routes_gained = last
            .unlocked_routes
            .iter()
            .filter(|route| !before.contains(route))
            .cloned()
            .collect();

        Some(Self {
            submissions: entries.len(),
            first_timestamp: first.timestamp,
            last_timestamp: last.timestamp,
            first_plane_level: first.plane_level.clone(),
            last_plane_level: last.plane_level.clone(),
            score_delta: delta(first.combined_score, last.combined_score),
            miles_delta: (last.flight_miles as i64).saturating_sub(first.flight_miles as i64),
            routes_gained,
            reao_delta: ReaoDelta {
                readiness: delta(first.readiness_score, last.readiness_score),
                efficiency: delta(first.efficiency_score, last.efficiency_score),
                alignment: delta(first.alignment_score, last.alignment_score),
                opportunity: delta(first.opportunity_score, last.opportunity_score),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AssessmentType;

    fn entry(timestamp: u64, score: u8, routes: &[&str]) -> HistoryEntry {
        HistoryEntry {
            timestamp,
            assessment_type: AssessmentType::Deep,
            combined_score: score,
            plane_level: if score > 60 { "Commercial Jet" } else { "Regional Jet" }.to_string(),
            flight_miles: u64::from(score) * 100,
            unlocked_routes: routes.iter().map(|r| RouteId::new(*r)).collect(),
            readiness_score: score,
            efficiency_score: score.saturating_sub(5),
            alignment_score: score,
            opportunity_score: 50,
        }
    }

    #[test]
    fn empty_history_has_no_trend() {
        assert!(HistoryTrend::from_entries(&[]).is_none());
    }

    #[test]
    fn first_vs_last_deltas() {
        let entries = vec![
            entry(1, 45, &["brand-content"]),
            entry(2, 80, &["brand-content", "content-seo"]),
            entry(3, 67, &["brand-content", "content-seo", "seo-analytics"]),
        ];

        let trend = HistoryTrend::from_entries(&entries).expect("trend");

        assert_eq!(trend.submissions, 3);
        assert_eq!(trend.score_delta, 22);
        assert_eq!(trend.miles_delta, 2200);
        assert_eq!(trend.first_plane_level, "Regional Jet");
        assert_eq!(trend.last_plane_level, "Commercial Jet");
        assert_eq!(
            trend.routes_gained,
            vec![RouteId::new("content-seo"), RouteId::new("seo-analytics")]
        );
        assert_eq!(trend.reao_delta.opportunity, 0);
    }

    #[test]
    fn declining_score_gives_negative_delta() {
        let entries = vec![entry(1, 70, &[]), entry(2, 50, &[])];
        let trend = HistoryTrend::from_entries(&entries).expect("trend");
        assert_eq!(trend.score_delta, -20);
        assert_eq!(trend.miles_delta, -2000);
    }
}
