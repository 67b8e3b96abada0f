//! # Assessment Progress
//!
//! In-flight answers of an unfinished assessment, so a user can resume where
//! they left off. Stored with a TTL (24 hours by default); an expired record
//! reads as absent and is removed from durable storage.

use crate::primitives::KEY_ASSESSMENT_PROGRESS;
use crate::storage::PersistentCache;
use crate::types::{AssessmentResponse, AssessmentType};
use serde::{Deserialize, Serialize};

/// Snapshot of an unfinished assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentProgress {
    pub assessment_type: AssessmentType,
    pub answers: Vec<AssessmentResponse>,
    /// Index of the question the user was on.
    pub current_question: u32,
}

/// Save progress, debounced: answers change on every click.
pub fn save(cache: &mut PersistentCache, progress: &AssessmentProgress, ttl_ms: u64) {
    cache.set_item_with_ttl(KEY_ASSESSMENT_PROGRESS, progress, Some(ttl_ms), false);
}

/// Load progress if present and younger than `ttl_ms`.
#[must_use]
pub fn load(cache: &mut PersistentCache, ttl_ms: u64) -> Option<AssessmentProgress> {
    cache.get_item(KEY_ASSESSMENT_PROGRESS, Some(ttl_ms))
}

pub fn clear(cache: &mut PersistentCache) {
    cache.remove_item(KEY_ASSESSMENT_PROGRESS);
}
