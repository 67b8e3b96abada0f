//! # History Ledger
//!
//! Append-only, timestamp-ordered snapshots of engine outputs, one per
//! assessment submission.
//!
//! - `append` is the only mutation; entries are never updated in place
//! - `history` returns entries in ascending timestamp order
//! - `clear` removes the ledger key from every cache tier
//!
//! Every write goes through the cache immediately: losing a submission
//! snapshot on crash would be visible in the Flight Log. The ledger performs
//! no aggregation; see [`crate::trend`] for first-vs-last deltas.

use crate::primitives::KEY_ASSESSMENT_HISTORY;
use crate::storage::PersistentCache;
use crate::types::HistoryEntry;

/// Handle to the ledger stored under one cache key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryLedger {
    key: String,
}

impl Default for HistoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryLedger {
    /// Ledger under the standard `assessmentHistory` key.
    #[must_use]
    pub fn new() -> Self {
        Self::with_key(KEY_ASSESSMENT_HISTORY)
    }

    #[must_use]
    pub fn with_key(key: &str) -> Self {
        Self {
            key: key.to_string(),
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Append one snapshot.
    ///
    /// An entry stamped earlier than the newest one (clock adjustment) is
    /// slotted into timestamp order; existing entries are left untouched.
    pub fn append(&self, cache: &mut PersistentCache, entry: HistoryEntry) {
        let mut entries = self.history(cache);
        let position = entries.partition_point(|existing| existing.timestamp <= entry.timestamp);
        entries.insert(position, entry);
        cache.set_item(&self.key, &entries, true);
    }

    /// All snapshots, oldest first.
    #[must_use]
    pub fn history(&self, cache: &mut PersistentCache) -> Vec<HistoryEntry> {
        cache
            .get_item::<Vec<HistoryEntry>>(&self.key, None)
            .unwrap_or_default()
    }

    /// Number of stored snapshots.
    #[must_use]
    pub fn len(&self, cache: &mut PersistentCache) -> usize {
        self.history(cache).len()
    }

    #[must_use]
    pub fn is_empty(&self, cache: &mut PersistentCache) -> bool {
        self.len(cache) == 0
    }

    /// Remove the entire ledger.
    pub fn clear(&self, cache: &mut PersistentCache) {
        cache.remove_item(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AssessmentType;

    fn entry(timestamp: u64, score: u8) -> HistoryEntry {
        HistoryEntry {
            timestamp,
            assessment_type: AssessmentType::Quick,
            combined_score: score,
            plane_level: "Propeller".to_string(),
            flight_miles: u64::from(score) * 100,
            unlocked_routes: Vec::new(),
            readiness_score: score,
            efficiency_score: score,
            alignment_score: score,
            opportunity_score: score,
        }
    }

    #[test]
    fn append_grows_by_one_and_preserves_prior_entries() {
        let mut cache = PersistentCache::in_memory();
        let ledger = HistoryLedger::new();

        ledger.append(&mut cache, entry(10, 30));
        let before = ledger.history(&mut cache);
        ledger.append(&mut cache, entry(20, 40));
        let after = ledger.history(&mut cache);

        assert_eq!(after.len(), before.len() + 1);
        assert_eq!(after[0], before[0]);
    }

    #[test]
    fn out_of_order_timestamp_keeps_ascending_order() {
        let mut cache = PersistentCache::in_memory();
        let ledger = HistoryLedger::new();

        ledger.append(&mut cache, entry(100, 1));
        ledger.append(&mut cache, entry(300, 3));
        ledger.append(&mut cache, entry(200, 2));

        let timestamps: Vec<u64> = ledger.history(&mut cache).iter().map(|e| e.timestamp).collect();
        assert_eq!(timestamps, vec![100, 200, 300]);
    }

    #[test]
    fn equal_timestamps_keep_submission_order() {
        let mut cache = PersistentCache::in_memory();
        let ledger = HistoryLedger::new();

        ledger.append(&mut cache, entry(5, 10));
        ledger.append(&mut cache, entry(5, 20));

        let scores: Vec<u8> = ledger.history(&mut cache).iter().map(|e| e.combined_score).collect();
        assert_eq!(scores, vec![10, 20]);
    }

    #[test]
    fn clear_empties_ledger() {
        let mut cache = PersistentCache::in_memory();
        let ledger = HistoryLedger::new();

        ledger.append(&mut cache, entry(1, 50));
        ledger.clear(&mut cache);

        assert!(ledger.is_empty(&mut cache));
        assert!(ledger.history(&mut cache).is_empty());
    }
}
