//! # Analytics Log
//!
//! Capped ring buffer of product analytics events in durable storage.
//! When the buffer is full the oldest events are dropped first. Writes are
//! immediate.

use crate::primitives::KEY_ANALYTICS_EVENTS;
use crate::storage::PersistentCache;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One recorded event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub name: String,
    pub timestamp: u64,
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
}

/// Handle to the capped event log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsLog {
    key: String,
    max_events: usize,
}

impl AnalyticsLog {
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            key: KEY_ANALYTICS_EVENTS.to_string(),
            max_events: max_events.max(1),
        }
    }

    /// Append an event stamped with the cache clock.
    pub fn record(
        &self,
        cache: &mut PersistentCache,
        name: &str,
        properties: BTreeMap<String, Value>,
    ) {
        let mut events = self.events(cache);
        events.push(AnalyticsEvent {
            name: name.to_string(),
            timestamp: cache.now_ms(),
            properties,
        });
        if events.len() > self.max_events {
            let overflow = events.len() - self.max_events;
            events.drain(..overflow);
        }
        cache.set_item(&self.key, &events, true);
    }

    /// All retained events, oldest first.
    #[must_use]
    pub fn events(&self, cache: &mut PersistentCache) -> Vec<AnalyticsEvent> {
        cache
            .get_item::<Vec<AnalyticsEvent>>(&self.key, None)
            .unwrap_or_default()
    }

    pub fn clear(&self, cache: &mut PersistentCache) {
        cache.remove_item(&self.key);
    }
}
