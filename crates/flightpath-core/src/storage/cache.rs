//! # Persistence Cache Layer
//!
//! A two-tier key/value store: an in-memory map of [`CacheEntry`] values in
//! front of a [`StorageBackend`].
//!
//! ## Reads
//!
//! `get_item` serves from memory when the entry is present and not expired;
//! otherwise it reads through to durable storage, repopulates memory and
//! returns the value. Because every write updates memory synchronously, a
//! caller always reads its own most recent write, even before the debounced
//! durable write lands.
//!
//! ## Writes
//!
//! - `immediate = true`: written through to durable storage now (ledger,
//!   analytics: data whose loss on crash would be visible)
//! - `immediate = false`: queued, and the single debounce timer re-armed;
//!   writes inside one window collapse into one flush
//!
//! `flush` drains the queue synchronously. It also runs on `Drop`, so a
//! cache torn down with pending writes never loses them.
//!
//! ## Failure Handling
//!
//! Storage errors never reach the caller. Failed or corrupt reads are logged
//! and treated as absent. A write refused for quota is retried once with a
//! reduced payload (collections truncated to their most recent entries),
//! then abandoned with a warning.

use super::{Clock, DebounceTimer, DurableStore, StorageBackend};
use crate::config::CacheSettings;
use crate::formats::{CacheEntry, decode_entry, encode_entry};
use crate::FlightpathError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// ERROR LOGGING HELPERS
// =============================================================================

/// Log a storage error and convert Result to Option.
#[inline]
fn log_and_convert<T>(result: Result<T, FlightpathError>, key: &str, context: &str) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!(key, error = %e, "storage {} failed", context);
            None
        }
    }
}

/// Truncate a collection payload to its most recent `keep` entries.
///
/// Returns `None` when the value is not an array or is already short enough,
/// i.e. when no smaller payload exists to retry with.
fn reduce_payload(value: &Value, keep: usize) -> Option<Value> {
    let items = value.as_array()?;
    if items.len() <= keep {
        return None;
    }
    let start = items.len() - keep;
    Some(Value::Array(items[start..].to_vec()))
}

// =============================================================================
// STATS
// =============================================================================

/// Counters describing cache behaviour since creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub memory_hits: u64,
    pub memory_misses: u64,
    pub expired: u64,
    pub durable_writes: u64,
    pub failed_writes: u64,
    pub quota_retries: u64,
    pub flushes: u64,
}

// =============================================================================
// PERSISTENT CACHE
// =============================================================================

/// Debounced, batched key/value cache over durable storage.
#[derive(Debug)]
pub struct PersistentCache {
    backend: StorageBackend,
    clock: Clock,
    memory: BTreeMap<String, CacheEntry<Value>>,
    pending: BTreeSet<String>,
    timer: DebounceTimer,
    quota_retry_keep: usize,
    stats: CacheStats,
}

impl PersistentCache {
    /// Create a cache over `backend` using `clock` for timestamps.
    #[must_use]
    pub fn new(backend: StorageBackend, clock: Clock, settings: &CacheSettings) -> Self {
        Self {
            backend,
            clock,
            memory: BTreeMap::new(),
            pending: BTreeSet::new(),
            timer: DebounceTimer::new(settings.debounce_ms),
            quota_retry_keep: settings.quota_retry_keep,
            stats: CacheStats::default(),
        }
    }

    /// Cache over a fresh in-memory backend with the wall clock.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(
            StorageBackend::default(),
            Clock::System,
            &CacheSettings::default(),
        )
    }

    // =========================================================================
    // READS
    // =========================================================================

    /// Read `key`, honouring `ttl` (or the TTL stored with the entry).
    ///
    /// Returns `None` when absent, expired, unreadable or not a `T`.
    pub fn get_item<T: DeserializeOwned>(&mut self, key: &str, ttl: Option<u64>) -> Option<T> {
        let now = self.clock.now_ms();

        if let Some(entry) = self.memory.get(key) {
            if !entry.is_expired(now, ttl) {
                self.stats.memory_hits += 1;
                return Self::decode_value(key, entry.value.clone());
            }
            self.memory.remove(key);
            self.pending.remove(key);
            self.stats.expired += 1;
        }
        self.stats.memory_misses += 1;

        let raw = log_and_convert(self.backend.read(key), key, "read")??;
        let entry = log_and_convert(decode_entry(&raw), key, "decode")?;

        if entry.is_expired(now, ttl) {
            tracing::debug!(key, "durable entry expired; removing");
            self.stats.expired += 1;
            log_and_convert(self.backend.remove(key), key, "remove");
            return None;
        }

        let value = entry.value.clone();
        self.memory.insert(key.to_string(), entry);
        Self::decode_value(key, value)
    }

    fn decode_value<T: DeserializeOwned>(key: &str, value: Value) -> Option<T> {
        let result = serde_json::from_value(value)
            .map_err(|e| FlightpathError::DeserializationError(e.to_string()));
        log_and_convert(result, key, "deserialize")
    }

    // =========================================================================
    // WRITES
    // =========================================================================

    /// Write `value` under `key` with no expiry.
    pub fn set_item<T: Serialize>(&mut self, key: &str, value: &T, immediate: bool) {
        self.set_item_with_ttl(key, value, None, immediate);
    }

    /// Write `value` under `key`, expiring `ttl` milliseconds after now.
    pub fn set_item_with_ttl<T: Serialize>(
        &mut self,
        key: &str,
        value: &T,
        ttl: Option<u64>,
        immediate: bool,
    ) {
        let result = serde_json::to_value(value)
            .map_err(|e| FlightpathError::SerializationError(e.to_string()));
        let Some(value) = log_and_convert(result, key, "serialize") else {
            return;
        };

        let now = self.clock.now_ms();
        self.memory
            .insert(key.to_string(), CacheEntry::new(value, now, ttl));

        if immediate {
            self.pending.remove(key);
            self.write_through(key);
        } else {
            self.pending.insert(key.to_string());
            self.timer.arm(now);
            tracing::debug!(key, pending = self.pending.len(), "debounce timer armed");
        }
    }

    /// Delete `key` from memory, the pending queue and durable storage.
    pub fn remove_item(&mut self, key: &str) {
        self.memory.remove(key);
        self.pending.remove(key);
        if self.pending.is_empty() {
            self.timer.clear();
        }
        log_and_convert(self.backend.remove(key), key, "remove");
    }

    /// Drain every pending write to durable storage and disarm the timer.
    pub fn flush(&mut self) {
        self.timer.clear();
        if self.pending.is_empty() {
            return;
        }

        let keys = std::mem::take(&mut self.pending);
        tracing::debug!(count = keys.len(), "flushing pending writes");
        for key in &keys {
            self.write_through(key);
        }
        self.stats.flushes += 1;
    }

    /// Flush if the debounce deadline has passed. Returns whether it flushed.
    pub fn tick(&mut self) -> bool {
        if self.timer.is_due(self.clock.now_ms()) {
            self.flush();
            true
        } else {
            false
        }
    }

    fn write_through(&mut self, key: &str) {
        let Some(entry) = self.memory.get(key) else {
            return;
        };
        let Some(encoded) = log_and_convert(encode_entry(entry), key, "encode") else {
            self.stats.failed_writes += 1;
            return;
        };

        match self.backend.write(key, &encoded) {
            Ok(()) => {
                self.stats.durable_writes += 1;
            }
            Err(FlightpathError::QuotaExceeded { bytes, .. }) => {
                self.stats.quota_retries += 1;
                let reduced = reduce_payload(&entry.value, self.quota_retry_keep)
                    .map(|value| CacheEntry::new(value, entry.timestamp, entry.ttl));
                let Some(reduced) = reduced else {
                    tracing::warn!(key, bytes, "storage quota exceeded; no smaller payload to retry");
                    self.stats.failed_writes += 1;
                    return;
                };

                tracing::warn!(
                    key,
                    bytes,
                    keep = self.quota_retry_keep,
                    "storage quota exceeded; retrying with most recent entries only"
                );
                let retried = encode_entry(&reduced)
                    .and_then(|encoded| self.backend.write(key, &encoded));
                if log_and_convert(retried, key, "reduced write").is_some() {
                    self.stats.durable_writes += 1;
                } else {
                    self.stats.failed_writes += 1;
                }
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "storage write failed");
                self.stats.failed_writes += 1;
            }
        }
    }

    // =========================================================================
    // INSPECTION
    // =========================================================================

    /// Whether any debounced write is waiting for a flush.
    #[must_use]
    pub fn has_pending_writes(&self) -> bool {
        !self.pending.is_empty()
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Deadline of the armed debounce timer, if any.
    #[must_use]
    pub fn flush_deadline(&self) -> Option<u64> {
        self.timer.deadline()
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    #[must_use]
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Current time according to the cache clock.
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    #[must_use]
    pub fn backend(&self) -> &StorageBackend {
        &self.backend
    }
}

impl Drop for PersistentCache {
    fn drop(&mut self) {
        if self.has_pending_writes() {
            tracing::debug!(pending = self.pending.len(), "flushing on teardown");
        }
        self.flush();
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{ManualClock, MemoryStore};

    fn cache_with(store: &MemoryStore, clock: &ManualClock) -> PersistentCache {
        PersistentCache::new(
            StorageBackend::InMemory(store.clone()),
            Clock::Manual(clock.clone()),
            &CacheSettings::default(),
        )
    }

    #[test]
    fn read_your_writes_before_flush() {
        let store = MemoryStore::new();
        let clock = ManualClock::new(1_000);
        let mut cache = cache_with(&store, &clock);

        cache.set_item("k", &"v".to_string(), false);

        assert_eq!(cache.get_item::<String>("k", None).as_deref(), Some("v"));
        assert!(!store.contains_key("k"));
        assert!(cache.has_pending_writes());
    }

    #[test]
    fn writes_in_one_window_collapse_into_one_flush() {
        let store = MemoryStore::new();
        let clock = ManualClock::new(0);
        let mut cache = cache_with(&store, &clock);

        cache.set_item("a", &1u32, false);
        clock.advance(60);
        cache.set_item("b", &2u32, false);
        clock.advance(60);
        cache.set_item("a", &3u32, false);

        // 120ms after the first write but only 0ms after the last re-arm
        assert!(!cache.tick());
        clock.advance(100);
        assert!(cache.tick());

        assert_eq!(store.write_count(), 2);
        assert_eq!(cache.stats().flushes, 1);
        let raw = store.read("a").expect("read").expect("present");
        assert!(raw.contains("\"value\":3"));
    }

    #[test]
    fn immediate_write_goes_straight_to_storage() {
        let store = MemoryStore::new();
        let clock = ManualClock::new(0);
        let mut cache = cache_with(&store, &clock);

        cache.set_item("ledger", &vec![1, 2, 3], true);

        assert!(store.contains_key("ledger"));
        assert!(!cache.has_pending_writes());
        assert!(cache.flush_deadline().is_none());
    }

    #[test]
    fn drop_flushes_pending_writes() {
        let store = MemoryStore::new();
        let clock = ManualClock::new(0);
        {
            let mut cache = cache_with(&store, &clock);
            cache.set_item("k", &"pending".to_string(), false);
            assert!(!store.contains_key("k"));
        }
        assert!(store.contains_key("k"));
    }

    #[test]
    fn read_through_repopulates_memory() {
        let store = MemoryStore::new();
        let clock = ManualClock::new(0);
        {
            let mut cache = cache_with(&store, &clock);
            cache.set_item("k", &42u32, true);
        }

        let mut cache = cache_with(&store, &clock);
        assert_eq!(cache.get_item::<u32>("k", None), Some(42));
        assert_eq!(cache.stats().memory_misses, 1);
        assert_eq!(cache.get_item::<u32>("k", None), Some(42));
        assert_eq!(cache.stats().memory_hits, 1);
    }

    #[test]
    fn ttl_expiry_in_memory_and_durable() {
        let store = MemoryStore::new();
        let clock = ManualClock::new(0);
        let mut cache = cache_with(&store, &clock);

        cache.set_item_with_ttl("progress", &7u32, Some(1_000), true);
        clock.advance(1_000);
        assert_eq!(cache.get_item::<u32>("progress", None), Some(7));

        clock.advance(1);
        assert_eq!(cache.get_item::<u32>("progress", None), None);
        assert!(!store.contains_key("progress"));
    }

    #[test]
    fn read_ttl_applies_to_untimed_entry() {
        let store = MemoryStore::new();
        let clock = ManualClock::new(0);
        let mut cache = cache_with(&store, &clock);

        cache.set_item("k", &1u32, true);
        clock.advance(500);
        assert_eq!(cache.get_item::<u32>("k", Some(100)), None);
    }

    #[test]
    fn corrupt_durable_value_reads_as_absent() {
        let mut store = MemoryStore::new();
        store.write("k", "{broken").expect("write");
        let clock = ManualClock::new(0);
        let mut cache = cache_with(&store, &clock);

        assert_eq!(cache.get_item::<u32>("k", None), None);
    }

    #[test]
    fn wrong_type_reads_as_absent() {
        let mut cache = PersistentCache::in_memory();
        cache.set_item("k", &"text".to_string(), false);
        assert_eq!(cache.get_item::<u32>("k", None), None);
    }

    #[test]
    fn quota_failure_retries_with_recent_entries() {
        let store = MemoryStore::with_quota(400);
        let clock = ManualClock::new(0);
        let mut cache = PersistentCache::new(
            StorageBackend::InMemory(store.clone()),
            Clock::Manual(clock.clone()),
            &CacheSettings {
                quota_retry_keep: 3,
                ..CacheSettings::default()
            },
        );

        let big: Vec<u32> = (0..200).collect();
        cache.set_item("history", &big, true);

        let stats = cache.stats();
        assert_eq!(stats.quota_retries, 1);
        assert_eq!(stats.durable_writes, 1);
        let raw = store.read("history").expect("read").expect("present");
        assert!(raw.contains("[197,198,199]"));

        // Memory keeps the full value for the rest of the session.
        assert_eq!(cache.get_item::<Vec<u32>>("history", None).map(|v| v.len()), Some(200));
    }

    #[test]
    fn quota_failure_without_smaller_payload_gives_up() {
        let store = MemoryStore::with_quota(10);
        let mut cache = PersistentCache::new(
            StorageBackend::InMemory(store.clone()),
            Clock::System,
            &CacheSettings::default(),
        );

        cache.set_item("profile", &"a string far too long for the quota".to_string(), true);

        assert_eq!(cache.stats().failed_writes, 1);
        assert!(!store.contains_key("profile"));
    }

    #[test]
    fn remove_item_clears_every_tier() {
        let store = MemoryStore::new();
        let clock = ManualClock::new(0);
        let mut cache = cache_with(&store, &clock);

        cache.set_item("a", &1u32, true);
        cache.set_item("a", &2u32, false);
        cache.remove_item("a");

        assert_eq!(cache.get_item::<u32>("a", None), None);
        assert!(!store.contains_key("a"));
        assert!(!cache.has_pending_writes());
    }
}
