//! # Durable Storage
//!
//! The client-local key/value stores behind the Persistence Cache Layer.
//!
//! ## Backends
//!
//! - `InMemory`: a shared in-process map (volatile; optional byte quota)
//! - `Persistent`: a redb database file (ACID, survives restarts)
//!
//! Values are opaque strings at this level. The cache above owns the JSON
//! envelope format and all failure degradation.

mod cache;
mod clock;
mod debounce;
mod memory;
mod redb_store;

pub use cache::{CacheStats, PersistentCache};
pub use clock::{Clock, ManualClock};
pub use debounce::DebounceTimer;
pub use memory::MemoryStore;
pub use redb_store::RedbStore;

use crate::FlightpathError;
use std::path::Path;

/// A durable string key/value store.
pub trait DurableStore {
    /// Read the raw value stored under `key`.
    fn read(&self, key: &str) -> Result<Option<String>, FlightpathError>;

    /// Store `value` under `key`, replacing any previous value.
    fn write(&mut self, key: &str, value: &str) -> Result<(), FlightpathError>;

    /// Delete `key`. Deleting a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), FlightpathError>;
}

/// Storage backend for a cache.
#[derive(Debug)]
pub enum StorageBackend {
    /// Shared in-process map (fast, volatile).
    InMemory(MemoryStore),
    /// Disk-backed store using redb (ACID, persistent).
    Persistent(RedbStore),
}

impl Default for StorageBackend {
    fn default() -> Self {
        Self::InMemory(MemoryStore::new())
    }
}

impl StorageBackend {
    /// Open (or create) a redb-backed store at `path`.
    pub fn open_redb(path: impl AsRef<Path>) -> Result<Self, FlightpathError> {
        Ok(Self::Persistent(RedbStore::open(path)?))
    }

    /// Check if using persistent storage.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        matches!(self, StorageBackend::Persistent(_))
    }
}

impl DurableStore for StorageBackend {
    fn read(&self, key: &str) -> Result<Option<String>, FlightpathError> {
        match self {
            StorageBackend::InMemory(store) => store.read(key),
            StorageBackend::Persistent(store) => store.read(key),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), FlightpathError> {
        match self {
            StorageBackend::InMemory(store) => store.write(key, value),
            StorageBackend::Persistent(store) => store.write(key, value),
        }
    }

    fn remove(&mut self, key: &str) -> Result<(), FlightpathError> {
        match self {
            StorageBackend::InMemory(store) => store.remove(key),
            StorageBackend::Persistent(store) => store.remove(key),
        }
    }
}
