//! In-process durable store.
//!
//! Clones share the same underlying map, so a handle kept outside the cache
//! observes exactly what the cache has written "to disk". An optional byte
//! quota makes the store refuse writes the way a full browser storage area
//! does.

use super::DurableStore;
use crate::FlightpathError;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

#[derive(Debug, Default)]
struct MemoryInner {
    entries: BTreeMap<String, String>,
    quota_bytes: Option<usize>,
    write_count: usize,
}

impl MemoryInner {
    fn used_bytes_without(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

/// Shared in-memory key/value store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Rc<RefCell<MemoryInner>>,
}

impl MemoryStore {
    /// Create an empty, unbounded store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store that rejects writes once keys plus values
    /// exceed `quota_bytes`.
    #[must_use]
    pub fn with_quota(quota_bytes: usize) -> Self {
        let store = Self::new();
        store.inner.borrow_mut().quota_bytes = Some(quota_bytes);
        store
    }

    /// Number of successful writes since creation.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.inner.borrow().write_count
    }

    /// Whether `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.borrow().entries.contains_key(key)
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().entries.is_empty()
    }
}

impl DurableStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, FlightpathError> {
        Ok(self.inner.borrow().entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), FlightpathError> {
        let mut inner = self.inner.borrow_mut();
        if let Some(quota) = inner.quota_bytes {
            let needed = inner
                .used_bytes_without(key)
                .saturating_add(key.len() + value.len());
            if needed > quota {
                return Err(FlightpathError::QuotaExceeded {
                    key: key.to_string(),
                    bytes: value.len(),
                });
            }
        }
        inner.entries.insert(key.to_string(), value.to_string());
        inner.write_count = inner.write_count.saturating_add(1);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), FlightpathError> {
        self.inner.borrow_mut().entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let mut store = MemoryStore::new();
        let observer = store.clone();

        store.write("k", "v").expect("write");
        assert_eq!(observer.read("k").expect("read").as_deref(), Some("v"));
        assert_eq!(observer.write_count(), 1);
    }

    #[test]
    fn quota_rejects_oversized_write() {
        let mut store = MemoryStore::with_quota(10);
        store.write("a", "12345").expect("fits");

        let result = store.write("b", "123456789");
        assert!(matches!(result, Err(FlightpathError::QuotaExceeded { .. })));
        assert!(!store.contains_key("b"));
    }

    #[test]
    fn overwrite_does_not_count_old_value_against_quota() {
        let mut store = MemoryStore::with_quota(10);
        store.write("a", "123456789").expect("fits");
        store.write("a", "987654321").expect("replacing fits too");
    }

    #[test]
    fn remove_missing_key_is_ok() {
        let mut store = MemoryStore::new();
        assert!(store.remove("nothing").is_ok());
        assert!(store.is_empty());
    }
}
