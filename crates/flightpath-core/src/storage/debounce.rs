//! Single debounce timer for batched durable writes.
//!
//! The timer is an explicit deadline rather than a scheduled callback: the
//! owner polls [`DebounceTimer::is_due`] (via `PersistentCache::tick`) and
//! every new pending write re-arms it, pushing the deadline out by the full
//! delay. Writes landing inside one window therefore collapse into one flush.

/// Trailing-edge debounce deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceTimer {
    delay_ms: u64,
    deadline: Option<u64>,
}

impl DebounceTimer {
    #[must_use]
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            deadline: None,
        }
    }

    /// (Re)arm the timer so it fires `delay_ms` after `now_ms`.
    pub fn arm(&mut self, now_ms: u64) {
        self.deadline = Some(now_ms.saturating_add(self.delay_ms));
    }

    /// Disarm the timer.
    pub fn clear(&mut self) {
        self.deadline = None;
    }

    /// Whether an armed timer has reached its deadline.
    #[must_use]
    pub fn is_due(&self, now_ms: u64) -> bool {
        self.deadline.is_some_and(|deadline| now_ms >= deadline)
    }

    #[must_use]
    pub fn deadline(&self) -> Option<u64> {
        self.deadline
    }
}
