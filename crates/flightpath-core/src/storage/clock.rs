//! Time source for the cache.
//!
//! The engine never reads the wall clock directly. Timestamps on cache
//! entries and ledger snapshots, TTL expiry and the debounce deadline all go
//! through a [`Clock`], so tests can drive time by hand.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

/// A settable clock shared between the test and the cache it drives.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ms: Rc<Cell<u64>>,
}

impl ManualClock {
    #[must_use]
    pub fn new(start_ms: u64) -> Self {
        Self {
            now_ms: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn set(&self, now_ms: u64) {
        self.now_ms.set(now_ms);
    }

    pub fn advance(&self, delta_ms: u64) {
        self.now_ms.set(self.now_ms.get().saturating_add(delta_ms));
    }

    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }
}

/// Epoch-millisecond time source.
#[derive(Debug, Clone, Default)]
pub enum Clock {
    /// Wall clock.
    #[default]
    System,
    /// Hand-driven clock.
    Manual(ManualClock),
}

impl Clock {
    /// Current time in epoch milliseconds.
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        match self {
            Clock::System => SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0),
            Clock::Manual(clock) => clock.now_ms(),
        }
    }
}
