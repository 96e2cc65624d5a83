//! Deterministic collaborators for tests
//!
//! Enabled with the `test-support` feature.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

use crate::domain::providers::{Clock, IdGenerator, Providers};

/// Generates `prefix-1`, `prefix-2`, ...
#[derive(Debug)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn generate(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", self.prefix, n)
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Fixed start instant shared by tests
    pub fn epoch() -> Self {
        // 2024-01-01T00:00:00Z
        Self::new(DateTime::<Utc>::from_timestamp(1_704_067_200, 0).unwrap_or_default())
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock() = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Default providers with sequential ids and a frozen clock
pub fn deterministic_providers(prefix: &str) -> (Providers, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::epoch());
    let providers = Providers::default()
        .with_ids(Arc::new(SequentialIdGenerator::new(prefix)))
        .with_clock(clock.clone());
    (providers, clock)
}
