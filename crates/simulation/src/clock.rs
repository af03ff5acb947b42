//! Manually advanced clock.

use cadence_core::EpochClock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A millisecond clock advanced explicitly by the test.
///
/// Clones share the same underlying time, so the handle given to the
/// sequencer and the handle kept by the test stay in step.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ms: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now_ms: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    /// Move time forward.
    pub fn advance(&self, ms: u64) {
        self.now_ms.fetch_add(ms, Ordering::Relaxed);
    }

    /// Jump to an absolute time.
    pub fn set(&self, now_ms: u64) {
        self.now_ms.store(now_ms, Ordering::Relaxed);
    }

    pub fn now(&self) -> u64 {
        self.now_ms.load(Ordering::Relaxed)
    }
}

impl EpochClock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now()
    }
}
