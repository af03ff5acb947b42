//! Millisecond clocks.

use std::time::{SystemTime, UNIX_EPOCH};

/// A millisecond wall clock.
pub trait EpochClock {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> u64;
}

/// The system wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemEpochClock;

impl EpochClock for SystemEpochClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// A cached millisecond clock, refreshed once per tick.
///
/// Every callback within a tick observes the same time, and the cached value
/// never moves backwards even if the underlying clock does.
#[derive(Debug, Default)]
pub struct CachedClock {
    now_ms: u64,
}

impl CachedClock {
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Refresh the cache. Ignores values earlier than the current cache.
    pub fn update(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }
}

/// The real clock and its per-tick cache, advanced together.
pub struct ClockPair {
    epoch: Box<dyn EpochClock>,
    cached: CachedClock,
}

impl ClockPair {
    pub fn new(epoch: Box<dyn EpochClock>) -> Self {
        Self {
            epoch,
            cached: CachedClock::default(),
        }
    }

    /// A pair backed by the system wall clock.
    pub fn system() -> Self {
        Self::new(Box::new(SystemEpochClock))
    }

    /// Read the real clock, refresh the cache, and return the cached time.
    pub fn update(&mut self) -> u64 {
        let now_ms = self.epoch.now_ms();
        self.cached.update(now_ms);
        self.cached.now_ms()
    }

    /// The cached time as of the last [`ClockPair::update`].
    pub fn cached_now_ms(&self) -> u64 {
        self.cached.now_ms()
    }
}

impl std::fmt::Debug for ClockPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClockPair")
            .field("cached", &self.cached)
            .finish()
    }
}
