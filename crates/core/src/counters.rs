//! Shared counters at the boundary of the agent thread.

use cadence_types::ToggleCode;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// A monotonic counter incremented by the agent and read by observers on
/// other threads.
///
/// Increments use release ordering so an observer that reads the counter
/// with acquire ordering sees everything the agent did before incrementing.
#[derive(Debug, Clone, Default)]
pub struct SharedCounter {
    value: Arc<AtomicU64>,
}

impl SharedCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self) {
        self.value.fetch_add(1, Ordering::Release);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Acquire)
    }
}

/// The shared counter through which operators inject mode-change commands.
///
/// Operators write a [`ToggleCode`]; the agent reads it each tick and resets
/// it to neutral once the command is acted on (except abort, which is a
/// terminal signal and never reset).
#[derive(Debug, Clone, Default)]
pub struct ControlToggle {
    value: Arc<AtomicU64>,
}

impl ControlToggle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inject a command. Called from operator threads.
    pub fn signal(&self, toggle: ToggleCode) {
        self.value.store(toggle.code(), Ordering::Release);
    }

    /// Write a raw counter value, as external control tooling does. Values
    /// outside the known codes surface as contract violations at the agent.
    pub fn set_code(&self, code: u64) {
        self.value.store(code, Ordering::Release);
    }

    /// The raw counter value. Decoding is the agent's job so that unknown
    /// values surface as contract violations.
    pub fn code(&self) -> u64 {
        self.value.load(Ordering::Acquire)
    }

    /// Reset to neutral after a command is acted on.
    pub fn reset(&self) {
        self.value.store(ToggleCode::Neutral.code(), Ordering::Release);
    }
}

/// Latch tripped when a terminal acknowledgement moves the sequencer to
/// its closed state, releasing whoever is waiting on shutdown.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    flag: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signal(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_signalled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}
