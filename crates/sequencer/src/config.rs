//! Sequencer configuration.

/// Configuration for the sequencer agent.
///
/// All values are immutable after construction.
#[derive(Debug, Clone)]
pub struct SequencerConfig {
    /// Upper bound on `pending + active` sessions at admission time.
    pub max_concurrent_sessions: usize,
    /// Inactivity timeout applied uniformly to every session.
    pub session_timeout_ms: u64,
    /// Number of downstream services that must signal readiness before the
    /// sequencer activates.
    pub service_count: u32,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_sessions: 10,
            session_timeout_ms: 5_000,
            service_count: 1,
        }
    }
}

impl SequencerConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the concurrent session limit.
    pub fn with_max_concurrent_sessions(mut self, limit: usize) -> Self {
        self.max_concurrent_sessions = limit;
        self
    }

    /// Set the session inactivity timeout.
    pub fn with_session_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.session_timeout_ms = timeout_ms;
        self
    }

    /// Set the number of downstream services.
    pub fn with_service_count(mut self, count: u32) -> Self {
        self.service_count = count;
        self
    }
}
