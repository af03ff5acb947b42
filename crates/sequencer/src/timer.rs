//! Deadline-ordered timer service.

use cadence_types::CorrelationId;
use std::collections::{BTreeSet, HashMap};

/// Schedules and fires timers named by correlation id.
///
/// Timers fire in (deadline, correlation id) order, which makes the fire
/// order deterministic even for simultaneously-due timers. Re-scheduling an
/// existing id replaces its deadline; cancelling an unknown id is a no-op.
#[derive(Debug, Default)]
pub struct TimerService {
    /// Due-order index.
    by_deadline: BTreeSet<(u64, CorrelationId)>,
    /// Deadline per live timer, for O(log n) replace and cancel.
    deadlines: HashMap<CorrelationId, u64>,
}

impl TimerService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a timer, replacing any existing deadline for the same id.
    pub fn schedule_timer(&mut self, correlation_id: CorrelationId, deadline_ms: u64) {
        if let Some(old_deadline) = self.deadlines.insert(correlation_id, deadline_ms) {
            self.by_deadline.remove(&(old_deadline, correlation_id));
        }
        self.by_deadline.insert((deadline_ms, correlation_id));
    }

    /// Cancel a timer. Returns whether a timer was actually cancelled.
    pub fn cancel_timer(&mut self, correlation_id: CorrelationId) -> bool {
        match self.deadlines.remove(&correlation_id) {
            Some(deadline_ms) => {
                self.by_deadline.remove(&(deadline_ms, correlation_id));
                true
            }
            None => false,
        }
    }

    /// Fire every timer with `deadline <= now_ms` through `on_timer`.
    ///
    /// A timer is removed only when `on_timer` returns `true`. On `false`
    /// (the log refused the append) the timer stays scheduled and the poll
    /// stops, so fired records keep deadline order across ticks.
    pub fn poll(&mut self, now_ms: u64, mut on_timer: impl FnMut(CorrelationId) -> bool) -> usize {
        let mut work_count = 0;

        while let Some(&(deadline_ms, correlation_id)) = self.by_deadline.iter().next() {
            if deadline_ms > now_ms {
                break;
            }

            if !on_timer(correlation_id) {
                break;
            }

            self.by_deadline.remove(&(deadline_ms, correlation_id));
            self.deadlines.remove(&correlation_id);
            work_count += 1;
        }

        work_count
    }

    /// Number of live timers.
    pub fn scheduled_count(&self) -> usize {
        self.deadlines.len()
    }
}
