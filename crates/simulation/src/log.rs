//! Recording log appender.

use cadence_core::LogAppender;
use cadence_types::{CloseReason, CorrelationId, LogRecord, ServiceAction, Session, SessionId};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct RecordingLogInner {
    records: Vec<LogRecord>,
    /// Refuse every append while set.
    refusing: bool,
    /// Refuse the next N appends, consumed before `refusing` is consulted.
    refusals_remaining: usize,
    refused_count: u64,
}

impl RecordingLogInner {
    fn try_append(&mut self, record: LogRecord) -> bool {
        if self.refusals_remaining > 0 {
            self.refusals_remaining -= 1;
            self.refused_count += 1;
            return false;
        }
        if self.refusing {
            self.refused_count += 1;
            return false;
        }
        self.records.push(record);
        true
    }
}

/// In-memory log that records every accepted append and can be scripted to
/// refuse appends, emulating publication backpressure.
///
/// Clones share state: hand one to the sequencer, keep one for assertions.
#[derive(Debug, Clone, Default)]
pub struct RecordingLog {
    inner: Arc<Mutex<RecordingLogInner>>,
}

impl RecordingLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the accepted records in append order.
    pub fn records(&self) -> Vec<LogRecord> {
        self.inner.lock().unwrap().records.clone()
    }

    /// Number of accepted appends.
    pub fn append_count(&self) -> u64 {
        self.inner.lock().unwrap().records.len() as u64
    }

    /// Number of refused appends.
    pub fn refused_count(&self) -> u64 {
        self.inner.lock().unwrap().refused_count
    }

    /// Refuse every append until re-enabled.
    pub fn set_refusing(&self, refusing: bool) {
        self.inner.lock().unwrap().refusing = refusing;
    }

    /// Refuse exactly the next `count` appends.
    pub fn refuse_next(&self, count: usize) {
        self.inner.lock().unwrap().refusals_remaining = count;
    }
}

impl LogAppender for RecordingLog {
    fn append_connected_session(&mut self, session: &Session, now_ms: u64) -> bool {
        self.inner.lock().unwrap().try_append(LogRecord::ConnectedSession {
            session_id: session.id(),
            correlation_id: session.last_correlation_id(),
            response_stream_id: session.response_stream_id(),
            response_channel: session.response_channel().to_string(),
            timestamp_ms: now_ms,
        })
    }

    fn append_closed_session(
        &mut self,
        session: &Session,
        reason: CloseReason,
        now_ms: u64,
    ) -> bool {
        self.inner.lock().unwrap().try_append(LogRecord::ClosedSession {
            session_id: session.id(),
            reason,
            timestamp_ms: now_ms,
        })
    }

    fn append_message(
        &mut self,
        session_id: SessionId,
        correlation_id: CorrelationId,
        payload: &[u8],
        now_ms: u64,
    ) -> bool {
        self.inner.lock().unwrap().try_append(LogRecord::ClientMessage {
            session_id,
            correlation_id,
            payload: payload.to_vec(),
            timestamp_ms: now_ms,
        })
    }

    fn append_timer_event(&mut self, correlation_id: CorrelationId, now_ms: u64) -> bool {
        self.inner.lock().unwrap().try_append(LogRecord::TimerEvent {
            correlation_id,
            timestamp_ms: now_ms,
        })
    }

    fn append_action_request(&mut self, action: ServiceAction, now_ms: u64) -> bool {
        self.inner.lock().unwrap().try_append(LogRecord::ActionRequest {
            action,
            timestamp_ms: now_ms,
        })
    }
}
