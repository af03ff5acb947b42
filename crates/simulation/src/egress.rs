//! Recording egress publisher.

use cadence_core::EgressPublisher;
use cadence_types::{EventCode, Session, SessionId};
use std::sync::{Arc, Mutex};

/// An event delivered to a session's response channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EgressEvent {
    pub session_id: SessionId,
    pub code: EventCode,
    pub detail: String,
}

#[derive(Debug)]
struct RecordingEgressInner {
    connected: bool,
    delivering: bool,
    events: Vec<EgressEvent>,
    challenges: Vec<(SessionId, Vec<u8>)>,
    refused_count: u64,
}

impl Default for RecordingEgressInner {
    fn default() -> Self {
        Self {
            connected: true,
            delivering: true,
            events: Vec::new(),
            challenges: Vec::new(),
            refused_count: 0,
        }
    }
}

/// In-memory egress that records every delivered event and challenge, with
/// scriptable connectivity and delivery refusal.
///
/// Clones share state: hand one to the sequencer, keep one for assertions.
#[derive(Debug, Clone, Default)]
pub struct RecordingEgress {
    inner: Arc<Mutex<RecordingEgressInner>>,
}

impl RecordingEgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script whether response channels report connected.
    pub fn set_connected(&self, connected: bool) {
        self.inner.lock().unwrap().connected = connected;
    }

    /// Script whether sends are delivered or refused.
    pub fn set_delivering(&self, delivering: bool) {
        self.inner.lock().unwrap().delivering = delivering;
    }

    /// Snapshot of delivered events in send order.
    pub fn events(&self) -> Vec<EgressEvent> {
        self.inner.lock().unwrap().events.clone()
    }

    /// Snapshot of delivered challenges in send order.
    pub fn challenges(&self) -> Vec<(SessionId, Vec<u8>)> {
        self.inner.lock().unwrap().challenges.clone()
    }

    /// Number of refused sends.
    pub fn refused_count(&self) -> u64 {
        self.inner.lock().unwrap().refused_count
    }

    /// Number of delivered sends (events plus challenges).
    pub fn sent_count(&self) -> u64 {
        let inner = self.inner.lock().unwrap();
        (inner.events.len() + inner.challenges.len()) as u64
    }
}

impl EgressPublisher for RecordingEgress {
    fn is_connected(&self, _session: &Session) -> bool {
        self.inner.lock().unwrap().connected
    }

    fn send_event(&mut self, session: &Session, code: EventCode, detail: &str) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if !inner.connected || !inner.delivering {
            inner.refused_count += 1;
            return false;
        }
        inner.events.push(EgressEvent {
            session_id: session.id(),
            code,
            detail: detail.to_string(),
        });
        true
    }

    fn send_challenge(&mut self, session: &Session, challenge: &[u8]) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if !inner.connected || !inner.delivering {
            inner.refused_count += 1;
            return false;
        }
        inner.challenges.push((session.id(), challenge.to_vec()));
        true
    }
}
