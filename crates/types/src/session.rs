//! Client session state.

use crate::{CorrelationId, SessionId};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a client session.
///
/// A session is owned by exactly one container at a time: the pending list
/// (pre-authentication states), the active map (keyed by session id), or the
/// rejected list (terminal, awaiting a best-effort notification).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Created; response channel not yet confirmed connected.
    Init,
    /// Response channel connected; authentication in progress. Also used for
    /// a promoted session whose connected-session log record has not yet
    /// been accepted by the log.
    Connected,
    /// The authenticator issued a challenge and awaits the response.
    Challenged,
    /// Authentication succeeded; awaiting promotion to the active map.
    Authenticated,
    /// Authentication failed; awaiting the rejection notification.
    Rejected,
    /// Logged and live: client messages are accepted.
    Open,
    /// Timed out, with the closed-session log record still outstanding.
    TimedOut,
    /// Closed. Retained only while the closed-session record is outstanding.
    Closed,
}

/// Why a session's closed-session record was appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloseReason {
    /// The client asked for the session to be closed.
    UserAction,
    /// The session exceeded the inactivity timeout.
    Timeout,
}

/// Egress event kinds sent to a session's response channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventCode {
    /// Generic error with a detail string.
    Error,
    /// The session failed authentication.
    AuthenticationRejected,
}

/// Per-client session owned by the sequencer.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    response_stream_id: i32,
    response_channel: String,
    state: SessionState,
    last_activity_ms: u64,
    last_correlation_id: CorrelationId,
}

impl Session {
    /// Create a session in [`SessionState::Init`].
    pub fn new(id: SessionId, response_stream_id: i32, response_channel: String) -> Self {
        Self {
            id,
            response_stream_id,
            response_channel,
            state: SessionState::Init,
            last_activity_ms: 0,
            last_correlation_id: CorrelationId(0),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn response_stream_id(&self) -> i32 {
        self.response_stream_id
    }

    pub fn response_channel(&self) -> &str {
        &self.response_channel
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn set_state(&mut self, state: SessionState) {
        self.state = state;
    }

    /// Stamp both the last-activity time and the last-seen correlation id.
    pub fn record_activity(&mut self, now_ms: u64, correlation_id: CorrelationId) {
        self.last_activity_ms = now_ms;
        self.last_correlation_id = correlation_id;
    }

    /// Stamp the last-activity time only (used at promotion).
    pub fn set_last_activity_ms(&mut self, now_ms: u64) {
        self.last_activity_ms = now_ms;
    }

    pub fn last_activity_ms(&self) -> u64 {
        self.last_activity_ms
    }

    pub fn last_correlation_id(&self) -> CorrelationId {
        self.last_correlation_id
    }

    /// Whether the session has been inactive for longer than `timeout_ms`.
    pub fn has_timed_out(&self, now_ms: u64, timeout_ms: u64) -> bool {
        now_ms > self.last_activity_ms + timeout_ms
    }

    /// Mark the session closed. The owner releases the response channel.
    pub fn close(&mut self) {
        self.state = SessionState::Closed;
    }
}
