//! Inbound frame taxonomy.

use crate::{CorrelationId, SessionId};
use serde::{Deserialize, Serialize};

/// Inbound frames dispatched by the ingress adapter.
///
/// Messages are **passive data** - they describe something a client asked
/// for. The sequencer processes them through its ingress callbacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IngressMessage {
    /// A client asks to open a session.
    SessionConnect {
        correlation_id: CorrelationId,
        response_stream_id: i32,
        response_channel: String,
        credentials: Vec<u8>,
    },

    /// A client asks to close its session.
    SessionClose { session_id: SessionId },

    /// A client message to be sequenced into the log.
    SessionMessage {
        session_id: SessionId,
        correlation_id: CorrelationId,
        payload: Vec<u8>,
    },

    /// Keep the session alive without sequencing anything.
    KeepAlive {
        correlation_id: CorrelationId,
        session_id: SessionId,
    },

    /// Response to an authentication challenge.
    ChallengeResponse {
        correlation_id: CorrelationId,
        session_id: SessionId,
        credentials: Vec<u8>,
    },

    /// Schedule (or replace) a timer named by its correlation id.
    ScheduleTimer {
        correlation_id: CorrelationId,
        deadline_ms: u64,
    },

    /// Cancel a previously scheduled timer. Unknown ids are a no-op.
    CancelTimer { correlation_id: CorrelationId },
}

impl IngressMessage {
    /// Get the message type name for telemetry.
    pub fn type_name(&self) -> &'static str {
        match self {
            IngressMessage::SessionConnect { .. } => "SessionConnect",
            IngressMessage::SessionClose { .. } => "SessionClose",
            IngressMessage::SessionMessage { .. } => "SessionMessage",
            IngressMessage::KeepAlive { .. } => "KeepAlive",
            IngressMessage::ChallengeResponse { .. } => "ChallengeResponse",
            IngressMessage::ScheduleTimer { .. } => "ScheduleTimer",
            IngressMessage::CancelTimer { .. } => "CancelTimer",
        }
    }
}
