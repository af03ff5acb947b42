//! Replicated-log record model.

use crate::{CloseReason, CorrelationId, ServiceAction, SessionId};
use serde::{Deserialize, Serialize};

/// Records the sequencer appends to the replicated log.
///
/// Every successfully appended record is paired with exactly one increment
/// of the sequencer's message index, so the log order and the index agree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogRecord {
    /// A session authenticated and was admitted to the cluster.
    ConnectedSession {
        session_id: SessionId,
        correlation_id: CorrelationId,
        response_stream_id: i32,
        response_channel: String,
        timestamp_ms: u64,
    },

    /// A session ended, with the reason it ended.
    ClosedSession {
        session_id: SessionId,
        reason: CloseReason,
        timestamp_ms: u64,
    },

    /// An ordered client message.
    ClientMessage {
        session_id: SessionId,
        correlation_id: CorrelationId,
        payload: Vec<u8>,
        timestamp_ms: u64,
    },

    /// A scheduled timer fired.
    TimerEvent {
        correlation_id: CorrelationId,
        timestamp_ms: u64,
    },

    /// The sequencer requested a mode change of downstream services.
    ActionRequest {
        action: ServiceAction,
        timestamp_ms: u64,
    },
}

impl LogRecord {
    /// Get the record type name for telemetry.
    pub fn type_name(&self) -> &'static str {
        match self {
            LogRecord::ConnectedSession { .. } => "ConnectedSession",
            LogRecord::ClosedSession { .. } => "ClosedSession",
            LogRecord::ClientMessage { .. } => "ClientMessage",
            LogRecord::TimerEvent { .. } => "TimerEvent",
            LogRecord::ActionRequest { .. } => "ActionRequest",
        }
    }
}
