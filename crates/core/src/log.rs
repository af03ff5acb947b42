//! Replicated-log append contract.

use cadence_types::{CloseReason, CorrelationId, ServiceAction, Session, SessionId};

/// Non-blocking append of records to the replicated log.
///
/// Every method attempts one publication and returns whether the log
/// accepted it. `false` means "try again next tick": the publication applied
/// backpressure. No back-off is required; the tick cadence is the back-off.
///
/// The caller increments its message index exactly once per `true` return,
/// which is what keeps the index and the log in lockstep.
pub trait LogAppender {
    /// Append a connected-session record for a newly admitted session.
    fn append_connected_session(&mut self, session: &Session, now_ms: u64) -> bool;

    /// Append a closed-session record with the reason the session ended.
    fn append_closed_session(&mut self, session: &Session, reason: CloseReason, now_ms: u64)
        -> bool;

    /// Append an ordered client message.
    fn append_message(
        &mut self,
        session_id: SessionId,
        correlation_id: CorrelationId,
        payload: &[u8],
        now_ms: u64,
    ) -> bool;

    /// Append a timer-fired record.
    fn append_timer_event(&mut self, correlation_id: CorrelationId, now_ms: u64) -> bool;

    /// Append a mode-change request for downstream services.
    fn append_action_request(&mut self, action: ServiceAction, now_ms: u64) -> bool;
}
