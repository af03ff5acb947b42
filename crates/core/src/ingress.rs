//! Ingress dispatch contract.

use cadence_types::{CorrelationId, SessionId};

/// Controlled acknowledgement returned from the message callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlledPoll {
    /// The frame was consumed (accepted, or dropped for a dead session);
    /// the adapter advances past it.
    Continue,
    /// The frame could not be sequenced; the adapter must stop and re-offer
    /// it on the next poll.
    Abort,
}

/// Callbacks an ingress adapter dispatches inbound frames to.
pub trait IngressHandler {
    /// A client asked to open a session.
    fn on_session_connect(
        &mut self,
        correlation_id: CorrelationId,
        response_stream_id: i32,
        response_channel: &str,
        credentials: &[u8],
    );

    /// A client asked to close its session.
    fn on_session_close(&mut self, session_id: SessionId);

    /// A client message to sequence. The returned acknowledgement controls
    /// whether the adapter advances past the frame.
    fn on_session_message(
        &mut self,
        session_id: SessionId,
        correlation_id: CorrelationId,
        payload: &[u8],
    ) -> ControlledPoll;

    /// Refresh a session's activity without sequencing anything.
    fn on_keep_alive(&mut self, correlation_id: CorrelationId, session_id: SessionId);

    /// A client answered an authentication challenge.
    fn on_challenge_response(
        &mut self,
        correlation_id: CorrelationId,
        session_id: SessionId,
        credentials: &[u8],
    );

    /// Schedule (or replace) a timer.
    fn on_schedule_timer(&mut self, correlation_id: CorrelationId, deadline_ms: u64);

    /// Cancel a timer. Unknown ids are a no-op.
    fn on_cancel_timer(&mut self, correlation_id: CorrelationId);
}

/// Dispatches buffered inbound frames to the sequencer's callbacks.
pub trait IngressAdapter {
    /// Dispatch buffered frames in arrival order. Returns the number of
    /// frames consumed.
    ///
    /// When the message callback returns [`ControlledPoll::Abort`], the
    /// adapter must stop and re-offer the *identical* frame at the head of
    /// the next poll - fragment identity is preserved across retries so a
    /// refused append cannot reorder or drop a message.
    fn poll(&mut self, handler: &mut dyn IngressHandler) -> usize;

    /// Release transport resources.
    fn close(&mut self) {}
}
