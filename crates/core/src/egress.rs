//! Egress publication contract.

use cadence_types::{EventCode, Session};

/// Non-blocking event send to a session's response channel.
///
/// Sends are best-effort: `false` means the channel applied backpressure or
/// is not connected. Callers decide whether to retry on a later tick or to
/// proceed regardless.
pub trait EgressPublisher {
    /// Whether the session's response channel is connected end-to-end.
    fn is_connected(&self, session: &Session) -> bool;

    /// Send a session event with a detail string.
    fn send_event(&mut self, session: &Session, code: EventCode, detail: &str) -> bool;

    /// Send an authentication challenge payload.
    fn send_challenge(&mut self, session: &Session, challenge: &[u8]) -> bool;
}
