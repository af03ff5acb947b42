//! Pluggable authentication contract.

use crate::EgressPublisher;
use cadence_types::{Session, SessionId, SessionState};

/// Drives a session from connected through challenged to authenticated or
/// rejected. The sequencer treats credentials as opaque bytes.
///
/// The `on_process_*` upcalls run once per tick for each pending session
/// whose response channel is connected, giving the authenticator a place to
/// make progress (issue a challenge, conclude a verdict) without owning any
/// scheduling of its own.
pub trait Authenticator {
    /// A client asked to connect. Called before the admission check, so
    /// every connect attempt is observed even if the session is then
    /// rejected over the concurrent-session limit.
    fn on_connect_request(&mut self, session_id: SessionId, credentials: &[u8], now_ms: u64);

    /// A client answered an outstanding challenge.
    fn on_challenge_response(&mut self, session_id: SessionId, credentials: &[u8], now_ms: u64);

    /// Per-tick progress for a session in the connected state.
    fn on_process_connected_session(&mut self, proxy: &mut SessionProxy<'_>, now_ms: u64);

    /// Per-tick progress for a session awaiting a challenge response.
    fn on_process_challenged_session(&mut self, proxy: &mut SessionProxy<'_>, now_ms: u64);
}

/// Capability handed to the authenticator, scoped to one upcall.
///
/// Exposes exactly the mutations the authenticator is allowed: move the
/// session to challenged (by sending a challenge), authenticated, or
/// rejected. No long-lived back-reference into the sequencer exists.
pub struct SessionProxy<'a> {
    session: &'a mut Session,
    egress: &'a mut dyn EgressPublisher,
}

impl<'a> SessionProxy<'a> {
    pub fn new(session: &'a mut Session, egress: &'a mut dyn EgressPublisher) -> Self {
        Self { session, egress }
    }

    /// The session under authentication.
    pub fn session_id(&self) -> SessionId {
        self.session.id()
    }

    /// Send a challenge to the client. On delivery the session becomes
    /// challenged; on refusal it is left unchanged and the authenticator
    /// will be invoked again next tick.
    pub fn challenge(&mut self, payload: &[u8]) -> bool {
        if self.egress.send_challenge(self.session, payload) {
            self.session.set_state(SessionState::Challenged);
            true
        } else {
            false
        }
    }

    /// Conclude authentication successfully.
    pub fn authenticate(&mut self) {
        self.session.set_state(SessionState::Authenticated);
    }

    /// Conclude authentication with a rejection.
    pub fn reject(&mut self) {
        self.session.set_state(SessionState::Rejected);
    }
}
