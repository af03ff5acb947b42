//! Scripted authenticator.

use cadence_core::{Authenticator, SessionProxy};
use cadence_types::SessionId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
enum AuthMode {
    AcceptAll,
    RejectAll,
    Challenge {
        challenge: Vec<u8>,
        expected_response: Vec<u8>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    /// Challenge outstanding; no verdict yet.
    Pending,
    Accept,
    Reject,
}

#[derive(Debug)]
struct ScriptedAuthenticatorInner {
    mode: AuthMode,
    verdicts: HashMap<SessionId, Verdict>,
    /// Session ids observed by `on_connect_request`, in order.
    connect_requests: Vec<SessionId>,
}

/// Authenticator driven by a fixed script: accept everything, reject
/// everything, or challenge and compare the response against an expected
/// credential.
///
/// Clones share state, so tests can inspect the observed connect requests.
#[derive(Debug, Clone)]
pub struct ScriptedAuthenticator {
    inner: Arc<Mutex<ScriptedAuthenticatorInner>>,
}

impl ScriptedAuthenticator {
    fn with_mode(mode: AuthMode) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ScriptedAuthenticatorInner {
                mode,
                verdicts: HashMap::new(),
                connect_requests: Vec::new(),
            })),
        }
    }

    /// Authenticate every session immediately.
    pub fn accept_all() -> Self {
        Self::with_mode(AuthMode::AcceptAll)
    }

    /// Reject every session.
    pub fn reject_all() -> Self {
        Self::with_mode(AuthMode::RejectAll)
    }

    /// Challenge every session and accept exactly `expected_response`.
    pub fn challenge(challenge: Vec<u8>, expected_response: Vec<u8>) -> Self {
        Self::with_mode(AuthMode::Challenge {
            challenge,
            expected_response,
        })
    }

    /// Session ids observed via connect requests, in arrival order.
    pub fn connect_requests(&self) -> Vec<SessionId> {
        self.inner.lock().unwrap().connect_requests.clone()
    }
}

impl Authenticator for ScriptedAuthenticator {
    fn on_connect_request(&mut self, session_id: SessionId, _credentials: &[u8], _now_ms: u64) {
        let mut inner = self.inner.lock().unwrap();
        inner.connect_requests.push(session_id);
        let verdict = match inner.mode {
            AuthMode::AcceptAll => Verdict::Accept,
            AuthMode::RejectAll => Verdict::Reject,
            AuthMode::Challenge { .. } => Verdict::Pending,
        };
        inner.verdicts.insert(session_id, verdict);
    }

    fn on_challenge_response(&mut self, session_id: SessionId, credentials: &[u8], _now_ms: u64) {
        let mut inner = self.inner.lock().unwrap();
        if let AuthMode::Challenge {
            expected_response, ..
        } = &inner.mode
        {
            let verdict = if credentials == expected_response.as_slice() {
                Verdict::Accept
            } else {
                Verdict::Reject
            };
            inner.verdicts.insert(session_id, verdict);
        }
    }

    fn on_process_connected_session(&mut self, proxy: &mut SessionProxy<'_>, _now_ms: u64) {
        let inner = self.inner.lock().unwrap();
        match inner.verdicts.get(&proxy.session_id()) {
            Some(Verdict::Accept) => proxy.authenticate(),
            Some(Verdict::Reject) => proxy.reject(),
            Some(Verdict::Pending) => {
                if let AuthMode::Challenge { challenge, .. } = &inner.mode {
                    // Refusal leaves the session connected; retried next tick.
                    proxy.challenge(challenge);
                }
            }
            None => {}
        }
    }

    fn on_process_challenged_session(&mut self, proxy: &mut SessionProxy<'_>, _now_ms: u64) {
        let inner = self.inner.lock().unwrap();
        match inner.verdicts.get(&proxy.session_id()) {
            Some(Verdict::Accept) => proxy.authenticate(),
            Some(Verdict::Reject) => proxy.reject(),
            _ => {}
        }
    }
}
