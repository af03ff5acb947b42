//! The sequencer agent.

use crate::{SequencerConfig, TimerService};
use cadence_core::{
    Agent, Authenticator, ClockPair, ConsensusModuleAdapter, ContractError, ControlToggle,
    ControlledPoll, EgressPublisher, IngressAdapter, IngressHandler, LogAppender,
    ServiceAckHandler, SessionProxy, SharedCounter, ShutdownSignal,
};
use cadence_types::{
    CloseReason, CorrelationId, EventCode, ServiceAction, ServiceId, Session, SessionId,
    SessionState, ToggleCode,
};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Egress detail sent when the concurrent session limit is reached.
pub const SESSION_LIMIT_MSG: &str = "Concurrent session limit";

/// Egress detail sent when a session times out.
pub const SESSION_TIMEOUT_MSG: &str = "Session inactive";

/// Egress detail sent when a session fails authentication.
pub const SESSION_REJECTED_MSG: &str = "Session failed authentication";

/// Operational state of the sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    /// Waiting for every downstream service to signal readiness.
    Init,
    /// Sequencing: sessions, timers, and ingress are serviced.
    Active,
    /// Paused by an operator; only control and acks are serviced.
    Suspended,
    /// A snapshot request is in the log, awaiting acknowledgement.
    Snapshot,
    /// A shutdown request is in the log, awaiting acknowledgement.
    Shutdown,
    /// An abort request is in the log, awaiting acknowledgement.
    Abort,
    /// Terminal. The shutdown signal has been tripped.
    Closed,
}

impl SequencerState {
    pub fn name(self) -> &'static str {
        match self {
            SequencerState::Init => "init",
            SequencerState::Active => "active",
            SequencerState::Suspended => "suspended",
            SequencerState::Snapshot => "snapshot",
            SequencerState::Shutdown => "shutdown",
            SequencerState::Abort => "abort",
            SequencerState::Closed => "closed",
        }
    }
}

/// The single-threaded sequencer agent.
///
/// One tick ([`Sequencer::do_work`]) refreshes the cached clock, services
/// the ambient client conductor if owned, applies any operator toggle,
/// drains service acknowledgements, and - while active - advances pending
/// sessions, fires due timers, drains ingress, and ages active sessions.
/// Rejected-session notifications are flushed at the end of every tick.
///
/// Nothing blocks: a refused log append or egress send is retried on a
/// later tick.
pub struct Sequencer {
    core: SequencerCore,
    ingress: Box<dyn IngressAdapter>,
    consensus_adapter: Box<dyn ConsensusModuleAdapter>,
    /// Conductor of the ambient messaging client, present when this agent
    /// owns the client and must service it inline.
    client_invoker: Option<Box<dyn Agent>>,
}

/// Agent state behind the adapters.
///
/// Split from [`Sequencer`] so the adapters (owned by the outer struct) can
/// borrow the whole core as a dispatch target during their poll.
struct SequencerCore {
    config: SequencerConfig,
    clock: ClockPair,
    state: SequencerState,
    next_session_id: u64,
    services_ready: u32,
    timer_service: TimerService,
    log: Box<dyn LogAppender>,
    egress: Box<dyn EgressPublisher>,
    authenticator: Box<dyn Authenticator>,
    message_index: SharedCounter,
    control_toggle: ControlToggle,
    shutdown_signal: ShutdownSignal,
    /// Authenticated, logged sessions keyed by id. Iteration order is not
    /// contractual; a BTreeMap keeps sweeps reproducible run to run.
    sessions: BTreeMap<SessionId, Session>,
    /// Pre-authentication sessions, swept newest to oldest.
    pending_sessions: Vec<Session>,
    /// Terminal sessions awaiting a best-effort notification.
    rejected_sessions: Vec<Session>,
}

impl Sequencer {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: SequencerConfig,
        clock: ClockPair,
        log: Box<dyn LogAppender>,
        egress: Box<dyn EgressPublisher>,
        authenticator: Box<dyn Authenticator>,
        ingress: Box<dyn IngressAdapter>,
        consensus_adapter: Box<dyn ConsensusModuleAdapter>,
    ) -> Self {
        Self {
            core: SequencerCore {
                config,
                clock,
                state: SequencerState::Init,
                next_session_id: 1,
                services_ready: 0,
                timer_service: TimerService::new(),
                log,
                egress,
                authenticator,
                message_index: SharedCounter::new(),
                control_toggle: ControlToggle::new(),
                shutdown_signal: ShutdownSignal::new(),
                sessions: BTreeMap::new(),
                pending_sessions: Vec::new(),
                rejected_sessions: Vec::new(),
            },
            ingress,
            consensus_adapter,
            client_invoker: None,
        }
    }

    /// Take ownership of the ambient messaging client's conductor. Its
    /// lifecycle then also covers teardown of the transport resources.
    pub fn with_client_invoker(mut self, invoker: Box<dyn Agent>) -> Self {
        self.client_invoker = Some(invoker);
        self
    }

    /// Perform one tick. Returns the units of work done so the host
    /// scheduler can back off when idle.
    pub fn do_work(&mut self) -> Result<usize, ContractError> {
        let mut work_count = 0;

        let now_ms = self.core.clock.update();

        if let Some(invoker) = &mut self.client_invoker {
            work_count += invoker.do_work()?;
        }

        work_count += self.core.check_control_toggle(now_ms)?;
        work_count += self.consensus_adapter.poll(&mut self.core)?;

        if self.core.state == SequencerState::Active {
            work_count += self.core.process_pending_sessions(now_ms);
            work_count += self.core.poll_timers(now_ms);
            work_count += self.ingress.poll(&mut self.core);
            work_count += self.core.check_sessions(now_ms);
        }

        self.core.process_rejected_sessions(now_ms);

        Ok(work_count)
    }

    pub fn state(&self) -> SequencerState {
        self.core.state
    }

    /// Number of services that have signalled readiness.
    pub fn services_ready(&self) -> u32 {
        self.core.services_ready
    }

    /// Handle to the message index: incremented once per appended record,
    /// readable from observer threads.
    pub fn message_index(&self) -> SharedCounter {
        self.core.message_index.clone()
    }

    /// Handle to the operator control toggle.
    pub fn control_toggle(&self) -> ControlToggle {
        self.core.control_toggle.clone()
    }

    /// Handle to the shutdown latch tripped on terminal acknowledgements.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.core.shutdown_signal.clone()
    }

    pub fn active_session_count(&self) -> usize {
        self.core.sessions.len()
    }

    pub fn pending_session_count(&self) -> usize {
        self.core.pending_sessions.len()
    }

    pub fn rejected_session_count(&self) -> usize {
        self.core.rejected_sessions.len()
    }

    pub fn active_session_ids(&self) -> Vec<SessionId> {
        self.core.sessions.keys().copied().collect()
    }

    pub fn pending_session_ids(&self) -> Vec<SessionId> {
        self.core.pending_sessions.iter().map(Session::id).collect()
    }

    pub fn rejected_session_ids(&self) -> Vec<SessionId> {
        self.core
            .rejected_sessions
            .iter()
            .map(Session::id)
            .collect()
    }

    /// Number of live timers.
    pub fn scheduled_timer_count(&self) -> usize {
        self.core.timer_service.scheduled_count()
    }
}

impl Agent for Sequencer {
    fn do_work(&mut self) -> Result<usize, ContractError> {
        Sequencer::do_work(self)
    }

    fn role_name(&self) -> &'static str {
        "sequencer"
    }

    fn on_close(&mut self) {
        // When this agent owns the messaging client, teardown is delegated
        // to the client's own lifecycle.
        if self.client_invoker.is_none() {
            for session in self.core.sessions.values_mut() {
                session.close();
            }
            self.ingress.close();
            self.consensus_adapter.close();
        }
    }
}

impl SequencerCore {
    /// Apply the first matching control-toggle rule.
    ///
    /// A failed append leaves both the state and the toggle unchanged, so
    /// the same command is retried next tick. Abort is never reset: it is a
    /// terminal signal, and once the abort request is in flight (or the
    /// sequencer is closed) the still-set toggle is ignored.
    fn check_control_toggle(&mut self, now_ms: u64) -> Result<usize, ContractError> {
        let code = self.control_toggle.code();
        let Some(toggle) = ToggleCode::from_code(code) else {
            return Err(ContractError::UnknownToggleCode { code });
        };

        match (self.state, toggle) {
            (_, ToggleCode::Neutral) => Ok(0),

            (SequencerState::Abort | SequencerState::Closed, ToggleCode::Abort) => Ok(0),
            (_, ToggleCode::Abort) => {
                if self.log.append_action_request(ServiceAction::Abort, now_ms) {
                    self.message_index.increment();
                    self.state = SequencerState::Abort;
                    info!("abort requested");
                    Ok(1)
                } else {
                    Ok(0)
                }
            }

            (SequencerState::Active, ToggleCode::Snapshot) => {
                if self.log.append_action_request(ServiceAction::Snapshot, now_ms) {
                    self.message_index.increment();
                    self.state = SequencerState::Snapshot;
                    self.control_toggle.reset();
                    info!("snapshot requested");
                    Ok(1)
                } else {
                    Ok(0)
                }
            }

            (SequencerState::Active, ToggleCode::Shutdown) => {
                if self.log.append_action_request(ServiceAction::Shutdown, now_ms) {
                    self.message_index.increment();
                    self.state = SequencerState::Shutdown;
                    self.control_toggle.reset();
                    info!("shutdown requested");
                    Ok(1)
                } else {
                    Ok(0)
                }
            }

            (SequencerState::Active, ToggleCode::Suspend) => {
                self.state = SequencerState::Suspended;
                self.control_toggle.reset();
                info!("sequencing suspended");
                Ok(1)
            }

            (SequencerState::Suspended, ToggleCode::Resume) => {
                self.state = SequencerState::Active;
                self.control_toggle.reset();
                info!("sequencing resumed");
                Ok(1)
            }

            (state, toggle) => Err(ContractError::InvalidToggle {
                toggle,
                state: state.name(),
            }),
        }
    }

    /// Sweep the pending list, newest to oldest so removal is O(1) via
    /// swap-with-last.
    fn process_pending_sessions(&mut self, now_ms: u64) -> usize {
        let session_timeout_ms = self.config.session_timeout_ms;
        let mut work_count = 0;

        let Self {
            pending_sessions,
            rejected_sessions,
            sessions,
            egress,
            authenticator,
            log,
            message_index,
            ..
        } = self;

        let mut i = pending_sessions.len();
        while i > 0 {
            i -= 1;

            let session = &mut pending_sessions[i];
            if matches!(session.state(), SessionState::Init | SessionState::Connected)
                && egress.is_connected(session)
            {
                session.set_state(SessionState::Connected);
                let mut proxy = SessionProxy::new(session, egress.as_mut());
                authenticator.on_process_connected_session(&mut proxy, now_ms);
            }

            let session = &mut pending_sessions[i];
            if session.state() == SessionState::Challenged && egress.is_connected(session) {
                let mut proxy = SessionProxy::new(session, egress.as_mut());
                authenticator.on_process_challenged_session(&mut proxy, now_ms);
            }

            match pending_sessions[i].state() {
                SessionState::Authenticated => {
                    let mut session = pending_sessions.swap_remove(i);
                    session.set_last_activity_ms(now_ms);
                    if !append_connected_session(log.as_mut(), message_index, &mut session, now_ms)
                    {
                        // Park for the active-session sweep to retry.
                        session.set_state(SessionState::Connected);
                    }
                    debug!(session_id = %session.id(), "session promoted to active");
                    sessions.insert(session.id(), session);
                    work_count += 1;
                }
                SessionState::Rejected => {
                    let session = pending_sessions.swap_remove(i);
                    debug!(session_id = %session.id(), "session rejected by authenticator");
                    rejected_sessions.push(session);
                }
                _ => {
                    if pending_sessions[i].has_timed_out(now_ms, session_timeout_ms) {
                        // Never authenticated: dropped silently, no event.
                        let mut session = pending_sessions.swap_remove(i);
                        debug!(session_id = %session.id(), "pending session timed out");
                        session.close();
                    }
                }
            }
        }

        work_count
    }

    /// Fire due timers as log records. A refused append leaves the timer
    /// scheduled for the next tick.
    fn poll_timers(&mut self, now_ms: u64) -> usize {
        let Self {
            timer_service,
            log,
            message_index,
            ..
        } = self;

        timer_service.poll(now_ms, |correlation_id| {
            if log.append_timer_event(correlation_id, now_ms) {
                message_index.increment();
                true
            } else {
                false
            }
        })
    }

    /// Age the active map: close out timed-out sessions and retry the
    /// connected-session append for promoted sessions the log refused.
    fn check_sessions(&mut self, now_ms: u64) -> usize {
        let session_timeout_ms = self.config.session_timeout_ms;
        let mut work_count = 0;

        let Self {
            sessions,
            egress,
            log,
            message_index,
            ..
        } = self;

        sessions.retain(|_, session| {
            if session.has_timed_out(now_ms, session_timeout_ms) {
                match session.state() {
                    SessionState::Open => {
                        // Single best-effort notification, sent regardless
                        // of whether the close record lands this tick.
                        egress.send_event(session, EventCode::Error, SESSION_TIMEOUT_MSG);
                        if append_closed_session(
                            log.as_mut(),
                            message_index,
                            session,
                            CloseReason::Timeout,
                            now_ms,
                        ) {
                            debug!(session_id = %session.id(), "session timed out");
                            work_count += 1;
                            false
                        } else {
                            session.set_state(SessionState::TimedOut);
                            true
                        }
                    }
                    SessionState::TimedOut | SessionState::Closed => {
                        let reason = if session.state() == SessionState::TimedOut {
                            CloseReason::Timeout
                        } else {
                            CloseReason::UserAction
                        };
                        if append_closed_session(
                            log.as_mut(),
                            message_index,
                            session,
                            reason,
                            now_ms,
                        ) {
                            debug!(session_id = %session.id(), ?reason, "session closed");
                            work_count += 1;
                            false
                        } else {
                            true
                        }
                    }
                    _ => {
                        session.close();
                        false
                    }
                }
            } else if session.state() == SessionState::Connected {
                if append_connected_session(log.as_mut(), message_index, session, now_ms) {
                    work_count += 1;
                }
                true
            } else {
                true
            }
        });

        work_count
    }

    /// Best-effort rejection notifications. A session leaves the list when
    /// the send lands or the timeout passes, so a disconnected client
    /// cannot wedge the slot.
    fn process_rejected_sessions(&mut self, now_ms: u64) {
        let session_timeout_ms = self.config.session_timeout_ms;

        let Self {
            rejected_sessions,
            egress,
            ..
        } = self;

        let mut i = rejected_sessions.len();
        while i > 0 {
            i -= 1;

            let session = &rejected_sessions[i];
            let (code, detail) = if session.state() == SessionState::Rejected {
                (EventCode::AuthenticationRejected, SESSION_REJECTED_MSG)
            } else {
                (EventCode::Error, SESSION_LIMIT_MSG)
            };

            if egress.send_event(session, code, detail)
                || session.has_timed_out(now_ms, session_timeout_ms)
            {
                let mut session = rejected_sessions.swap_remove(i);
                debug!(session_id = %session.id(), detail, "rejected session dropped");
                session.close();
            }
        }
    }
}

impl ServiceAckHandler for SequencerCore {
    fn on_service_ack(
        &mut self,
        service_id: ServiceId,
        action: ServiceAction,
    ) -> Result<(), ContractError> {
        match action {
            ServiceAction::Ready => {
                if self.state != SequencerState::Init {
                    return Err(ContractError::UnexpectedServiceAck {
                        action,
                        state: self.state.name(),
                    });
                }
                if self.services_ready >= self.config.service_count {
                    return Err(ContractError::ServicesReadyOverflow {
                        count: self.services_ready + 1,
                        limit: self.config.service_count,
                    });
                }

                self.services_ready += 1;
                debug!(%service_id, ready = self.services_ready, "service ready");
                if self.services_ready == self.config.service_count {
                    self.state = SequencerState::Active;
                    info!(services = self.services_ready, "all services ready, sequencer active");
                }
            }

            ServiceAction::Snapshot => {
                if self.state == SequencerState::Snapshot {
                    self.state = SequencerState::Active;
                    info!(%service_id, "snapshot acknowledged");
                }
            }

            ServiceAction::Shutdown => {
                if self.state == SequencerState::Shutdown {
                    self.state = SequencerState::Closed;
                    self.shutdown_signal.signal();
                    info!(%service_id, "shutdown acknowledged, sequencer closed");
                }
            }

            ServiceAction::Abort => {
                if self.state == SequencerState::Abort {
                    self.state = SequencerState::Closed;
                    self.shutdown_signal.signal();
                    info!(%service_id, "abort acknowledged, sequencer closed");
                }
            }
        }

        Ok(())
    }
}

impl IngressHandler for SequencerCore {
    fn on_session_connect(
        &mut self,
        correlation_id: CorrelationId,
        response_stream_id: i32,
        response_channel: &str,
        credentials: &[u8],
    ) {
        let now_ms = self.clock.cached_now_ms();
        let session_id = SessionId(self.next_session_id);
        self.next_session_id += 1;

        let mut session = Session::new(session_id, response_stream_id, response_channel.to_string());
        session.record_activity(now_ms, correlation_id);

        self.authenticator
            .on_connect_request(session_id, credentials, now_ms);

        if self.pending_sessions.len() + self.sessions.len() < self.config.max_concurrent_sessions {
            debug!(%session_id, response_channel, "session connect admitted");
            self.pending_sessions.push(session);
        } else {
            debug!(%session_id, "session connect rejected, concurrent session limit");
            self.rejected_sessions.push(session);
        }
    }

    fn on_session_close(&mut self, session_id: SessionId) {
        let now_ms = self.clock.cached_now_ms();
        let Self {
            sessions,
            log,
            message_index,
            ..
        } = self;

        let appended = match sessions.get_mut(&session_id) {
            Some(session) => {
                session.close();
                append_closed_session(
                    log.as_mut(),
                    message_index,
                    session,
                    CloseReason::UserAction,
                    now_ms,
                )
            }
            None => false,
        };

        if appended {
            debug!(%session_id, "session closed by client");
            sessions.remove(&session_id);
        }
    }

    fn on_session_message(
        &mut self,
        session_id: SessionId,
        correlation_id: CorrelationId,
        payload: &[u8],
    ) -> ControlledPoll {
        let now_ms = self.clock.cached_now_ms();
        let Self {
            sessions,
            log,
            message_index,
            ..
        } = self;

        let Some(session) = sessions.get_mut(&session_id) else {
            // Session is gone; consume the frame so ingress advances.
            return ControlledPoll::Continue;
        };

        match session.state() {
            SessionState::TimedOut | SessionState::Closed => ControlledPoll::Continue,
            SessionState::Open => {
                if log.append_message(session_id, correlation_id, payload, now_ms) {
                    message_index.increment();
                    session.record_activity(now_ms, correlation_id);
                    ControlledPoll::Continue
                } else {
                    ControlledPoll::Abort
                }
            }
            // Live but not yet logged: the connected-session record must
            // precede any message, so hold the frame.
            _ => ControlledPoll::Abort,
        }
    }

    fn on_keep_alive(&mut self, correlation_id: CorrelationId, session_id: SessionId) {
        let now_ms = self.clock.cached_now_ms();
        if let Some(session) = self.sessions.get_mut(&session_id) {
            session.record_activity(now_ms, correlation_id);
        }
    }

    fn on_challenge_response(
        &mut self,
        correlation_id: CorrelationId,
        session_id: SessionId,
        credentials: &[u8],
    ) {
        let now_ms = self.clock.cached_now_ms();
        let Self {
            pending_sessions,
            authenticator,
            ..
        } = self;

        for session in pending_sessions.iter_mut().rev() {
            if session.id() == session_id && session.state() == SessionState::Challenged {
                session.record_activity(now_ms, correlation_id);
                authenticator.on_challenge_response(session_id, credentials, now_ms);
                break;
            }
        }
    }

    fn on_schedule_timer(&mut self, correlation_id: CorrelationId, deadline_ms: u64) {
        self.timer_service.schedule_timer(correlation_id, deadline_ms);
    }

    fn on_cancel_timer(&mut self, correlation_id: CorrelationId) {
        self.timer_service.cancel_timer(correlation_id);
    }
}

/// Append the connected-session record; on success the session opens and
/// the message index advances.
fn append_connected_session(
    log: &mut dyn LogAppender,
    message_index: &SharedCounter,
    session: &mut Session,
    now_ms: u64,
) -> bool {
    if log.append_connected_session(session, now_ms) {
        session.set_state(SessionState::Open);
        message_index.increment();
        true
    } else {
        false
    }
}

/// Append the closed-session record; on success the message index advances
/// and the session is closed.
fn append_closed_session(
    log: &mut dyn LogAppender,
    message_index: &SharedCounter,
    session: &mut Session,
    reason: CloseReason,
    now_ms: u64,
) -> bool {
    if log.append_closed_session(session, reason, now_ms) {
        message_index.increment();
        session.close();
        true
    } else {
        false
    }
}
