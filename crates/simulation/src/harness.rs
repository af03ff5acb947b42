//! Wired-up sequencer for deterministic tests.

use crate::{
    ManualClock, QueueConsensus, QueueIngress, RecordingEgress, RecordingLog,
    ScriptedAuthenticator,
};
use cadence_core::{ClockPair, ContractError};
use cadence_sequencer::{Sequencer, SequencerConfig};
use cadence_types::{
    CorrelationId, IngressMessage, LogRecord, ServiceAction, ServiceId, ToggleCode,
};

/// Statistics collected while driving a harness.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarnessStats {
    /// Ticks run.
    pub ticks: u64,
    /// Total work units returned by the ticks.
    pub work: u64,
    /// Records the log accepted.
    pub records_appended: u64,
    /// Appends the log refused.
    pub appends_refused: u64,
    /// Events and challenges egress delivered.
    pub events_sent: u64,
    /// Sends egress refused.
    pub events_refused: u64,
}

/// A sequencer wired to the in-memory collaborators, plus the handles to
/// script and inspect them.
pub struct SequencerHarness {
    pub clock: ManualClock,
    pub log: RecordingLog,
    pub egress: RecordingEgress,
    pub ingress: QueueIngress,
    pub consensus: QueueConsensus,
    pub authenticator: ScriptedAuthenticator,
    config: SequencerConfig,
    sequencer: Sequencer,
    ticks: u64,
    work: u64,
}

impl SequencerHarness {
    /// A harness with an accept-all authenticator.
    pub fn new(config: SequencerConfig) -> Self {
        Self::with_authenticator(config, ScriptedAuthenticator::accept_all())
    }

    pub fn with_authenticator(config: SequencerConfig, authenticator: ScriptedAuthenticator) -> Self {
        let clock = ManualClock::new(0);
        let log = RecordingLog::new();
        let egress = RecordingEgress::new();
        let ingress = QueueIngress::new();
        let consensus = QueueConsensus::new();

        let sequencer = Sequencer::new(
            config.clone(),
            ClockPair::new(Box::new(clock.clone())),
            Box::new(log.clone()),
            Box::new(egress.clone()),
            Box::new(authenticator.clone()),
            Box::new(ingress.clone()),
            Box::new(consensus.clone()),
        );

        Self {
            clock,
            log,
            egress,
            ingress,
            consensus,
            authenticator,
            config,
            sequencer,
            ticks: 0,
            work: 0,
        }
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    /// Run one tick, panicking on contract violations.
    pub fn tick(&mut self) -> usize {
        self.try_tick().expect("sequencer contract violation")
    }

    /// Run one tick, surfacing contract violations.
    pub fn try_tick(&mut self) -> Result<usize, ContractError> {
        let work_count = self.sequencer.do_work()?;
        self.ticks += 1;
        self.work += work_count as u64;
        Ok(work_count)
    }

    /// Advance the clock, then tick.
    pub fn advance_and_tick(&mut self, ms: u64) -> usize {
        self.clock.advance(ms);
        self.tick()
    }

    /// Acknowledge readiness for every configured service, then tick.
    pub fn activate(&mut self) {
        for i in 0..self.config.service_count {
            self.ack(ServiceId(i as u64), ServiceAction::Ready);
        }
        self.tick();
    }

    /// Enqueue an inbound frame.
    pub fn offer(&mut self, message: IngressMessage) {
        self.ingress.offer(message);
    }

    /// Enqueue a session connect with a conventional response channel.
    pub fn connect_session(&mut self, correlation_id: u64) {
        self.offer(IngressMessage::SessionConnect {
            correlation_id: CorrelationId(correlation_id),
            response_stream_id: 1,
            response_channel: "client-response".to_string(),
            credentials: Vec::new(),
        });
    }

    /// Enqueue a service acknowledgement.
    pub fn ack(&mut self, service_id: ServiceId, action: ServiceAction) {
        self.consensus.ack(service_id, action);
    }

    /// Inject an operator toggle.
    pub fn toggle(&mut self, toggle: ToggleCode) {
        self.sequencer.control_toggle().signal(toggle);
    }

    /// Snapshot of accepted log records.
    pub fn records(&self) -> Vec<LogRecord> {
        self.log.records()
    }

    pub fn stats(&self) -> HarnessStats {
        HarnessStats {
            ticks: self.ticks,
            work: self.work,
            records_appended: self.log.append_count(),
            appends_refused: self.log.refused_count(),
            events_sent: self.egress.sent_count(),
            events_refused: self.egress.refused_count(),
        }
    }

    /// Assert the sequencer's structural invariants.
    ///
    /// - container exclusivity: no session id in more than one container
    /// - index pairing: message index equals accepted appends
    /// - admission bound: pending + active within the configured limit
    pub fn assert_invariants(&self) {
        let pending = self.sequencer.pending_session_ids();
        let active = self.sequencer.active_session_ids();
        let rejected = self.sequencer.rejected_session_ids();

        let total = pending.len() + active.len() + rejected.len();
        let mut all: Vec<_> = pending
            .iter()
            .chain(active.iter())
            .chain(rejected.iter())
            .collect();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), total, "session id owned by more than one container");

        assert_eq!(
            self.sequencer.message_index().get(),
            self.log.append_count(),
            "message index out of step with accepted appends"
        );

        assert!(
            pending.len() + active.len() <= self.config.max_concurrent_sessions,
            "admission bound exceeded: {} pending + {} active > {}",
            pending.len(),
            active.len(),
            self.config.max_concurrent_sessions
        );
    }
}
