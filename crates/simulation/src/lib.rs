//! Deterministic in-memory harness for the cadence sequencer.
//!
//! Everything here is scriptable and inspectable from tests: a manual
//! clock, a recording log with scriptable refusals, a recording egress with
//! scriptable connectivity, queue-backed ingress and consensus adapters,
//! and a scripted authenticator. [`SequencerHarness`] wires a sequencer to
//! one of each.
//!
//! Given the same scripted inputs, a harness run produces identical log
//! records and statistics every time - the property the determinism tests
//! assert.

mod auth;
mod clock;
mod consensus;
mod egress;
mod harness;
mod ingress;
mod log;

pub use auth::ScriptedAuthenticator;
pub use clock::ManualClock;
pub use consensus::QueueConsensus;
pub use egress::{EgressEvent, RecordingEgress};
pub use harness::{HarnessStats, SequencerHarness};
pub use ingress::QueueIngress;
pub use log::RecordingLog;
