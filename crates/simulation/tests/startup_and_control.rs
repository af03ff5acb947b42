//! Startup and control-toggle tests.
//!
//! Covers service readiness, the operator toggle state machine, append
//! refusal under each toggle, and the terminal acknowledgements.

use cadence_core::ContractError;
use cadence_sequencer::{SequencerConfig, SequencerState};
use cadence_simulation::SequencerHarness;
use cadence_types::{LogRecord, ServiceAction, ServiceId, ToggleCode};
use tracing_test::traced_test;

#[traced_test]
#[test]
fn test_activates_after_every_service_is_ready() {
    let mut harness = SequencerHarness::new(SequencerConfig::new().with_service_count(2));

    harness.ack(ServiceId(0), ServiceAction::Ready);
    harness.tick();
    assert_eq!(harness.sequencer().state(), SequencerState::Init);
    assert_eq!(harness.sequencer().services_ready(), 1);

    harness.ack(ServiceId(1), ServiceAction::Ready);
    harness.tick();
    assert_eq!(harness.sequencer().state(), SequencerState::Active);

    // Startup emits no log records of its own.
    assert!(harness.records().is_empty());
}

#[test]
fn test_ready_after_activation_is_fatal() {
    let mut harness = SequencerHarness::new(SequencerConfig::new().with_service_count(1));

    harness.ack(ServiceId(0), ServiceAction::Ready);
    harness.tick();

    // The sequencer is active; a further READY is a contract violation.
    harness.ack(ServiceId(1), ServiceAction::Ready);
    let err = harness.try_tick().unwrap_err();
    assert!(matches!(err, ContractError::UnexpectedServiceAck { .. }));
}

#[test]
fn test_ready_with_no_configured_services_is_fatal() {
    let mut harness = SequencerHarness::new(SequencerConfig::new().with_service_count(0));

    harness.ack(ServiceId(0), ServiceAction::Ready);
    let err = harness.try_tick().unwrap_err();
    assert!(matches!(err, ContractError::ServicesReadyOverflow { .. }));
}

#[test]
fn test_neutral_toggle_is_a_noop() {
    let mut harness = SequencerHarness::new(SequencerConfig::new());
    harness.activate();

    for _ in 0..5 {
        assert_eq!(harness.tick(), 0);
    }
    assert_eq!(harness.sequencer().state(), SequencerState::Active);
    assert!(harness.records().is_empty());
}

#[test]
fn test_idle_tick_returns_zero_work() {
    let mut harness = SequencerHarness::new(SequencerConfig::new());
    harness.activate();
    assert_eq!(harness.tick(), 0);
}

#[test]
fn test_snapshot_round_trip() {
    let mut harness = SequencerHarness::new(SequencerConfig::new());
    harness.activate();

    harness.toggle(ToggleCode::Snapshot);
    assert_eq!(harness.tick(), 1);
    assert_eq!(harness.sequencer().state(), SequencerState::Snapshot);
    assert_eq!(
        harness.sequencer().control_toggle().code(),
        ToggleCode::Neutral.code()
    );
    assert!(matches!(
        harness.records()[..],
        [LogRecord::ActionRequest {
            action: ServiceAction::Snapshot,
            ..
        }]
    ));

    harness.ack(ServiceId(0), ServiceAction::Snapshot);
    harness.tick();
    assert_eq!(harness.sequencer().state(), SequencerState::Active);
}

#[test]
fn test_snapshot_append_refusal_retries_next_tick() {
    let mut harness = SequencerHarness::new(SequencerConfig::new());
    harness.activate();

    harness.log.refuse_next(1);
    harness.toggle(ToggleCode::Snapshot);
    assert_eq!(harness.tick(), 0);

    // State unchanged, toggle not reset, nothing appended.
    assert_eq!(harness.sequencer().state(), SequencerState::Active);
    assert_eq!(
        harness.sequencer().control_toggle().code(),
        ToggleCode::Snapshot.code()
    );
    assert!(harness.records().is_empty());

    assert_eq!(harness.tick(), 1);
    assert_eq!(harness.sequencer().state(), SequencerState::Snapshot);
    assert_eq!(harness.records().len(), 1);
}

#[test]
fn test_suspend_skips_sequencing_until_resume() {
    let mut harness = SequencerHarness::new(SequencerConfig::new());
    harness.activate();

    // A frame arrives, then the operator suspends before the next tick.
    harness.connect_session(100);
    harness.toggle(ToggleCode::Suspend);
    harness.tick();
    assert_eq!(harness.sequencer().state(), SequencerState::Suspended);

    // Ingress was not drained while suspended.
    assert_eq!(harness.ingress.len(), 1);
    assert_eq!(harness.sequencer().pending_session_count(), 0);
    assert!(harness.records().is_empty());

    harness.toggle(ToggleCode::Resume);
    harness.tick();
    assert_eq!(harness.sequencer().state(), SequencerState::Active);
    assert_eq!(harness.ingress.len(), 0);
    assert_eq!(harness.sequencer().pending_session_count(), 1);
}

#[test]
fn test_shutdown_ack_closes_and_signals() {
    let mut harness = SequencerHarness::new(SequencerConfig::new());
    harness.activate();
    let shutdown = harness.sequencer().shutdown_signal();

    harness.toggle(ToggleCode::Shutdown);
    harness.tick();
    assert_eq!(harness.sequencer().state(), SequencerState::Shutdown);
    assert!(matches!(
        harness.records()[..],
        [LogRecord::ActionRequest {
            action: ServiceAction::Shutdown,
            ..
        }]
    ));
    assert!(!shutdown.is_signalled());

    harness.ack(ServiceId(0), ServiceAction::Shutdown);
    harness.tick();
    assert_eq!(harness.sequencer().state(), SequencerState::Closed);
    assert!(shutdown.is_signalled());
}

#[test]
fn test_abort_retries_until_appended_then_closes_on_ack() {
    let mut harness = SequencerHarness::new(SequencerConfig::new());
    harness.activate();

    harness.log.set_refusing(true);
    harness.toggle(ToggleCode::Abort);
    assert_eq!(harness.tick(), 0);
    assert_eq!(harness.sequencer().state(), SequencerState::Active);
    assert_eq!(
        harness.sequencer().control_toggle().code(),
        ToggleCode::Abort.code()
    );

    // Retried every tick until the log accepts.
    assert_eq!(harness.tick(), 0);
    harness.log.set_refusing(false);
    assert_eq!(harness.tick(), 1);
    assert_eq!(harness.sequencer().state(), SequencerState::Abort);
    assert!(matches!(
        harness.records()[..],
        [LogRecord::ActionRequest {
            action: ServiceAction::Abort,
            ..
        }]
    ));

    // Abort is terminal: the toggle stays set and further ticks are benign.
    assert_eq!(
        harness.sequencer().control_toggle().code(),
        ToggleCode::Abort.code()
    );
    assert_eq!(harness.tick(), 0);
    assert_eq!(harness.records().len(), 1);

    harness.ack(ServiceId(0), ServiceAction::Abort);
    harness.tick();
    assert_eq!(harness.sequencer().state(), SequencerState::Closed);
    assert!(harness.sequencer().shutdown_signal().is_signalled());
}

#[test]
fn test_abort_applies_from_suspended() {
    let mut harness = SequencerHarness::new(SequencerConfig::new());
    harness.activate();

    harness.toggle(ToggleCode::Suspend);
    harness.tick();
    assert_eq!(harness.sequencer().state(), SequencerState::Suspended);

    harness.toggle(ToggleCode::Abort);
    harness.tick();
    assert_eq!(harness.sequencer().state(), SequencerState::Abort);
}

#[test]
fn test_unknown_toggle_code_is_fatal() {
    let mut harness = SequencerHarness::new(SequencerConfig::new());
    harness.activate();

    harness.sequencer().control_toggle().set_code(99);
    let err = harness.try_tick().unwrap_err();
    assert_eq!(err, ContractError::UnknownToggleCode { code: 99 });
}

#[test]
fn test_toggle_invalid_for_state_is_fatal() {
    let mut harness = SequencerHarness::new(SequencerConfig::new());
    harness.activate();

    // Resume without a preceding suspend.
    harness.toggle(ToggleCode::Resume);
    let err = harness.try_tick().unwrap_err();
    assert!(matches!(err, ContractError::InvalidToggle { .. }));
}

#[test]
fn test_snapshot_before_activation_is_fatal() {
    let mut harness = SequencerHarness::new(SequencerConfig::new());

    harness.toggle(ToggleCode::Snapshot);
    let err = harness.try_tick().unwrap_err();
    assert!(matches!(err, ContractError::InvalidToggle { .. }));
}
