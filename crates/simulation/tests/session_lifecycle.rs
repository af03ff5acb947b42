//! Session lifecycle tests.
//!
//! Covers admission, authentication (accept, reject, challenge), promotion
//! and the connected-session append retry, client messages with controlled
//! acknowledgement, keep-alives, closes, and timeouts.

use cadence_sequencer::{SequencerConfig, SESSION_LIMIT_MSG, SESSION_REJECTED_MSG, SESSION_TIMEOUT_MSG};
use cadence_simulation::{ScriptedAuthenticator, SequencerHarness};
use cadence_types::{
    CloseReason, CorrelationId, EventCode, IngressMessage, LogRecord, SessionId,
};
use tracing_test::traced_test;

fn config() -> SequencerConfig {
    SequencerConfig::new()
        .with_max_concurrent_sessions(4)
        .with_session_timeout_ms(1_000)
}

fn message(session_id: u64, correlation_id: u64, payload: &[u8]) -> IngressMessage {
    IngressMessage::SessionMessage {
        session_id: SessionId(session_id),
        correlation_id: CorrelationId(correlation_id),
        payload: payload.to_vec(),
    }
}

/// Connect one session and drive it to open. Returns its id.
fn open_session(harness: &mut SequencerHarness, correlation_id: u64) -> SessionId {
    harness.connect_session(correlation_id);
    harness.tick();
    harness.tick();
    let active = harness.sequencer().active_session_ids();
    assert_eq!(active.len(), 1);
    active[0]
}

#[test]
fn test_happy_session_lifecycle() {
    let mut harness = SequencerHarness::new(config());
    harness.activate();

    // Connect lands in pending on the tick that drains ingress.
    harness.connect_session(100);
    harness.tick();
    assert_eq!(harness.sequencer().pending_session_count(), 1);
    assert!(harness.records().is_empty());

    // Next tick authenticates and promotes: one record, one index step.
    harness.tick();
    assert_eq!(harness.sequencer().pending_session_count(), 0);
    assert_eq!(harness.sequencer().active_session_ids(), vec![SessionId(1)]);
    assert_eq!(harness.sequencer().message_index().get(), 1);
    assert!(matches!(
        harness.records()[..],
        [LogRecord::ConnectedSession {
            session_id: SessionId(1),
            correlation_id: CorrelationId(100),
            ..
        }]
    ));

    // A client message is sequenced and stamps activity.
    harness.offer(message(1, 101, &[0xAB]));
    harness.tick();
    let records = harness.records();
    assert_eq!(records.len(), 2);
    match &records[1] {
        LogRecord::ClientMessage {
            session_id,
            correlation_id,
            payload,
            ..
        } => {
            assert_eq!(*session_id, SessionId(1));
            assert_eq!(*correlation_id, CorrelationId(101));
            assert_eq!(payload, &vec![0xAB]);
        }
        other => panic!("expected ClientMessage, got {other:?}"),
    }
    assert_eq!(harness.sequencer().message_index().get(), 2);

    // Close appends the user-action record and frees the slot.
    harness.offer(IngressMessage::SessionClose {
        session_id: SessionId(1),
    });
    harness.tick();
    assert!(matches!(
        harness.records()[2],
        LogRecord::ClosedSession {
            session_id: SessionId(1),
            reason: CloseReason::UserAction,
            ..
        }
    ));
    assert_eq!(harness.sequencer().active_session_count(), 0);
    assert_eq!(harness.sequencer().message_index().get(), 3);
}

#[test]
fn test_session_ids_are_assigned_in_order() {
    let mut harness = SequencerHarness::new(config());
    harness.activate();

    harness.connect_session(1);
    harness.connect_session(2);
    harness.connect_session(3);
    harness.tick();

    assert_eq!(
        harness.authenticator.connect_requests(),
        vec![SessionId(1), SessionId(2), SessionId(3)]
    );
}

#[test]
fn test_over_limit_connect_is_rejected_with_event() {
    let mut harness =
        SequencerHarness::new(config().with_max_concurrent_sessions(1));
    harness.activate();
    open_session(&mut harness, 100);

    harness.connect_session(200);
    harness.tick();

    let events = harness.egress.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].session_id, SessionId(2));
    assert_eq!(events[0].code, EventCode::Error);
    assert_eq!(events[0].detail, SESSION_LIMIT_MSG);

    // Dropped after notification; the admitted session is untouched.
    assert_eq!(harness.sequencer().rejected_session_count(), 0);
    assert_eq!(harness.sequencer().active_session_ids(), vec![SessionId(1)]);
}

#[test]
fn test_admission_bound_holds_at_connect() {
    let mut harness =
        SequencerHarness::new(config().with_max_concurrent_sessions(2));
    harness.activate();

    for correlation_id in 0..5 {
        harness.connect_session(correlation_id);
    }
    harness.tick();

    assert_eq!(harness.sequencer().pending_session_count(), 2);
    assert_eq!(harness.sequencer().rejected_session_count(), 3);
}

#[test]
fn test_auth_rejection_sends_rejected_event() {
    let mut harness =
        SequencerHarness::with_authenticator(config(), ScriptedAuthenticator::reject_all());
    harness.activate();

    harness.connect_session(100);
    harness.tick();
    harness.tick();

    let events = harness.egress.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].code, EventCode::AuthenticationRejected);
    assert_eq!(events[0].detail, SESSION_REJECTED_MSG);

    assert_eq!(harness.sequencer().rejected_session_count(), 0);
    assert!(harness.records().is_empty());
}

#[test]
fn test_challenge_round_trip_authenticates() {
    let mut harness = SequencerHarness::with_authenticator(
        config(),
        ScriptedAuthenticator::challenge(b"challenge-1".to_vec(), b"secret".to_vec()),
    );
    harness.activate();

    harness.connect_session(100);
    harness.tick();
    harness.tick();

    // The challenge went out and the session is held in pending.
    assert_eq!(
        harness.egress.challenges(),
        vec![(SessionId(1), b"challenge-1".to_vec())]
    );
    assert_eq!(harness.sequencer().pending_session_count(), 1);

    harness.offer(IngressMessage::ChallengeResponse {
        correlation_id: CorrelationId(101),
        session_id: SessionId(1),
        credentials: b"secret".to_vec(),
    });
    harness.tick();
    harness.tick();

    assert_eq!(harness.sequencer().active_session_ids(), vec![SessionId(1)]);
    assert!(matches!(
        harness.records()[..],
        [LogRecord::ConnectedSession { .. }]
    ));
}

#[test]
fn test_wrong_challenge_response_is_rejected() {
    let mut harness = SequencerHarness::with_authenticator(
        config(),
        ScriptedAuthenticator::challenge(b"challenge-1".to_vec(), b"secret".to_vec()),
    );
    harness.activate();

    harness.connect_session(100);
    harness.tick();
    harness.tick();

    harness.offer(IngressMessage::ChallengeResponse {
        correlation_id: CorrelationId(101),
        session_id: SessionId(1),
        credentials: b"wrong".to_vec(),
    });
    harness.tick();
    harness.tick();

    let events = harness.egress.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].code, EventCode::AuthenticationRejected);
    assert!(harness.records().is_empty());
}

#[test]
fn test_promotion_append_refusal_retries_until_open() {
    let mut harness = SequencerHarness::new(config());
    harness.activate();

    harness.connect_session(100);
    harness.tick();

    // Promotion happens but the log refuses the connected-session record.
    harness.log.set_refusing(true);
    harness.tick();
    assert_eq!(harness.sequencer().active_session_ids(), vec![SessionId(1)]);
    assert!(harness.records().is_empty());
    assert_eq!(harness.sequencer().message_index().get(), 0);

    // A message for the session is held until the record lands.
    harness.offer(message(1, 101, &[0x01]));
    harness.tick();
    assert_eq!(harness.ingress.len(), 1);

    // Ingress polls before the aging sweep, so the retried record lands
    // this tick and the held message follows on the next.
    harness.log.set_refusing(false);
    harness.tick();
    assert!(matches!(
        harness.records()[..],
        [LogRecord::ConnectedSession { .. }]
    ));
    harness.tick();
    let records = harness.records();
    assert!(matches!(records[1], LogRecord::ClientMessage { .. }));
    assert_eq!(harness.sequencer().message_index().get(), 2);
}

#[test]
fn test_refused_message_is_reoffered_exactly_once() {
    let mut harness = SequencerHarness::new(config());
    harness.activate();
    let session_id = open_session(&mut harness, 100);

    harness.log.set_refusing(true);
    harness.offer(message(session_id.0, 101, &[0x02]));
    harness.tick();

    // Held at the head of the queue, nothing appended.
    assert_eq!(harness.ingress.len(), 1);
    assert_eq!(harness.records().len(), 1);

    harness.log.set_refusing(false);
    harness.tick();
    assert_eq!(harness.ingress.len(), 0);

    let client_messages: Vec<_> = harness
        .records()
        .into_iter()
        .filter(|record| matches!(record, LogRecord::ClientMessage { .. }))
        .collect();
    assert_eq!(client_messages.len(), 1, "no duplication, no loss");
}

#[test]
fn test_message_for_unknown_session_is_consumed() {
    let mut harness = SequencerHarness::new(config());
    harness.activate();

    harness.offer(message(99, 1, &[0x03]));
    harness.tick();

    assert_eq!(harness.ingress.len(), 0);
    assert!(harness.records().is_empty());
}

#[traced_test]
#[test]
fn test_idle_session_times_out() {
    let mut harness = SequencerHarness::new(config());
    harness.activate();
    open_session(&mut harness, 100);

    // One past the timeout boundary.
    harness.advance_and_tick(1_001);

    let events = harness.egress.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].code, EventCode::Error);
    assert_eq!(events[0].detail, SESSION_TIMEOUT_MSG);

    let records = harness.records();
    assert!(matches!(
        records[1],
        LogRecord::ClosedSession {
            reason: CloseReason::Timeout,
            ..
        }
    ));
    assert_eq!(harness.sequencer().active_session_count(), 0);
    assert_eq!(harness.sequencer().message_index().get(), 2);
}

#[test]
fn test_keep_alive_defers_timeout() {
    let mut harness = SequencerHarness::new(config());
    harness.activate();
    let session_id = open_session(&mut harness, 100);

    harness.clock.advance(600);
    harness.offer(IngressMessage::KeepAlive {
        correlation_id: CorrelationId(101),
        session_id,
    });
    harness.tick();

    // 1,200ms after open but only 600ms after the keep-alive.
    harness.advance_and_tick(600);
    assert_eq!(harness.sequencer().active_session_count(), 1);

    harness.advance_and_tick(1_001);
    assert_eq!(harness.sequencer().active_session_count(), 0);
}

#[test]
fn test_timeout_close_refusal_parks_session_for_retry() {
    let mut harness = SequencerHarness::new(config());
    harness.activate();
    open_session(&mut harness, 100);

    harness.log.set_refusing(true);
    harness.advance_and_tick(1_001);

    // The timeout event went out once; the record is still owed.
    assert_eq!(harness.egress.events().len(), 1);
    assert_eq!(harness.sequencer().active_session_count(), 1);

    harness.log.set_refusing(false);
    harness.tick();
    assert_eq!(harness.sequencer().active_session_count(), 0);
    assert!(matches!(
        harness.records()[1],
        LogRecord::ClosedSession {
            reason: CloseReason::Timeout,
            ..
        }
    ));

    // The notification is not repeated on the retry tick.
    assert_eq!(harness.egress.events().len(), 1);
}

#[test]
fn test_close_append_refusal_retries_after_timeout() {
    let mut harness = SequencerHarness::new(config());
    harness.activate();
    let session_id = open_session(&mut harness, 100);

    harness.log.set_refusing(true);
    harness.offer(IngressMessage::SessionClose { session_id });
    harness.tick();
    assert_eq!(harness.sequencer().active_session_count(), 1);

    // The closed session is retried by the aging sweep once past timeout.
    harness.log.set_refusing(false);
    harness.advance_and_tick(1_001);
    assert_eq!(harness.sequencer().active_session_count(), 0);
    assert!(matches!(
        harness.records()[1],
        LogRecord::ClosedSession {
            reason: CloseReason::UserAction,
            ..
        }
    ));
}

#[test]
fn test_unauthenticated_session_times_out_silently() {
    let mut harness = SequencerHarness::new(config());
    harness.activate();

    // Response channel never connects, so authentication cannot progress.
    harness.egress.set_connected(false);
    harness.connect_session(100);
    harness.tick();
    assert_eq!(harness.sequencer().pending_session_count(), 1);

    harness.advance_and_tick(1_001);

    // Dropped with no event and no record.
    assert_eq!(harness.sequencer().pending_session_count(), 0);
    assert!(harness.egress.events().is_empty());
    assert!(harness.records().is_empty());
}

#[test]
fn test_undeliverable_rejection_ages_out() {
    let mut harness =
        SequencerHarness::with_authenticator(config(), ScriptedAuthenticator::reject_all());
    harness.activate();

    harness.egress.set_delivering(false);
    harness.connect_session(100);
    harness.tick();
    harness.tick();
    assert_eq!(harness.sequencer().rejected_session_count(), 1);

    // The slot cannot be wedged by a client that never reads.
    harness.advance_and_tick(1_001);
    assert_eq!(harness.sequencer().rejected_session_count(), 0);
    assert!(harness.egress.events().is_empty());
}

#[test]
fn test_containers_stay_exclusive_through_lifecycle() {
    let mut harness = SequencerHarness::new(config().with_max_concurrent_sessions(2));
    harness.activate();

    for correlation_id in 0..4 {
        harness.connect_session(correlation_id);
    }
    for _ in 0..6 {
        harness.tick();
        harness.assert_invariants();
    }
    harness.advance_and_tick(1_001);
    harness.assert_invariants();
}
