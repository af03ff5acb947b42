//! Queue-backed ingress adapter.

use cadence_core::{ControlledPoll, IngressAdapter, IngressHandler};
use cadence_types::IngressMessage;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tracing::trace;

/// Ingress adapter backed by a shared frame queue.
///
/// Frames are dispatched in arrival order. When the message callback
/// returns [`ControlledPoll::Abort`] the frame goes back to the head of the
/// queue unchanged, so the identical frame is re-offered on the next poll.
///
/// Clones share the queue: hand one to the sequencer, offer frames through
/// the other.
#[derive(Debug, Clone, Default)]
pub struct QueueIngress {
    queue: Arc<Mutex<VecDeque<IngressMessage>>>,
}

impl QueueIngress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a frame for the next poll.
    pub fn offer(&self, message: IngressMessage) {
        self.queue.lock().unwrap().push_back(message);
    }

    /// Number of frames waiting.
    pub fn len(&self) -> usize {
        self.queue.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().unwrap().is_empty()
    }
}

impl IngressAdapter for QueueIngress {
    fn poll(&mut self, handler: &mut dyn IngressHandler) -> usize {
        let mut work_count = 0;

        loop {
            let Some(message) = self.queue.lock().unwrap().pop_front() else {
                return work_count;
            };
            trace!(frame = message.type_name(), "dispatching ingress frame");

            match message {
                IngressMessage::SessionConnect {
                    correlation_id,
                    response_stream_id,
                    response_channel,
                    credentials,
                } => {
                    handler.on_session_connect(
                        correlation_id,
                        response_stream_id,
                        &response_channel,
                        &credentials,
                    );
                }
                IngressMessage::SessionClose { session_id } => {
                    handler.on_session_close(session_id);
                }
                IngressMessage::SessionMessage {
                    session_id,
                    correlation_id,
                    payload,
                } => {
                    match handler.on_session_message(session_id, correlation_id, &payload) {
                        ControlledPoll::Continue => {}
                        ControlledPoll::Abort => {
                            // Re-offer the identical frame next poll.
                            self.queue.lock().unwrap().push_front(
                                IngressMessage::SessionMessage {
                                    session_id,
                                    correlation_id,
                                    payload,
                                },
                            );
                            return work_count;
                        }
                    }
                }
                IngressMessage::KeepAlive {
                    correlation_id,
                    session_id,
                } => {
                    handler.on_keep_alive(correlation_id, session_id);
                }
                IngressMessage::ChallengeResponse {
                    correlation_id,
                    session_id,
                    credentials,
                } => {
                    handler.on_challenge_response(correlation_id, session_id, &credentials);
                }
                IngressMessage::ScheduleTimer {
                    correlation_id,
                    deadline_ms,
                } => {
                    handler.on_schedule_timer(correlation_id, deadline_ms);
                }
                IngressMessage::CancelTimer { correlation_id } => {
                    handler.on_cancel_timer(correlation_id);
                }
            }

            work_count += 1;
        }
    }
}
