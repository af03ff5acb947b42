//! Queue-backed consensus-module adapter.

use cadence_core::{ConsensusModuleAdapter, ContractError, ServiceAckHandler};
use cadence_types::{ServiceAction, ServiceId};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Consensus-module adapter backed by a shared acknowledgement queue.
///
/// Clones share the queue: hand one to the sequencer, enqueue acks through
/// the other.
#[derive(Debug, Clone, Default)]
pub struct QueueConsensus {
    queue: Arc<Mutex<VecDeque<(ServiceId, ServiceAction)>>>,
}

impl QueueConsensus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a service acknowledgement for the next poll.
    pub fn ack(&self, service_id: ServiceId, action: ServiceAction) {
        self.queue.lock().unwrap().push_back((service_id, action));
    }
}

impl ConsensusModuleAdapter for QueueConsensus {
    fn poll(&mut self, handler: &mut dyn ServiceAckHandler) -> Result<usize, ContractError> {
        let mut work_count = 0;

        loop {
            let Some((service_id, action)) = self.queue.lock().unwrap().pop_front() else {
                return Ok(work_count);
            };
            handler.on_service_ack(service_id, action)?;
            work_count += 1;
        }
    }
}
