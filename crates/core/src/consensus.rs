//! Consensus-module service acknowledgement contract.

use crate::ContractError;
use cadence_types::{ServiceAction, ServiceId};

/// Callback for service-side acknowledgements.
pub trait ServiceAckHandler {
    /// A downstream service acknowledged an action (or signalled readiness).
    ///
    /// Errors are contract violations and terminate the agent.
    fn on_service_ack(
        &mut self,
        service_id: ServiceId,
        action: ServiceAction,
    ) -> Result<(), ContractError>;
}

/// Delivers buffered service acknowledgements to the sequencer.
pub trait ConsensusModuleAdapter {
    /// Dispatch buffered acknowledgements in arrival order. Returns the
    /// number delivered.
    fn poll(&mut self, handler: &mut dyn ServiceAckHandler) -> Result<usize, ContractError>;

    /// Release transport resources.
    fn close(&mut self) {}
}
