//! Fatal error kinds.
//!
//! Transient refusals (log append declined, egress send declined) are plain
//! `bool` outcomes retried on a later tick and never appear here. The
//! variants below are contract violations: the host should surface them and
//! retire the agent.

use cadence_types::{ServiceAction, ToggleCode};
use thiserror::Error;

/// A violation of the sequencer's external contracts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    /// A service acknowledgement arrived in a state that cannot accept it.
    #[error("unexpected {action:?} ack in {state} state")]
    UnexpectedServiceAck {
        action: ServiceAction,
        state: &'static str,
    },

    /// More readiness acknowledgements than configured services.
    #[error("services ready count {count} exceeds configured service count {limit}")]
    ServicesReadyOverflow { count: u32, limit: u32 },

    /// The control toggle held a value outside the known codes.
    #[error("unknown control toggle code {code}")]
    UnknownToggleCode { code: u64 },

    /// A known toggle that is not legal in the current state.
    #[error("toggle {toggle:?} is invalid in {state} state")]
    InvalidToggle {
        toggle: ToggleCode,
        state: &'static str,
    },
}
