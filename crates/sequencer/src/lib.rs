//! The sequencer: the single-threaded serialization point of a consensus
//! cluster's leader node.
//!
//! Ingress requests from external clients, local timer expiries, operator
//! control toggles, and service-ready acknowledgements all flow through one
//! agent, which imposes a total order on them by appending records to the
//! replicated log.
//!
//! The agent is:
//! - **Single-threaded**: one thread calls [`Sequencer::do_work`] in a loop;
//!   no two callbacks ever run concurrently
//! - **Non-blocking**: every collaborator is a poll that returns
//!   immediately; refusals are retried on a later tick
//! - **Deterministic**: log order is a function of input arrival order and
//!   tick boundaries

mod agent;
mod config;
mod timer;

pub use agent::{
    Sequencer, SequencerState, SESSION_LIMIT_MSG, SESSION_REJECTED_MSG, SESSION_TIMEOUT_MSG,
};
pub use config::SequencerConfig;
pub use timer::TimerService;
