//! Contracts and shared primitives for the cadence sequencer.
//!
//! This crate defines the seams between the single-threaded sequencer agent
//! and its collaborators:
//!
//! - [`LogAppender`]: non-blocking append to the replicated log
//! - [`EgressPublisher`]: non-blocking event send to a session's channel
//! - [`Authenticator`] and [`SessionProxy`]: the two-phase auth handshake
//! - [`IngressAdapter`] / [`IngressHandler`]: inbound frame dispatch with
//!   controlled acknowledgement
//! - [`ConsensusModuleAdapter`] / [`ServiceAckHandler`]: service-side
//!   acknowledgements
//! - [`Agent`]: the cooperative duty-cycle trait
//!
//! plus the clocks and shared counters the agent runs on.
//!
//! # Architecture
//!
//! Every contract here is a poll that returns immediately. An operation that
//! cannot make progress reports refusal as a `bool` (or a controlled
//! acknowledgement) and is retried on a later tick; the tick cadence is the
//! back-off. Nothing blocks, and nothing here performs I/O itself.
//!
//! Adapters do not hold a reference to the agent that owns them. Instead
//! their `poll` takes the handler as a parameter, which keeps ownership
//! one-directional: the agent owns the adapters, and each poll borrows the
//! agent's state for the duration of the call.

mod agent;
mod auth;
mod clock;
mod consensus;
mod counters;
mod egress;
mod error;
mod ingress;
mod log;

pub use agent::Agent;
pub use auth::{Authenticator, SessionProxy};
pub use clock::{CachedClock, ClockPair, EpochClock, SystemEpochClock};
pub use consensus::{ConsensusModuleAdapter, ServiceAckHandler};
pub use counters::{ControlToggle, SharedCounter, ShutdownSignal};
pub use egress::EgressPublisher;
pub use error::ContractError;
pub use ingress::{ControlledPoll, IngressAdapter, IngressHandler};
pub use log::LogAppender;
