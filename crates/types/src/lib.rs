//! Core types for the cadence cluster sequencer.
//!
//! This crate provides the foundational types used throughout the sequencer
//! implementation:
//!
//! - **Identifiers**: [`SessionId`], [`CorrelationId`], [`ServiceId`]
//! - **Session lifecycle**: [`Session`], [`SessionState`], [`CloseReason`]
//! - **Wire taxonomy**: [`IngressMessage`], [`LogRecord`], [`EventCode`]
//! - **Control plane**: [`ToggleCode`], [`ServiceAction`]
//!
//! # Design Philosophy
//!
//! This crate is self-contained with minimal dependencies. It does not depend
//! on any other workspace crates, making it the foundation layer.

mod control;
mod ids;
mod message;
mod record;
mod session;

pub use control::{ServiceAction, ToggleCode};
pub use ids::{CorrelationId, ServiceId, SessionId};
pub use message::IngressMessage;
pub use record::LogRecord;
pub use session::{CloseReason, EventCode, Session, SessionState};
