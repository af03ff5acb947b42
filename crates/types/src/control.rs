//! Control-plane codes: operator toggles and service actions.

use serde::{Deserialize, Serialize};

/// Operator command codes carried by the shared control-toggle counter.
///
/// Unknown counter values are a fatal contract violation, so decoding goes
/// through [`ToggleCode::from_code`] rather than a lossy cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u64)]
pub enum ToggleCode {
    /// No command outstanding.
    Neutral = 0,
    /// Pause processing of sessions, timers, and ingress.
    Suspend = 1,
    /// Resume from a suspend.
    Resume = 2,
    /// Request a snapshot of downstream service state.
    Snapshot = 3,
    /// Request an orderly shutdown.
    Shutdown = 4,
    /// Request an immediate abort. Terminal: never reset by the sequencer.
    Abort = 5,
}

impl ToggleCode {
    /// The raw counter value for this code.
    pub fn code(self) -> u64 {
        self as u64
    }

    /// Decode a raw counter value. `None` for unknown values.
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(Self::Neutral),
            1 => Some(Self::Suspend),
            2 => Some(Self::Resume),
            3 => Some(Self::Snapshot),
            4 => Some(Self::Shutdown),
            5 => Some(Self::Abort),
            _ => None,
        }
    }
}

/// Actions requested of, and acknowledged by, downstream services.
///
/// `Ready` only ever flows service → sequencer; the other three are appended
/// to the log as action requests and come back as acknowledgements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceAction {
    /// The service has finished loading and is ready for the log.
    Ready,
    /// Snapshot service state.
    Snapshot,
    /// Shut down in an orderly fashion.
    Shutdown,
    /// Abort immediately.
    Abort,
}
