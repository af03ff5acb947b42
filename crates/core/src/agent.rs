//! The cooperative duty-cycle contract.

use crate::ContractError;

/// A cooperatively scheduled unit of work.
///
/// A host scheduler calls [`Agent::do_work`] in a loop and may back off when
/// the returned work count is zero. One call is a *tick*: a bounded,
/// non-blocking sweep of the agent's inputs. No call on an agent may block.
pub trait Agent {
    /// Perform one tick. Returns the number of units of work done.
    ///
    /// An error is a contract violation; the host should retire the agent.
    fn do_work(&mut self) -> Result<usize, ContractError>;

    /// Name used by the host scheduler for diagnostics.
    fn role_name(&self) -> &'static str;

    /// Release resources. Called once when the host retires the agent.
    fn on_close(&mut self) {}
}
