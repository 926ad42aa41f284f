//! Host timer boundary.

use crate::host::SimTime;
use crate::sched::TaskId;

/// Token for one outstanding wakeup registration.
///
/// Minted by the host; the scheduler only stores it and hands it back on
/// cancellation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerHandle(pub u64);

/// Clock and one-shot timer service the host must provide.
///
/// The scheduler registers a wakeup per armed task; when the wakeup comes
/// due, the host calls [`Scheduler::fire`] with the stored [`TaskId`]. The
/// host may deliver a wakeup late or deliver one that was already cancelled;
/// the scheduler tolerates both.
///
/// [`Scheduler::fire`]: crate::Scheduler::fire
pub trait Timeline {
    /// Current simulation clock reading.
    fn now(&self) -> SimTime;

    /// Registers a wakeup for `task` at time `at`.
    fn schedule(&mut self, at: SimTime, task: TaskId) -> TimerHandle;

    /// Cancels a previously registered wakeup. Unknown handles are ignored.
    fn cancel(&mut self, handle: TimerHandle);
}
