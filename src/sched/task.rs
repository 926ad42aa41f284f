//! # Repeating-task specification.
//!
//! Defines [`TaskSpec`], the configuration bundle handed to
//! [`Scheduler::start`](crate::sched::Scheduler::start): start delay,
//! repeat interval, jitter fraction, stop horizon, and the optional owning
//! subscriber whose death cancels the task.
//!
//! A spec can be created:
//! - **One-shot** with [`TaskSpec::once`] (fires a single time)
//! - **Repeating** with [`TaskSpec::repeating`] (fires until stopped)

use std::time::Duration;

use crate::error::HandlerError;
use crate::host::SimTime;
use crate::slots::Key;
use crate::subscribers::SubscriberId;

/// Handle to a scheduled task.
///
/// Generational: once the task is cancelled or completes, its id goes
/// stale and is never revived, even if the slot is reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskId(pub(crate) Key);

/// What a task callback wants to happen next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Continuation {
    /// Keep repeating on the spec's interval.
    Continue,
    /// Stop cleanly; the task is cancelled.
    Stop,
}

/// Callback invoked on every fire, with the current simulation time.
///
/// Returning an error cancels the task, same as
/// [`Continuation::Stop`] but logged as a failure.
pub type TaskCallback = Box<dyn FnMut(SimTime) -> Result<Continuation, HandlerError>>;

/// Specification for a scheduled task.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use simvisor::TaskSpec;
///
/// // Every 60s of simulation time, +/-20% spread, for at most an hour:
/// let spec = TaskSpec::repeating(Duration::from_secs(60))
///     .with_start_delay(Duration::from_secs(5))
///     .with_jitter(0.4)
///     .with_horizon(Duration::from_secs(3600));
/// assert_eq!(spec.jitter(), 0.4);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct TaskSpec {
    pub(crate) start_delay: Duration,
    pub(crate) interval: Duration,
    pub(crate) jitter: f64,
    pub(crate) horizon: Option<Duration>,
    pub(crate) owner: Option<SubscriberId>,
}

impl TaskSpec {
    /// Creates a one-shot spec: the task fires once and is done.
    pub fn once() -> Self {
        Self {
            start_delay: Duration::ZERO,
            interval: Duration::ZERO,
            jitter: 0.0,
            horizon: None,
            owner: None,
        }
    }

    /// Creates a repeating spec firing every `interval` of simulation time.
    ///
    /// A zero `interval` degrades to a one-shot.
    pub fn repeating(interval: Duration) -> Self {
        Self {
            interval,
            ..Self::once()
        }
    }

    /// Sets: delay before the first fire (default: none).
    #[inline]
    pub fn with_start_delay(mut self, delay: Duration) -> Self {
        self.start_delay = delay;
        self
    }

    /// Sets: jitter fraction of the interval, clamped to `0.0..=1.0`.
    ///
    /// Each repeat lands uniformly within
    /// `interval +/- jitter * interval / 2`. Zero keeps repeats exact.
    #[inline]
    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter.clamp(0.0, 1.0);
        self
    }

    /// Sets: stop horizon, measured from the task's creation time.
    ///
    /// A repeat that would land past the horizon is not armed and the task
    /// ends. The first fire is exempt so a long start delay still runs.
    #[inline]
    pub fn with_horizon(mut self, horizon: Duration) -> Self {
        self.horizon = Some(horizon);
        self
    }

    /// Sets: owning subscriber; the task is cancelled once the owner is no
    /// longer in the arena.
    #[inline]
    pub fn with_owner(mut self, owner: SubscriberId) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Returns the delay before the first fire.
    pub fn start_delay(&self) -> Duration {
        self.start_delay
    }

    /// Returns the repeat interval (`0` means one-shot).
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns the jitter fraction.
    pub fn jitter(&self) -> f64 {
        self.jitter
    }

    /// Returns the stop horizon, if any.
    pub fn horizon(&self) -> Option<Duration> {
        self.horizon
    }

    /// Returns the owning subscriber, if any.
    pub fn owner(&self) -> Option<SubscriberId> {
        self.owner
    }
}
