//! # Jittered repeating-task scheduling.
//!
//! The scheduler owns task state and the repeat arithmetic; actual timers
//! live in the host behind the [`Timeline`] trait. One registration is
//! outstanding per task at any time:
//!
//! ```text
//! Scheduler::start ───► Timeline::schedule(first, id)
//!         ▲                        │
//!         │                        ▼  host clock reaches `at`
//!    re-arm if due      host calls Scheduler::fire(id)
//!         │                        │
//!         └──── next fire ◄─── callback(now) ─── Continue / Stop / error
//! ```
//!
//! ## Rules
//! - First fire: `now + start_delay + FIRE_EPSILON`, exempt from the
//!   horizon so a long start delay still runs once.
//! - Repeats: `now + interval +/- jitter * interval / 2 + FIRE_EPSILON`,
//!   uniform within the band; not armed if the result lands past
//!   `created_at + horizon + FIRE_EPSILON`.
//! - A zero interval is a one-shot.
//! - Callback errors and panics cancel the task; so does the death of the
//!   owning subscriber, checked before the callback runs.
//! - Firing a stale id is a logged no-op: the host may deliver a timer the
//!   scheduler already cancelled.
//!
//! ## Example
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use std::time::Duration;
//!
//! use simvisor::testing::TestTimeline;
//! use simvisor::{Continuation, Scheduler, SubscriberArena, TaskSpec};
//!
//! let mut scheduler = Scheduler::new();
//! let mut timeline = TestTimeline::new();
//! let subscribers = SubscriberArena::new();
//!
//! let fired = Rc::new(RefCell::new(0u32));
//! let seen = Rc::clone(&fired);
//! let id = scheduler.start(
//!     TaskSpec::repeating(Duration::from_secs(60)),
//!     move |_now| {
//!         *seen.borrow_mut() += 1;
//!         Ok(Continuation::Continue)
//!     },
//!     &mut timeline,
//! );
//!
//! // Drive the fake timeline: pop each due registration and fire it.
//! for _ in 0..3 {
//!     let (_at, task) = timeline.next_fire().unwrap();
//!     scheduler.fire(task, &mut timeline, &subscribers);
//! }
//! assert_eq!(*fired.borrow(), 3);
//! assert!(scheduler.is_active(id));
//! ```

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use rand::Rng;
use tracing::{debug, error, trace};

use crate::error::{HandlerError, panic_info};
use crate::host::{SimTime, Timeline, TimerHandle};
use crate::sched::task::{Continuation, TaskCallback, TaskId, TaskSpec};
use crate::slots::Slots;
use crate::subscribers::SubscriberArena;

/// Nudge added to every computed fire time.
///
/// Keeps a fire strictly after the instant it was computed from, so a task
/// re-armed at the current timestamp cannot fire twice within one host
/// tick.
pub const FIRE_EPSILON: Duration = Duration::from_millis(1);

/// What the fire path decided to do with the task.
enum FireOutcome {
    Cancel,
    Rearm(SimTime),
}

struct ScheduledTask {
    callback: TaskCallback,
    spec: TaskSpec,
    created_at: SimTime,
    handle: Option<TimerHandle>,
}

/// Runs callbacks on simulation time, one outstanding timer per task.
///
/// Ids are generational: [`Scheduler::stop`] invalidates the id even if
/// the slot is later reused, and a late [`Scheduler::fire`] for a stale id
/// is ignored.
#[derive(Default)]
pub struct Scheduler {
    tasks: Slots<ScheduledTask>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self { tasks: Slots::new() }
    }

    /// Arms a new task and returns its id.
    ///
    /// The first fire is registered immediately at
    /// `now + start_delay + FIRE_EPSILON`.
    pub fn start<F>(&mut self, spec: TaskSpec, callback: F, timeline: &mut dyn Timeline) -> TaskId
    where
        F: FnMut(SimTime) -> Result<Continuation, HandlerError> + 'static,
    {
        let created_at = timeline.now();
        let first = created_at + spec.start_delay + FIRE_EPSILON;

        let key = self.tasks.insert(ScheduledTask {
            callback: Box::new(callback),
            spec,
            created_at,
            handle: None,
        });
        let id = TaskId(key);

        let handle = timeline.schedule(first, id);
        if let Some(task) = self.tasks.get_mut(key) {
            task.handle = Some(handle);
        }
        trace!(task = ?id, first = %first, "task armed");
        id
    }

    /// Cancels a task and its pending registration. Idempotent.
    pub fn stop(&mut self, id: TaskId, timeline: &mut dyn Timeline) {
        if let Some(task) = self.tasks.remove(id.0) {
            if let Some(handle) = task.handle {
                timeline.cancel(handle);
            }
            debug!(task = ?id, "task stopped");
        }
    }

    /// Runs a task whose registration came due.
    ///
    /// Called by the host timer layer with the id it was given at
    /// [`schedule`](Timeline::schedule) time. Decides between re-arming and
    /// cancelling; either way the consumed registration is forgotten.
    pub fn fire(
        &mut self,
        id: TaskId,
        timeline: &mut dyn Timeline,
        subscribers: &SubscriberArena,
    ) {
        let now = timeline.now();

        let outcome = match self.tasks.get_mut(id.0) {
            None => {
                trace!(task = ?id, "ignoring fire of a stale task");
                return;
            }
            Some(task) => {
                task.handle = None;

                if task.spec.owner.is_some_and(|owner| !subscribers.contains(owner)) {
                    debug!(task = ?id, "owner gone, cancelling task");
                    FireOutcome::Cancel
                } else {
                    match catch_unwind(AssertUnwindSafe(|| (task.callback)(now))) {
                        Err(payload) => {
                            error!(
                                task = ?id,
                                panic = %panic_info(&*payload),
                                "task callback panicked, cancelling",
                            );
                            FireOutcome::Cancel
                        }
                        Ok(Err(err)) => {
                            error!(
                                task = ?id,
                                label = err.as_label(),
                                error = %err,
                                "task callback failed, cancelling",
                            );
                            FireOutcome::Cancel
                        }
                        Ok(Ok(Continuation::Stop)) => {
                            debug!(task = ?id, "task asked to stop");
                            FireOutcome::Cancel
                        }
                        Ok(Ok(Continuation::Continue)) => {
                            if task.spec.interval.is_zero() {
                                trace!(task = ?id, "one-shot complete");
                                FireOutcome::Cancel
                            } else {
                                match next_fire(now, task.created_at, &task.spec) {
                                    Some(at) => FireOutcome::Rearm(at),
                                    None => {
                                        debug!(task = ?id, "horizon reached, task done");
                                        FireOutcome::Cancel
                                    }
                                }
                            }
                        }
                    }
                }
            }
        };

        match outcome {
            FireOutcome::Cancel => {
                self.tasks.remove(id.0);
            }
            FireOutcome::Rearm(at) => {
                let handle = timeline.schedule(at, id);
                if let Some(task) = self.tasks.get_mut(id.0) {
                    task.handle = Some(handle);
                }
            }
        }
    }

    /// Whether the task is still armed.
    pub fn is_active(&self, id: TaskId) -> bool {
        self.tasks.contains(id.0)
    }

    /// Number of tasks currently armed.
    pub fn active_count(&self) -> usize {
        self.tasks.len()
    }
}

/// Computes the next repeat time, `None` once the horizon is passed.
fn next_fire(now: SimTime, created_at: SimTime, spec: &TaskSpec) -> Option<SimTime> {
    let interval = spec.interval.as_secs_f64();
    let span = spec.jitter * interval / 2.0;
    let offset = if span > 0.0 {
        rand::rng().random_range(-span..=span)
    } else {
        0.0
    };
    let next = now.offset(interval + offset) + FIRE_EPSILON;

    if let Some(horizon) = spec.horizon {
        let stop = created_at + horizon + FIRE_EPSILON;
        if next > stop {
            return None;
        }
    }
    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscribers::Subscriber;
    use crate::testing::TestTimeline;
    use std::cell::RefCell;
    use std::rc::Rc;

    const EPS: f64 = 1e-9;

    struct Sink;
    impl Subscriber for Sink {}

    /// Pops due registrations until the timeline drains; returns the number
    /// of fires delivered.
    fn drive(
        scheduler: &mut Scheduler,
        timeline: &mut TestTimeline,
        subscribers: &SubscriberArena,
    ) -> usize {
        let mut fires = 0;
        while let Some((_, task)) = timeline.next_fire() {
            scheduler.fire(task, timeline, subscribers);
            fires += 1;
            assert!(fires < 10_000, "schedule never drains");
        }
        fires
    }

    #[test]
    fn test_first_fire_is_start_delay_plus_epsilon() {
        let mut scheduler = Scheduler::new();
        let mut timeline = TestTimeline::new();
        timeline.set_now(SimTime::from_secs(100.0));

        scheduler.start(
            TaskSpec::once().with_start_delay(Duration::from_secs(5)),
            |_| Ok(Continuation::Continue),
            &mut timeline,
        );

        let (at, _) = timeline.next_fire().expect("one registration pending");
        assert!(
            (at.as_secs() - 105.001).abs() < EPS,
            "first fire must land at now + delay + epsilon, got {at}"
        );
    }

    #[test]
    fn test_one_shot_fires_exactly_once() {
        let mut scheduler = Scheduler::new();
        let mut timeline = TestTimeline::new();
        let subscribers = SubscriberArena::new();

        let fired = Rc::new(RefCell::new(0u32));
        let seen = Rc::clone(&fired);
        let id = scheduler.start(
            TaskSpec::once(),
            move |_| {
                *seen.borrow_mut() += 1;
                Ok(Continuation::Continue)
            },
            &mut timeline,
        );

        let fires = drive(&mut scheduler, &mut timeline, &subscribers);

        assert_eq!(fires, 1);
        assert_eq!(*fired.borrow(), 1);
        assert!(!scheduler.is_active(id), "a one-shot must retire itself");
        assert_eq!(scheduler.active_count(), 0);
    }

    #[test]
    fn test_repeats_without_jitter_are_evenly_spaced() {
        let mut scheduler = Scheduler::new();
        let mut timeline = TestTimeline::new();
        let subscribers = SubscriberArena::new();

        let times: Rc<RefCell<Vec<f64>>> = Rc::default();
        let seen = Rc::clone(&times);
        let mut left = 4u32;
        let id = scheduler.start(
            TaskSpec::repeating(Duration::from_secs(5)),
            move |now| {
                seen.borrow_mut().push(now.as_secs());
                left -= 1;
                Ok(if left == 0 {
                    Continuation::Stop
                } else {
                    Continuation::Continue
                })
            },
            &mut timeline,
        );

        drive(&mut scheduler, &mut timeline, &subscribers);

        let times = times.borrow();
        assert_eq!(times.len(), 4);
        for pair in times.windows(2) {
            let delta = pair[1] - pair[0];
            assert!(
                (delta - 5.001).abs() < 1e-6,
                "zero jitter must repeat exactly, got delta {delta}"
            );
        }
        assert!(!scheduler.is_active(id));
    }

    #[test]
    fn test_jitter_keeps_repeats_inside_the_band() {
        // interval 10s, jitter 0.4: every repeat lands in [8, 12] + epsilon.
        let spec = TaskSpec::repeating(Duration::from_secs(10)).with_jitter(0.4);
        let now = SimTime::from_secs(50.0);

        for _ in 0..1000 {
            let next = next_fire(now, SimTime::ZERO, &spec).expect("no horizon set");
            let delta = next.as_secs() - now.as_secs();
            assert!(
                (8.001 - EPS..=12.001 + EPS).contains(&delta),
                "repeat delta {delta} left the jitter band"
            );
        }
    }

    #[test]
    fn test_horizon_blocks_repeats_past_stop_time() {
        let mut scheduler = Scheduler::new();
        let mut timeline = TestTimeline::new();
        let subscribers = SubscriberArena::new();

        let times = Rc::new(RefCell::new(Vec::new()));
        let seen = Rc::clone(&times);
        let id = scheduler.start(
            TaskSpec::repeating(Duration::from_secs(1)).with_horizon(Duration::from_secs(5)),
            move |now| {
                seen.borrow_mut().push(now.as_secs());
                Ok(Continuation::Continue)
            },
            &mut timeline,
        );

        // Fires at 0.001, 1.002, ... 4.005; the next repeat would land
        // past 5.001 and must not be armed.
        drive(&mut scheduler, &mut timeline, &subscribers);

        let times = times.borrow();
        assert_eq!(times.len(), 5);
        let stop = 5.0 + FIRE_EPSILON.as_secs_f64();
        assert!(
            times.iter().all(|&at| at <= stop),
            "no fire may land past the horizon: {times:?}"
        );
        assert!(!scheduler.is_active(id));
        assert_eq!(timeline.pending(), 0);
    }

    #[test]
    fn test_first_fire_may_land_past_the_horizon() {
        let mut scheduler = Scheduler::new();
        let mut timeline = TestTimeline::new();
        let subscribers = SubscriberArena::new();

        let fired = Rc::new(RefCell::new(0u32));
        let seen = Rc::clone(&fired);
        scheduler.start(
            TaskSpec::repeating(Duration::from_secs(1))
                .with_start_delay(Duration::from_secs(10))
                .with_horizon(Duration::from_secs(5)),
            move |_| {
                *seen.borrow_mut() += 1;
                Ok(Continuation::Continue)
            },
            &mut timeline,
        );

        drive(&mut scheduler, &mut timeline, &subscribers);

        assert_eq!(
            *fired.borrow(),
            1,
            "a delayed first fire runs even past the horizon, repeats do not"
        );
    }

    #[test]
    fn test_callback_error_cancels_the_task() {
        let mut scheduler = Scheduler::new();
        let mut timeline = TestTimeline::new();
        let subscribers = SubscriberArena::new();

        let id = scheduler.start(
            TaskSpec::repeating(Duration::from_secs(5)),
            |_| Err(HandlerError::failed("smoke marker pool exhausted")),
            &mut timeline,
        );

        let fires = drive(&mut scheduler, &mut timeline, &subscribers);

        assert_eq!(fires, 1);
        assert!(!scheduler.is_active(id), "a failing task must not repeat");
        assert_eq!(timeline.pending(), 0);
    }

    #[test]
    fn test_callback_panic_cancels_the_task() {
        let mut scheduler = Scheduler::new();
        let mut timeline = TestTimeline::new();
        let subscribers = SubscriberArena::new();

        let id = scheduler.start(
            TaskSpec::repeating(Duration::from_secs(5)),
            |_| panic!("boom"),
            &mut timeline,
        );

        let fires = drive(&mut scheduler, &mut timeline, &subscribers);

        assert_eq!(fires, 1);
        assert!(!scheduler.is_active(id), "a panicking task must not repeat");
        assert_eq!(timeline.pending(), 0);
    }

    #[test]
    fn test_stop_cancels_the_pending_registration() {
        let mut scheduler = Scheduler::new();
        let mut timeline = TestTimeline::new();

        let id = scheduler.start(
            TaskSpec::repeating(Duration::from_secs(5)),
            |_| Ok(Continuation::Continue),
            &mut timeline,
        );
        assert_eq!(timeline.pending(), 1);

        scheduler.stop(id, &mut timeline);
        assert_eq!(timeline.pending(), 0, "stop must cancel the host timer");
        assert!(!scheduler.is_active(id));

        // Stopping again is a no-op.
        scheduler.stop(id, &mut timeline);
    }

    #[test]
    fn test_continuation_stop_halts_repeats() {
        let mut scheduler = Scheduler::new();
        let mut timeline = TestTimeline::new();
        let subscribers = SubscriberArena::new();

        let id = scheduler.start(
            TaskSpec::repeating(Duration::from_secs(5)),
            |_| Ok(Continuation::Stop),
            &mut timeline,
        );

        let fires = drive(&mut scheduler, &mut timeline, &subscribers);

        assert_eq!(fires, 1);
        assert!(!scheduler.is_active(id));
    }

    #[test]
    fn test_owner_death_cancels_before_the_callback_runs() {
        let mut scheduler = Scheduler::new();
        let mut timeline = TestTimeline::new();
        let mut subscribers = SubscriberArena::new();
        let owner = subscribers.insert(Box::new(Sink));

        let fired = Rc::new(RefCell::new(0u32));
        let seen = Rc::clone(&fired);
        let id = scheduler.start(
            TaskSpec::repeating(Duration::from_secs(5)).with_owner(owner),
            move |_| {
                *seen.borrow_mut() += 1;
                Ok(Continuation::Continue)
            },
            &mut timeline,
        );

        subscribers.remove(owner);
        drive(&mut scheduler, &mut timeline, &subscribers);

        assert_eq!(*fired.borrow(), 0, "an orphaned task must never run");
        assert!(!scheduler.is_active(id));
    }

    #[test]
    fn test_firing_a_stale_id_is_ignored() {
        let mut scheduler = Scheduler::new();
        let mut timeline = TestTimeline::new();
        let subscribers = SubscriberArena::new();

        let id = scheduler.start(TaskSpec::once(), |_| Ok(Continuation::Continue), &mut timeline);
        scheduler.stop(id, &mut timeline);

        // A timer the host already had in flight may still deliver.
        scheduler.fire(id, &mut timeline, &subscribers);
        assert_eq!(scheduler.active_count(), 0);
    }
}
