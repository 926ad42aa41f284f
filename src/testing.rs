//! Testing utilities for simvisor.
//!
//! This module provides small fakes for exercising dispatch and scheduling
//! without a live host.
//!
//! # Features
//!
//! - [`Trace`]: a shared recorder handlers append to, asserted on afterward
//! - [`TraceSubscriber`]: a subscriber that records every delivery
//! - [`FakeWorld`]: an in-memory [`World`] built from hand-placed entries
//! - [`TestTimeline`]: a manually driven [`Timeline`] for scheduler tests
//!
//! Everything here is single-threaded, matching the engine itself; shared
//! recorders use `Rc<RefCell<..>>`, not locks.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::dispatch::DispatchCtl;
use crate::error::HandlerError;
use crate::events::EventData;
use crate::host::{
    AirbaseEntry, CargoEntry, GroupEntry, SimTime, StaticEntry, Timeline, TimerHandle, UnitEntry,
    World,
};
use crate::sched::TaskId;
use crate::subscribers::Subscriber;

// ============================================================================
// Trace
// ============================================================================

/// A shared append-only record of strings.
///
/// Clones share the same buffer, so a test can keep one end and hand the
/// other to any number of handlers.
///
/// # Example
///
/// ```rust
/// use simvisor::testing::Trace;
///
/// let trace = Trace::new();
/// let writer = trace.clone();
/// writer.record("first");
/// assert_eq!(trace.entries(), vec!["first".to_string()]);
/// ```
#[derive(Clone, Default)]
pub struct Trace {
    entries: Rc<RefCell<Vec<String>>>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one entry.
    pub fn record(&self, entry: impl Into<String>) {
        self.entries.borrow_mut().push(entry.into());
    }

    /// Copies the entries recorded so far, in order.
    pub fn entries(&self) -> Vec<String> {
        self.entries.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

// ============================================================================
// TraceSubscriber
// ============================================================================

/// A subscriber that records `"label:KindName"` for every delivery.
///
/// The label tells multiple instances apart in one [`Trace`], which is how
/// ordering across priority buckets is asserted.
pub struct TraceSubscriber {
    label: String,
    trace: Trace,
}

impl TraceSubscriber {
    pub fn new(label: impl Into<String>, trace: &Trace) -> Self {
        Self {
            label: label.into(),
            trace: trace.clone(),
        }
    }
}

impl Subscriber for TraceSubscriber {
    fn on_event(&mut self, event: &EventData, _ctl: &mut DispatchCtl) -> Result<(), HandlerError> {
        self.trace.record(format!("{}:{}", self.label, event.kind_name));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "trace-subscriber"
    }
}

// ============================================================================
// FakeWorld
// ============================================================================

/// An in-memory [`World`] populated entry by entry.
///
/// Also records every reclaim-guard clear it is asked to perform, so tests
/// can assert on cargo cleanup side effects.
///
/// # Example
///
/// ```rust
/// use simvisor::testing::FakeWorld;
/// use simvisor::{Coalition, UnitEntry, World};
///
/// let mut world = FakeWorld::new();
/// world.add_unit("viper-1", UnitEntry::new("F-16C", Coalition::Blue));
/// assert!(world.unit_alive("viper-1"));
///
/// world.set_unit_alive("viper-1", false);
/// assert!(!world.unit_alive("viper-1"));
/// ```
#[derive(Default)]
pub struct FakeWorld {
    units: HashMap<String, UnitEntry>,
    groups: HashMap<String, GroupEntry>,
    statics: HashMap<String, StaticEntry>,
    cargos: HashMap<String, CargoEntry>,
    airbases: HashMap<String, AirbaseEntry>,
    cleared_guards: Vec<String>,
}

impl FakeWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_unit(&mut self, name: impl Into<String>, unit: UnitEntry) {
        self.units.insert(name.into(), unit);
    }

    pub fn add_group(&mut self, name: impl Into<String>, group: GroupEntry) {
        self.groups.insert(name.into(), group);
    }

    pub fn add_static(&mut self, name: impl Into<String>, entry: StaticEntry) {
        self.statics.insert(name.into(), entry);
    }

    pub fn add_cargo(&mut self, name: impl Into<String>, cargo: CargoEntry) {
        self.cargos.insert(name.into(), cargo);
    }

    pub fn add_airbase(&mut self, name: impl Into<String>, airbase: AirbaseEntry) {
        self.airbases.insert(name.into(), airbase);
    }

    /// Flips the alive flag of a known unit; unknown names are ignored.
    pub fn set_unit_alive(&mut self, name: &str, alive: bool) {
        if let Some(unit) = self.units.get_mut(name) {
            unit.alive = alive;
        }
    }

    /// Flips the alive flag of a known group; unknown names are ignored.
    pub fn set_group_alive(&mut self, name: &str, alive: bool) {
        if let Some(group) = self.groups.get_mut(name) {
            group.alive = alive;
        }
    }

    /// Cargo names whose reclaim guard was cleared, in clearing order.
    pub fn cleared_guards(&self) -> &[String] {
        &self.cleared_guards
    }
}

impl World for FakeWorld {
    fn resolve_unit(&self, name: &str) -> Option<UnitEntry> {
        self.units.get(name).cloned()
    }

    fn resolve_group(&self, name: &str) -> Option<GroupEntry> {
        self.groups.get(name).cloned()
    }

    fn resolve_static(&self, name: &str) -> Option<StaticEntry> {
        self.statics.get(name).cloned()
    }

    fn resolve_cargo(&self, name: &str) -> Option<CargoEntry> {
        self.cargos.get(name).cloned()
    }

    fn resolve_airbase(&self, name: &str) -> Option<AirbaseEntry> {
        self.airbases.get(name).cloned()
    }

    fn clear_reclaim_guard(&mut self, cargo: &str) {
        self.cleared_guards.push(cargo.to_string());
    }
}

// ============================================================================
// TestTimeline
// ============================================================================

struct Pending {
    at: SimTime,
    task: TaskId,
    handle: TimerHandle,
}

/// A manually driven [`Timeline`].
///
/// Registrations queue up; [`next_fire`](TestTimeline::next_fire) pops the
/// earliest one and advances the clock to it. Tests alternate between
/// popping here and calling [`Scheduler::fire`](crate::sched::Scheduler::fire)
/// with the returned id.
#[derive(Default)]
pub struct TestTimeline {
    now: SimTime,
    pending: Vec<Pending>,
    next_handle: u64,
}

impl TestTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the clock without firing anything.
    pub fn set_now(&mut self, now: SimTime) {
        self.now = now;
    }

    /// Number of registrations waiting.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Pops the earliest registration and advances the clock to it.
    pub fn next_fire(&mut self) -> Option<(SimTime, TaskId)> {
        if self.pending.is_empty() {
            return None;
        }
        let mut earliest = 0;
        for index in 1..self.pending.len() {
            let candidate = self.pending[index].at.as_secs();
            if candidate.total_cmp(&self.pending[earliest].at.as_secs()).is_lt() {
                earliest = index;
            }
        }
        let entry = self.pending.remove(earliest);
        self.now = entry.at;
        Some((entry.at, entry.task))
    }
}

impl Timeline for TestTimeline {
    fn now(&self) -> SimTime {
        self.now
    }

    fn schedule(&mut self, at: SimTime, task: TaskId) -> TimerHandle {
        self.next_handle += 1;
        let handle = TimerHandle(self.next_handle);
        self.pending.push(Pending { at, task, handle });
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.pending.retain(|entry| entry.handle != handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn task_ids(count: usize) -> Vec<TaskId> {
        let mut slots: crate::slots::Slots<()> = crate::slots::Slots::new();
        (0..count).map(|_| TaskId(slots.insert(()))).collect()
    }

    #[test]
    fn test_next_fire_pops_in_time_order_and_advances_the_clock() {
        let mut timeline = TestTimeline::new();
        let ids = task_ids(2);
        timeline.schedule(SimTime::from_secs(9.0), ids[0]);
        timeline.schedule(SimTime::from_secs(3.0), ids[1]);

        let (at, task) = timeline.next_fire().expect("two pending");
        assert_eq!(at, SimTime::from_secs(3.0));
        assert_eq!(task, ids[1]);
        assert_eq!(timeline.now(), SimTime::from_secs(3.0));

        let (at, _) = timeline.next_fire().expect("one pending");
        assert_eq!(at, SimTime::from_secs(9.0));
        assert!(timeline.next_fire().is_none());
    }

    #[test]
    fn test_cancel_removes_only_the_matching_registration() {
        let mut timeline = TestTimeline::new();
        let ids = task_ids(1);
        let keep = timeline.schedule(SimTime::from_secs(1.0), ids[0]);
        let dropped = timeline.schedule(SimTime::from_secs(2.0), ids[0]);

        timeline.cancel(dropped);
        assert_eq!(timeline.pending(), 1);

        timeline.cancel(keep);
        assert_eq!(timeline.pending(), 0);
    }
}
