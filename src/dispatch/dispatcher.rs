//! # Priority-ordered event dispatch.
//!
//! The dispatcher owns the kind table, the subscription table, and the
//! follow-up queue. One call to [`Dispatcher::dispatch`] delivers one host
//! event and then drains whatever the handlers emitted:
//!
//! ```text
//! RawEvent ──► drop rules ──► enrich(World) ──► sweep
//!                  │                              │
//!                  │                 ┌────────────┴────────────┐
//!              (unknown kind,        │ bucket 1 → … → bucket 5 │ creation
//!               no initiator,        │ bucket 5 → … → bucket 1 │ destruction
//!               mission ended)       └────────────┬────────────┘
//!                                                 ▼
//!                                    per subscriber: gate ► invoke ► apply
//! ```
//!
//! ## Rules
//! - Sweep direction comes from the kind: creation-like kinds ascend so
//!   registries see new entities first; destruction-like kinds descend so
//!   scripts let go before registries erase.
//! - Each bucket is walked over a snapshot of its ids; the live descriptor
//!   is re-fetched per subscriber, so a detach issued earlier in the sweep
//!   is honored later in the same sweep.
//! - Filtered subscriptions are purged when their entity is no longer
//!   alive, except on terminal kinds, which still must reach handlers that
//!   watch exactly that dying entity.
//! - A subscriber id no longer backed by the arena is purged on contact.
//! - Handler failures and panics are logged and contained; the sweep
//!   continues with the next subscriber.
//! - Events emitted by handlers queue FIFO and dispatch after the current
//!   event completes. Dispatch never re-enters.
//! - The first mission-end event latches the dispatcher: it is delivered,
//!   and every event after it is dropped.

use std::collections::VecDeque;
use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::{debug, error, trace, warn};

use crate::dispatch::ctl::DispatchCtl;
use crate::dispatch::enrich::enrich;
use crate::dispatch::table::{HandlerFn, Priority, Subscription, SubscriptionTable};
use crate::error::{InvokeError, PublishError, RegisterError, panic_info};
use crate::events::{
    EventData, KindId, KindTable, ParticipantRule, RawEvent, SweepDirection,
};
use crate::host::{SimTime, World};
use crate::subscribers::{Subscriber, SubscriberArena, SubscriberId};

/// Per-subscriber gate decision, taken on the live descriptor before the
/// handler borrow starts.
enum Gate {
    Run,
    Skip,
    Purge,
}

/// Routes enriched events to subscribers, five priority buckets per kind.
///
/// The dispatcher stores plain [`SubscriberId`]s and never owns subscriber
/// state; the arena is passed into each dispatch call. Single-threaded by
/// construction, it relies on the deferred [`DispatchCtl`] commands instead
/// of locks for mid-sweep mutation.
pub struct Dispatcher {
    kinds: KindTable,
    table: SubscriptionTable,
    pending: VecDeque<RawEvent>,
    ended: bool,
}

impl Dispatcher {
    /// Creates a dispatcher over the given kind table.
    pub fn new(kinds: KindTable) -> Self {
        Self {
            kinds,
            table: SubscriptionTable::default(),
            pending: VecDeque::new(),
            ended: false,
        }
    }

    /// Creates a dispatcher over the standard kind table.
    pub fn standard() -> Self {
        Self::new(KindTable::standard())
    }

    /// The kind table in use.
    pub fn kinds(&self) -> &KindTable {
        &self.kinds
    }

    /// Registers a custom event kind (see [`KindTable::register`]).
    pub fn register_kind(
        &mut self,
        name: impl Into<std::borrow::Cow<'static, str>>,
        sweep: SweepDirection,
        participants: ParticipantRule,
        desired: Option<KindId>,
    ) -> Result<KindId, RegisterError> {
        self.kinds.register(name, sweep, participants, desired)
    }

    /// Subscribes `id` to `kind` at `priority`.
    ///
    /// Idempotent per (kind, priority, subscriber); re-subscribing replaces
    /// the stored descriptor. The kind is not validated here: events of a
    /// kind missing from the table are dropped at dispatch.
    pub fn subscribe(
        &mut self,
        kind: KindId,
        priority: Priority,
        id: SubscriberId,
        subscription: Subscription,
    ) {
        trace!(kind = %kind, level = priority.level(), "subscribe");
        self.table.insert(kind, priority, id, subscription);
    }

    /// Drops the (kind, subscriber) association from every bucket.
    pub fn unsubscribe(&mut self, kind: KindId, id: SubscriberId) {
        trace!(kind = %kind, "unsubscribe");
        self.table.remove(kind, id);
    }

    /// Drops the subscriber from every kind and bucket.
    pub fn unsubscribe_all(&mut self, id: SubscriberId) {
        self.table.remove_everywhere(id);
    }

    /// Whether `id` holds a subscription for `kind` in any bucket.
    pub fn is_subscribed(&self, kind: KindId, id: SubscriberId) -> bool {
        self.table.contains(kind, id)
    }

    /// Total number of stored subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.table.len()
    }

    /// Whether the mission-end latch has tripped.
    pub fn mission_ended(&self) -> bool {
        self.ended
    }

    /// Dispatches one host event, then drains handler-emitted follow-ups.
    ///
    /// Malformed events are dropped with a log line, never an error: the
    /// host feed is not a caller that can be made to handle a `Result`.
    pub fn dispatch(
        &mut self,
        raw: RawEvent,
        subscribers: &mut SubscriberArena,
        world: &mut dyn World,
    ) {
        self.dispatch_event(raw, subscribers, world);
        while let Some(next) = self.pending.pop_front() {
            self.dispatch_event(next, subscribers, world);
        }
    }

    /// Validates and dispatches a script-originated event.
    ///
    /// Unlike the host feed, scripted publication fails fast: an unknown
    /// kind or a missing required participant is reported to the caller
    /// before the record is built. Whatever time the draft carries is
    /// replaced with `now`; pass the current timeline reading.
    pub fn publish(
        &mut self,
        draft: RawEvent,
        now: SimTime,
        subscribers: &mut SubscriberArena,
        world: &mut dyn World,
    ) -> Result<(), PublishError> {
        let def = self
            .kinds
            .get(draft.kind)
            .ok_or(PublishError::UnknownKind { id: draft.kind })?;
        let needs_initiator = def.participants != ParticipantRule::None && !def.initiator_optional;
        if needs_initiator && draft.initiator.is_none() {
            return Err(PublishError::MissingInitiator {
                kind: def.name.to_string(),
            });
        }
        if def.participants == ParticipantRule::InitiatorAndTarget && draft.target.is_none() {
            return Err(PublishError::MissingTarget {
                kind: def.name.to_string(),
            });
        }
        self.dispatch(RawEvent { time: now, ..draft }, subscribers, world);
        Ok(())
    }

    fn dispatch_event(
        &mut self,
        raw: RawEvent,
        subscribers: &mut SubscriberArena,
        world: &mut dyn World,
    ) {
        let Some(def) = self.kinds.get(raw.kind).cloned() else {
            warn!(kind = %raw.kind, "dropping event of unknown kind");
            return;
        };
        if self.ended {
            debug!(kind = %def.name, "mission ended, dropping event");
            return;
        }
        if raw.initiator.is_none()
            && def.participants != ParticipantRule::None
            && !def.initiator_optional
        {
            trace!(kind = %def.name, "dropping event without required initiator");
            return;
        }
        if def.id == KindId::MISSION_END {
            debug!("mission end, latching");
            self.ended = true;
        }

        let event = enrich(&def, &raw, &*world);
        let terminal = def.terminal;
        let declared_target = def.participants == ParticipantRule::InitiatorAndTarget;

        let mut order = Priority::ASCENDING;
        if def.sweep == SweepDirection::Descending {
            order.reverse();
        }

        for priority in order {
            for id in self.table.snapshot_ids(def.id, priority) {
                if !subscribers.contains(id) {
                    trace!(kind = %def.name, "purging subscription of a dropped subscriber");
                    self.table.remove_at(def.id, priority, id);
                    continue;
                }

                // Gate on the live descriptor: a detach issued earlier in
                // this sweep leaves no descriptor behind.
                let gate = match self.table.descriptor(def.id, priority, id) {
                    None => continue,
                    Some(sub) => match &sub.filter {
                        None => Gate::Run,
                        Some(filter) if !filter.matches(&event, declared_target) => Gate::Skip,
                        Some(filter) if !terminal && !filter.alive(&*world) => Gate::Purge,
                        Some(_) => Gate::Run,
                    },
                };
                match gate {
                    Gate::Skip => continue,
                    Gate::Purge => {
                        debug!(kind = %def.name, "purging subscription of a dead entity");
                        self.table.remove_at(def.id, priority, id);
                        continue;
                    }
                    Gate::Run => {}
                }

                let mut ctl = DispatchCtl::new(id);
                let outcome = match (
                    self.table.descriptor_mut(def.id, priority, id),
                    subscribers.get_mut(id),
                ) {
                    (Some(sub), Some(target)) => {
                        invoke_guarded(sub.handler.as_mut(), target, &event, &mut ctl)
                    }
                    _ => continue,
                };
                if let Err(err) = outcome {
                    let name = subscribers.get(id).map_or("<gone>", |s| s.name());
                    error!(
                        kind = %def.name,
                        subscriber = name,
                        label = err.as_label(),
                        error = %err,
                        "handler failed, sweep continues",
                    );
                }
                self.apply(ctl);
            }
        }

        if def.clears_reclaim_guard {
            if let Some(cargo) = raw.cargo.as_deref() {
                world.clear_reclaim_guard(cargo);
            }
        }
    }

    /// Applies the deferred commands recorded during one invocation.
    fn apply(&mut self, ctl: DispatchCtl) {
        let DispatchCtl {
            subscriber,
            detach,
            detach_all,
            emitted,
        } = ctl;
        if detach_all {
            self.table.remove_everywhere(subscriber);
        } else {
            for kind in detach {
                self.table.remove(kind, subscriber);
            }
        }
        self.pending.extend(emitted);
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::standard()
    }
}

/// Runs one handler under a panic guard.
///
/// Delivery goes through the explicit handler when the subscription carries
/// one, otherwise through [`Subscriber::on_event`]. A panic is downgraded
/// to [`InvokeError::Panicked`] with whatever payload text can be
/// recovered.
fn invoke_guarded(
    handler: Option<&mut HandlerFn>,
    subscriber: &mut dyn Subscriber,
    event: &EventData,
    ctl: &mut DispatchCtl,
) -> Result<(), InvokeError> {
    let result = catch_unwind(AssertUnwindSafe(|| match handler {
        Some(handler) => handler(subscriber, event, ctl),
        None => subscriber.on_event(event, ctl),
    }));
    match result {
        Ok(outcome) => outcome.map_err(InvokeError::from),
        Err(payload) => Err(InvokeError::Panicked {
            info: panic_info(&*payload),
        }),
    }
}
