//! # Subscription storage and descriptors.
//!
//! Three-level lookup, each level O(1) amortized:
//!
//! ```text
//! KindId ──► [bucket 1 .. bucket 5] ──► SubscriberId ──► Subscription
//!                (priority)                (non-owning)
//! ```
//!
//! ## Rules
//! - Keys are plain [`SubscriberId`] values; the table never owns a
//!   subscriber and never keeps one alive.
//! - One entry per (kind, priority, subscriber); re-subscribing overwrites.
//! - Subscribe/unsubscribe are idempotent; removing an absent entry is a
//!   no-op, not an error.
//! - Order among subscribers within one bucket is unspecified.

use std::any::{Any, type_name};
use std::collections::HashMap;

use crate::dispatch::DispatchCtl;
use crate::error::HandlerError;
use crate::events::{EventData, KindId, Participant};
use crate::host::World;
use crate::subscribers::{Subscriber, SubscriberId};

/// One of the five ordered levels sequencing subscriber invocation.
///
/// Creation-like kinds sweep [`Core`](Priority::Core) first so canonical
/// registries observe new entities before everyone else; destruction-like
/// kinds sweep [`Script`](Priority::Script) first so mission logic lets go
/// of a dying entity before the registries delete it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Priority {
    /// Canonical low-level registries.
    Core = 1,
    High = 2,
    Normal = 3,
    Low = 4,
    /// Mission-script consumers.
    Script = 5,
}

impl Priority {
    /// All levels, lowest numeric level first.
    pub const ASCENDING: [Priority; 5] = [
        Priority::Core,
        Priority::High,
        Priority::Normal,
        Priority::Low,
        Priority::Script,
    ];

    /// Numeric level, 1 through 5.
    pub fn level(self) -> u8 {
        self as u8
    }

    pub(crate) fn index(self) -> usize {
        self as usize - 1
    }
}

/// Delivery callback stored on a subscription.
///
/// Receives the subscriber being delivered to, the enriched event, and the
/// deferred-command recorder. Extra invocation context beyond these is
/// expressed as closure captures.
pub type HandlerFn =
    Box<dyn FnMut(&mut dyn Subscriber, &EventData, &mut DispatchCtl) -> Result<(), HandlerError>>;

/// Wraps a handler for a concrete subscriber type into a [`HandlerFn`].
///
/// The wrapper downcasts the delivered subscriber; a mismatch yields
/// [`HandlerError::TypeMismatch`], which the dispatch loop logs like any
/// other handler failure.
pub fn typed_handler<S, F>(mut handler: F) -> HandlerFn
where
    S: Subscriber,
    F: FnMut(&mut S, &EventData, &mut DispatchCtl) -> Result<(), HandlerError> + 'static,
{
    Box::new(move |subscriber, event, ctl| {
        let any: &mut dyn Any = subscriber;
        match any.downcast_mut::<S>() {
            Some(typed) => handler(typed, event, ctl),
            None => Err(HandlerError::TypeMismatch {
                expected: type_name::<S>(),
            }),
        }
    })
}

/// Restricts a subscription to events involving one named entity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntityFilter {
    /// Match events whose initiator (or declared target) is this unit.
    Unit(String),
    /// Match events whose initiator (or declared target) belongs to this group.
    Group(String),
}

impl EntityFilter {
    /// Whether the event involves the filtered entity.
    ///
    /// The initiator side is always consulted; the target side only for
    /// kinds that declare one.
    pub(crate) fn matches(&self, event: &EventData, include_target: bool) -> bool {
        match self {
            EntityFilter::Unit(name) => {
                names_unit(event.initiator.as_ref(), name)
                    || (include_target && names_unit(event.target.as_ref(), name))
            }
            EntityFilter::Group(name) => {
                in_group(event.initiator.as_ref(), name)
                    || (include_target && in_group(event.target.as_ref(), name))
            }
        }
    }

    /// Whether the filtered entity still reports itself alive.
    pub(crate) fn alive(&self, world: &dyn World) -> bool {
        match self {
            EntityFilter::Unit(name) => world.unit_alive(name),
            EntityFilter::Group(name) => world.group_alive(name),
        }
    }
}

fn names_unit(participant: Option<&Participant>, name: &str) -> bool {
    participant.is_some_and(|p| p.name == name)
}

fn in_group(participant: Option<&Participant>, name: &str) -> bool {
    participant.is_some_and(|p| p.group.as_deref() == Some(name))
}

/// What to do when an event of the subscribed kind is dispatched.
///
/// With no explicit handler, delivery goes through
/// [`Subscriber::on_event`]; with no filter, every event of the kind
/// matches.
#[derive(Default)]
pub struct Subscription {
    pub(crate) handler: Option<HandlerFn>,
    pub(crate) filter: Option<EntityFilter>,
}

impl Subscription {
    /// Unfiltered subscription delivering through [`Subscriber::on_event`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscription bound to one named unit.
    pub fn for_unit(name: impl Into<String>) -> Self {
        Self {
            handler: None,
            filter: Some(EntityFilter::Unit(name.into())),
        }
    }

    /// Subscription bound to one named group.
    pub fn for_group(name: impl Into<String>) -> Self {
        Self {
            handler: None,
            filter: Some(EntityFilter::Group(name.into())),
        }
    }

    /// Attaches an explicit delivery handler (see [`typed_handler`]).
    #[inline]
    pub fn with_handler(mut self, handler: HandlerFn) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Attaches a granularity filter.
    #[inline]
    pub fn with_filter(mut self, filter: EntityFilter) -> Self {
        self.filter = Some(filter);
        self
    }
}

#[derive(Default)]
struct Buckets([HashMap<SubscriberId, Subscription>; 5]);

impl Buckets {
    fn is_empty(&self) -> bool {
        self.0.iter().all(HashMap::is_empty)
    }
}

/// The kind → priority → subscriber lookup.
#[derive(Default)]
pub(crate) struct SubscriptionTable {
    kinds: HashMap<KindId, Buckets>,
}

impl SubscriptionTable {
    pub(crate) fn insert(
        &mut self,
        kind: KindId,
        priority: Priority,
        id: SubscriberId,
        subscription: Subscription,
    ) {
        self.kinds.entry(kind).or_default().0[priority.index()].insert(id, subscription);
    }

    /// Removes the (kind, subscriber) association across all buckets.
    pub(crate) fn remove(&mut self, kind: KindId, id: SubscriberId) {
        if let Some(buckets) = self.kinds.get_mut(&kind) {
            for bucket in &mut buckets.0 {
                bucket.remove(&id);
            }
            if buckets.is_empty() {
                self.kinds.remove(&kind);
            }
        }
    }

    /// Removes one exact (kind, priority, subscriber) entry.
    pub(crate) fn remove_at(&mut self, kind: KindId, priority: Priority, id: SubscriberId) {
        if let Some(buckets) = self.kinds.get_mut(&kind) {
            buckets.0[priority.index()].remove(&id);
            if buckets.is_empty() {
                self.kinds.remove(&kind);
            }
        }
    }

    /// Removes the subscriber from every kind and bucket.
    pub(crate) fn remove_everywhere(&mut self, id: SubscriberId) {
        self.kinds.retain(|_, buckets| {
            for bucket in &mut buckets.0 {
                bucket.remove(&id);
            }
            !buckets.is_empty()
        });
    }

    /// Snapshot of the subscriber ids currently in one bucket.
    ///
    /// Dispatch iterates this stable copy so handler-issued commands cannot
    /// invalidate the walk.
    pub(crate) fn snapshot_ids(&self, kind: KindId, priority: Priority) -> Vec<SubscriberId> {
        self.kinds
            .get(&kind)
            .map(|buckets| buckets.0[priority.index()].keys().copied().collect())
            .unwrap_or_default()
    }

    pub(crate) fn descriptor(
        &self,
        kind: KindId,
        priority: Priority,
        id: SubscriberId,
    ) -> Option<&Subscription> {
        self.kinds.get(&kind)?.0[priority.index()].get(&id)
    }

    pub(crate) fn descriptor_mut(
        &mut self,
        kind: KindId,
        priority: Priority,
        id: SubscriberId,
    ) -> Option<&mut Subscription> {
        self.kinds.get_mut(&kind)?.0[priority.index()].get_mut(&id)
    }

    /// Whether the subscriber is present in any bucket for `kind`.
    pub(crate) fn contains(&self, kind: KindId, id: SubscriberId) -> bool {
        self.kinds
            .get(&kind)
            .is_some_and(|buckets| buckets.0.iter().any(|bucket| bucket.contains_key(&id)))
    }

    /// Total number of stored subscriptions.
    pub(crate) fn len(&self) -> usize {
        self.kinds
            .values()
            .map(|buckets| buckets.0.iter().map(HashMap::len).sum::<usize>())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscribers::SubscriberArena;

    struct Sink;
    impl Subscriber for Sink {}

    fn id(arena: &mut SubscriberArena) -> SubscriberId {
        arena.insert(Box::new(Sink))
    }

    #[test]
    fn test_resubscribe_overwrites_descriptor() {
        let mut arena = SubscriberArena::new();
        let sub = id(&mut arena);
        let mut table = SubscriptionTable::default();

        table.insert(KindId::SHOT, Priority::Normal, sub, Subscription::new());
        table.insert(
            KindId::SHOT,
            Priority::Normal,
            sub,
            Subscription::for_unit("viper-1"),
        );

        assert_eq!(table.len(), 1, "re-subscribe must replace, not add");
        let stored = table
            .descriptor(KindId::SHOT, Priority::Normal, sub)
            .expect("entry present");
        assert_eq!(
            stored.filter,
            Some(EntityFilter::Unit("viper-1".into())),
            "latest descriptor wins"
        );
    }

    #[test]
    fn test_unsubscribe_is_idempotent_and_prunes_empty_kinds() {
        let mut arena = SubscriberArena::new();
        let sub = id(&mut arena);
        let mut table = SubscriptionTable::default();

        table.insert(KindId::DEAD, Priority::Script, sub, Subscription::new());
        assert!(table.contains(KindId::DEAD, sub));

        table.remove(KindId::DEAD, sub);
        assert!(!table.contains(KindId::DEAD, sub));
        assert_eq!(table.len(), 0);

        // Absent entry: removing again is a no-op.
        table.remove(KindId::DEAD, sub);
        table.remove_at(KindId::DEAD, Priority::Script, sub);
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn test_remove_everywhere_clears_all_kinds_and_buckets() {
        let mut arena = SubscriberArena::new();
        let sub = id(&mut arena);
        let other = id(&mut arena);
        let mut table = SubscriptionTable::default();

        table.insert(KindId::SHOT, Priority::Core, sub, Subscription::new());
        table.insert(KindId::SHOT, Priority::Script, sub, Subscription::new());
        table.insert(KindId::DEAD, Priority::Normal, sub, Subscription::new());
        table.insert(KindId::DEAD, Priority::Normal, other, Subscription::new());

        table.remove_everywhere(sub);

        assert!(!table.contains(KindId::SHOT, sub));
        assert!(!table.contains(KindId::DEAD, sub));
        assert!(
            table.contains(KindId::DEAD, other),
            "other subscribers must be unaffected"
        );
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_snapshot_is_a_stable_copy() {
        let mut arena = SubscriberArena::new();
        let sub = id(&mut arena);
        let mut table = SubscriptionTable::default();
        table.insert(KindId::BIRTH, Priority::Core, sub, Subscription::new());

        let snapshot = table.snapshot_ids(KindId::BIRTH, Priority::Core);
        table.remove(KindId::BIRTH, sub);

        assert_eq!(snapshot, vec![sub], "snapshot survives later mutation");
        assert!(table.snapshot_ids(KindId::BIRTH, Priority::Core).is_empty());
    }
}
