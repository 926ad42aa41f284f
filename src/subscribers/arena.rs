//! # Subscriber ownership arena.
//!
//! The arena is the single owner of every live subscriber object. All other
//! parts of the engine (the subscription table, scheduled-task owners) hold
//! only [`SubscriberId`] values, which are generational handles: once a
//! subscriber is removed, every handle to it goes stale at the same instant,
//! and stale handles are detected (and their subscriptions lazily purged) at
//! the next dispatch that touches them.
//!
//! ## Rules
//! - The arena is owned by the host and passed into dispatch calls by
//!   reference; the engine never extends a subscriber's lifetime.
//! - Removing a subscriber does not touch the subscription table; cleanup
//!   is lazy and happens during dispatch.
//! - Slot reuse never revives an old id (generations are bumped on removal).

use crate::slots::{Key, Slots};
use crate::subscribers::Subscriber;

/// Stable, generation-checked handle to a subscriber in the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriberId(pub(crate) Key);

/// Owner of all live subscriber objects.
#[derive(Default)]
pub struct SubscriberArena {
    slots: Slots<Box<dyn Subscriber>>,
}

impl SubscriberArena {
    #[must_use]
    pub fn new() -> Self {
        Self { slots: Slots::new() }
    }

    /// Takes ownership of `subscriber` and returns its handle.
    pub fn insert(&mut self, subscriber: Box<dyn Subscriber>) -> SubscriberId {
        SubscriberId(self.slots.insert(subscriber))
    }

    /// Removes the subscriber, returning it if the handle was still live.
    ///
    /// Subscriptions held under this id become stale immediately and are
    /// purged lazily by later dispatches.
    pub fn remove(&mut self, id: SubscriberId) -> Option<Box<dyn Subscriber>> {
        self.slots.remove(id.0)
    }

    pub fn get(&self, id: SubscriberId) -> Option<&dyn Subscriber> {
        self.slots.get(id.0).map(|boxed| boxed.as_ref())
    }

    pub fn get_mut(&mut self, id: SubscriberId) -> Option<&mut dyn Subscriber> {
        self.slots.get_mut(id.0).map(|boxed| boxed.as_mut())
    }

    /// Whether `id` still addresses a live subscriber.
    pub fn contains(&self, id: SubscriberId) -> bool {
        self.slots.contains(id.0)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::DispatchCtl;
    use crate::error::HandlerError;
    use crate::events::EventData;

    struct Counter {
        seen: u32,
    }

    impl Subscriber for Counter {
        fn on_event(&mut self, _: &EventData, _: &mut DispatchCtl) -> Result<(), HandlerError> {
            self.seen += 1;
            Ok(())
        }
    }

    #[test]
    fn test_removed_id_is_stale_and_reuse_mints_fresh_id() {
        let mut arena = SubscriberArena::new();
        let first = arena.insert(Box::new(Counter { seen: 0 }));
        assert!(arena.contains(first));

        assert!(arena.remove(first).is_some());
        assert!(!arena.contains(first), "removed id must go stale");
        assert!(arena.remove(first).is_none(), "second remove is a no-op");

        let second = arena.insert(Box::new(Counter { seen: 0 }));
        assert_ne!(first, second, "slot reuse must not revive the old id");
        assert!(!arena.contains(first));
        assert!(arena.contains(second));
    }

    #[test]
    fn test_get_mut_reaches_the_stored_subscriber() {
        let mut arena = SubscriberArena::new();
        let id = arena.insert(Box::new(Counter { seen: 41 }));

        let name = arena.get(id).map(|s| s.name()).unwrap_or_default();
        assert!(name.contains("Counter"), "default name comes from the type");
        assert_eq!(arena.len(), 1);
        assert!(arena.get_mut(id).is_some());
    }
}
