//! # Deferred dispatch commands.
//!
//! Handlers must not mutate the subscription table or re-enter dispatch
//! while a sweep is iterating it. Instead, every invocation receives a
//! [`DispatchCtl`] recorder; commands noted there are applied by the
//! dispatch loop at the invocation boundary, right after the handler
//! returns. This is what makes self-unsubscription and follow-up
//! publication from inside a handler safe.

use crate::events::{KindId, RawEvent};
use crate::subscribers::SubscriberId;

/// Command recorder handed to each handler invocation.
///
/// All commands are deferred: nothing takes effect until the handler
/// returns. Emitted events are dispatched FIFO after the current event
/// finishes its sweep.
pub struct DispatchCtl {
    pub(crate) subscriber: SubscriberId,
    pub(crate) detach: Vec<KindId>,
    pub(crate) detach_all: bool,
    pub(crate) emitted: Vec<RawEvent>,
}

impl DispatchCtl {
    pub(crate) fn new(subscriber: SubscriberId) -> Self {
        Self {
            subscriber,
            detach: Vec::new(),
            detach_all: false,
            emitted: Vec::new(),
        }
    }

    /// The id of the subscriber currently being invoked.
    pub fn subscriber(&self) -> SubscriberId {
        self.subscriber
    }

    /// Detaches the current subscriber from `kind` at the next boundary.
    ///
    /// The current invocation still completes; the subscriber is simply not
    /// considered again, including later buckets of the ongoing sweep.
    pub fn unsubscribe(&mut self, kind: KindId) {
        self.detach.push(kind);
    }

    /// Detaches the current subscriber from every kind at the next boundary.
    pub fn unsubscribe_all(&mut self) {
        self.detach_all = true;
    }

    /// Queues a follow-up event.
    ///
    /// Queued events go through the same drop rules as host events (unknown
    /// kind, missing initiator, mission-end latch) and are dispatched in
    /// emission order after the current event completes. There is no
    /// re-entrant dispatch.
    pub fn emit(&mut self, event: RawEvent) {
        self.emitted.push(event);
    }
}
