//! # Event subscriber trait.
//!
//! Provides [`Subscriber`], the extension point for plugging mission logic
//! into the dispatcher.
//!
//! Each subscriber gets:
//! - **Stable identity** (a generational [`SubscriberId`](crate::SubscriberId)
//!   minted by the arena)
//! - **Panic isolation** (a panicking handler is caught and logged; other
//!   subscribers still run)
//! - **Deferred self-management** (unsubscribe and follow-up publication via
//!   [`DispatchCtl`], applied at the next invocation boundary)
//!
//! ## Rules
//! - Handlers run synchronously on the host tick; do not block.
//! - Prefer returning [`HandlerError`] over panicking; both are isolated,
//!   but an error carries a message the log can use.
//! - A subscription may override delivery with an explicit per-subscription
//!   handler; [`Subscriber::on_event`] is the default path.
//!
//! ## Example
//! ```rust
//! use simvisor::{DispatchCtl, EventData, HandlerError, KindId, Subscriber};
//!
//! #[derive(Default)]
//! struct KillBoard {
//!     kills: u32,
//! }
//!
//! impl Subscriber for KillBoard {
//!     fn on_event(&mut self, event: &EventData, _ctl: &mut DispatchCtl) -> Result<(), HandlerError> {
//!         if event.kind == KindId::KILL {
//!             self.kills += 1;
//!         }
//!         Ok(())
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "kill-board"
//!     }
//! }
//! ```

use std::any::Any;

use crate::dispatch::DispatchCtl;
use crate::error::HandlerError;
use crate::events::EventData;

/// A mission-logic object receiving dispatched events.
///
/// Implementations live in the [`SubscriberArena`](crate::SubscriberArena)
/// and are addressed by [`SubscriberId`](crate::SubscriberId); the dispatcher
/// borrows them mutably for the duration of one invocation.
///
/// The `Any` supertrait allows typed per-subscription handlers to downcast
/// back to the concrete type (see [`typed_handler`](crate::typed_handler)).
pub trait Subscriber: Any {
    /// Handles one enriched event.
    ///
    /// Called for every subscription without an explicit handler. Errors are
    /// logged and do not stop the sweep. Defaults to a no-op so types that
    /// rely solely on per-subscription handlers need not implement it.
    fn on_event(&mut self, _event: &EventData, _ctl: &mut DispatchCtl) -> Result<(), HandlerError> {
        Ok(())
    }

    /// Returns the subscriber name used in logs.
    ///
    /// Prefer short, descriptive names (e.g., "scoreboard", "csar", "awacs").
    /// The default uses `type_name::<Self>()`, which can be verbose;
    /// override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
