//! # Event routing.
//!
//! This module provides the [`Dispatcher`] and everything a subscription
//! carries: the [`Priority`] level, the optional [`EntityFilter`], and the
//! optional [`HandlerFn`] delivery override.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   host feed ── dispatch(RawEvent) ──► drop rules (kind table, latch)
//!   scripts ─── publish(draft, now) ──►     │
//!                                           ▼ enrich against World
//!                                      EventData
//!                                           │
//!                                           ▼ per kind: 5 priority buckets
//!                  bucket sweep (ascending or descending, kind-declared)
//!                                           │
//!                                           ▼ per subscriber: gate, invoke
//!                  Subscriber::on_event / HandlerFn, panic-guarded
//!                                           │
//!                                           ▼
//!                  DispatchCtl commands applied at the invocation boundary
//! ```
//!
//! ## Delivery contract
//! - **Ordering** - buckets are strictly ordered; order inside one bucket
//!   is unspecified.
//! - **Containment** - a failing or panicking handler is logged and never
//!   stops the sweep.
//! - **No re-entrancy** - handler-emitted events queue and dispatch after
//!   the current event completes.

mod ctl;
mod dispatcher;
mod enrich;
mod table;

pub use ctl::DispatchCtl;
pub use dispatcher::Dispatcher;
pub use table::{EntityFilter, HandlerFn, Priority, Subscription, typed_handler};
