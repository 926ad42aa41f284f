//! # simvisor
//!
//! **Simvisor** is the event-dispatch and scheduling core for scripted
//! simulation missions.
//!
//! It routes host events (shots, kills, landings, cargo and zone changes)
//! to mission-script subscribers in a strict priority order, resolves raw
//! entity names into typed event data, and runs repeating tasks on
//! simulation time with configurable jitter. The crate is single-threaded
//! by design: the simulation host calls in, nothing here spawns or locks.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     host feed                          mission scripts
//!         │ dispatch(RawEvent)                │ publish(draft, now)
//!         ▼                                   ▼
//! ┌───────────────────────────────────────────────────────────┐
//! │  Dispatcher                                               │
//! │  - KindTable (event vocabulary, sweep direction, rules)   │
//! │  - SubscriptionTable (kind → 5 priority buckets)          │
//! │  - mission-end latch, follow-up queue                     │
//! └──────┬────────────────────────────────────────────────────┘
//!        │ enrich names against World
//!        ▼
//!   EventData ──► bucket sweep ──► Subscriber::on_event / HandlerFn
//!                                      │    (arena-owned, panic-guarded)
//!                                      ▼
//!                              DispatchCtl commands
//!                       (detach / emit, applied at the boundary)
//!
//! ┌───────────────┐  schedule(at, id)    ┌───────────────────┐
//! │   Scheduler   │ ────────────────────►│   host Timeline   │
//! │   (jittered   │                      │   (owns timers)   │
//! │    repeats)   │◄──────────────────── │                   │
//! └───────────────┘      fire(id)        └───────────────────┘
//! ```
//!
//! ### Dispatch walk
//! ```text
//! dispatch(raw):
//!   ├─► unknown kind / mission ended / missing initiator ─► drop (logged)
//!   ├─► MissionEnd ─► latch: delivered once, everything after is dropped
//!   ├─► enrich names against World (unit → static → cargo → scenery)
//!   ├─► sweep buckets (ascending for creation, descending for destruction)
//!   │     per subscriber:
//!   │       ├─ arena no longer holds the id          ─► purge entry
//!   │       ├─ filter does not match                 ─► skip
//!   │       ├─ filtered entity dead, kind not terminal ─► purge entry
//!   │       └─ invoke (panic-guarded) ─► apply DispatchCtl commands
//!   └─► drain handler-emitted events, FIFO
//! ```
//!
//! ## Features
//! | Area            | Description                                                  | Key types / traits                      |
//! |-----------------|--------------------------------------------------------------|------------------------------------------|
//! | **Dispatch**    | Priority-ordered delivery with per-kind sweep direction.     | [`Dispatcher`], [`Priority`], [`Subscription`] |
//! | **Kinds**       | Standard event vocabulary plus custom kind registration.     | [`KindTable`], [`KindId`], [`KindDef`]   |
//! | **Subscribers** | Arena-owned handlers addressed by generational ids.          | [`Subscriber`], [`SubscriberArena`]      |
//! | **Scheduling**  | Jittered repeating tasks on simulation time.                 | [`Scheduler`], [`TaskSpec`]              |
//! | **Host bridge** | Identity/aliveness queries and timer registration.           | [`World`], [`Timeline`]                  |
//! | **Errors**      | Typed errors for handlers, publication, and registration.    | [`HandlerError`], [`PublishError`]       |
//! | **Testing**     | In-memory fakes for dispatch and scheduler tests.            | [`testing::FakeWorld`], [`testing::TestTimeline`] |
//!
//! ## Example
//! ```rust
//! use simvisor::testing::{FakeWorld, Trace, TraceSubscriber};
//! use simvisor::{
//!     Coalition, Dispatcher, KindId, Priority, RawEvent, SimTime, SubscriberArena,
//!     Subscription, UnitEntry,
//! };
//!
//! let mut dispatcher = Dispatcher::standard();
//! let mut subscribers = SubscriberArena::new();
//! let mut world = FakeWorld::new();
//! world.add_unit("viper-1", UnitEntry::new("F-16C", Coalition::Blue));
//!
//! // A script watching for new units, at the last (script) level.
//! let trace = Trace::new();
//! let spotter = subscribers.insert(Box::new(TraceSubscriber::new("spotter", &trace)));
//! dispatcher.subscribe(KindId::BIRTH, Priority::Script, spotter, Subscription::new());
//!
//! // The host reports a unit entering the world.
//! dispatcher.dispatch(
//!     RawEvent::new(KindId::BIRTH, SimTime::from_secs(12.0)).with_initiator("viper-1"),
//!     &mut subscribers,
//!     &mut world,
//! );
//!
//! assert_eq!(trace.entries(), vec!["spotter:Birth".to_string()]);
//! ```

mod dispatch;
mod error;
mod events;
mod host;
mod sched;
mod slots;
mod subscribers;

pub mod testing;

// ---- Public re-exports ----

pub use dispatch::{
    DispatchCtl, Dispatcher, EntityFilter, HandlerFn, Priority, Subscription, typed_handler,
};
pub use error::{HandlerError, InvokeError, PublishError, RegisterError};
pub use events::{
    CUSTOM_KIND_START, CargoInfo, Category, EventData, KindDef, KindId, KindTable, MarkPoint,
    Participant, ParticipantRule, Place, RawEvent, SweepDirection,
};
pub use host::{
    AirbaseEntry, CargoEntry, Coalition, GroupEntry, SimTime, StaticEntry, Timeline, TimerHandle,
    UnitEntry, World,
};
pub use sched::{Continuation, FIRE_EPSILON, Scheduler, TaskCallback, TaskId, TaskSpec};
pub use subscribers::{Subscriber, SubscriberArena, SubscriberId};
