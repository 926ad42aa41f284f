//! # Host integration boundary.
//!
//! Everything the engine needs from the embedding simulation: a clock and
//! timer service ([`Timeline`]), and identity/aliveness resolution
//! ([`World`]). Reference implementations for tests live in
//! [`crate::testing`].

mod time;
mod timeline;
mod world;

pub use time::SimTime;
pub use timeline::{Timeline, TimerHandle};
pub use world::{AirbaseEntry, CargoEntry, Coalition, GroupEntry, StaticEntry, UnitEntry, World};
