//! # Subscribers: identity, ownership, and the handler trait.
//!
//! ## Contents
//! - [`Subscriber`] the trait mission logic implements
//! - [`SubscriberArena`] single owner of live subscribers
//! - [`SubscriberId`] generational handle everything else stores
//!
//! ## Lifecycle
//! ```text
//! arena.insert(Box::new(logic)) ──► SubscriberId
//!         │                             │ used in subscribe()/task owners
//!         ▼                             ▼
//! arena.remove(id) ──► id goes stale ──► next dispatch purges its entries
//! ```

mod arena;
mod subscriber;

pub use arena::{SubscriberArena, SubscriberId};
pub use subscriber::Subscriber;
