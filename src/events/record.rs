//! # Raw event records.
//!
//! A [`RawEvent`] is the sole ingestion format: the host (or a script, via
//! [`Dispatcher::publish`]) describes what happened using plain names, and
//! enrichment resolves those names into [`EventData`] at dispatch time.
//! Every payload field is optional and independent; which ones are present
//! depends on the kind and on what the simulation reported.
//!
//! ## Example
//! ```rust
//! use simvisor::{KindId, MarkPoint, RawEvent, SimTime};
//!
//! let ev = RawEvent::new(KindId::KILL, SimTime::from_secs(421.5))
//!     .with_initiator("viper-1")
//!     .with_target("bandit-3")
//!     .with_weapon("AIM-120C");
//!
//! assert_eq!(ev.initiator.as_deref(), Some("viper-1"));
//! assert_eq!(ev.weapon.as_deref(), Some("AIM-120C"));
//! assert!(ev.mark.is_none());
//! ```
//!
//! [`Dispatcher::publish`]: crate::Dispatcher::publish
//! [`EventData`]: crate::EventData

use crate::events::KindId;
use crate::host::SimTime;

/// A map marker referenced by mark events.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkPoint {
    /// Host-assigned marker id.
    pub id: u64,
    /// Marker label text.
    pub text: String,
}

impl MarkPoint {
    pub fn new(id: u64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}

/// An unresolved event as reported by the host simulation.
///
/// Participants and payload fields are raw names; dispatch resolves them
/// through the [`World`](crate::World) before any subscriber sees the event.
#[derive(Clone, Debug)]
pub struct RawEvent {
    /// Event classification.
    pub kind: KindId,
    /// Simulation time the event occurred at.
    pub time: SimTime,
    /// Name of the entity that caused the event.
    pub initiator: Option<String>,
    /// Name of the entity the event happened to.
    pub target: Option<String>,
    /// Weapon type name, for shot/hit/kill events.
    pub weapon: Option<String>,
    /// Airbase name (or ground spot, for ejection landings).
    pub place: Option<String>,
    /// Map marker, for mark events.
    pub mark: Option<MarkPoint>,
    /// Cargo object name, for cargo events.
    pub cargo: Option<String>,
    /// Zone name, for zone events.
    pub zone: Option<String>,
}

impl RawEvent {
    /// Creates a bare record of the given kind at the given time.
    pub fn new(kind: KindId, time: SimTime) -> Self {
        Self {
            kind,
            time,
            initiator: None,
            target: None,
            weapon: None,
            place: None,
            mark: None,
            cargo: None,
            zone: None,
        }
    }

    /// Attaches the initiating entity's name.
    #[inline]
    pub fn with_initiator(mut self, name: impl Into<String>) -> Self {
        self.initiator = Some(name.into());
        self
    }

    /// Attaches the target entity's name.
    #[inline]
    pub fn with_target(mut self, name: impl Into<String>) -> Self {
        self.target = Some(name.into());
        self
    }

    /// Attaches a weapon type name.
    #[inline]
    pub fn with_weapon(mut self, type_name: impl Into<String>) -> Self {
        self.weapon = Some(type_name.into());
        self
    }

    /// Attaches a place name.
    #[inline]
    pub fn with_place(mut self, name: impl Into<String>) -> Self {
        self.place = Some(name.into());
        self
    }

    /// Attaches a map marker.
    #[inline]
    pub fn with_mark(mut self, mark: MarkPoint) -> Self {
        self.mark = Some(mark);
        self
    }

    /// Attaches a cargo object name.
    #[inline]
    pub fn with_cargo(mut self, name: impl Into<String>) -> Self {
        self.cargo = Some(name.into());
        self
    }

    /// Attaches a zone name.
    #[inline]
    pub fn with_zone(mut self, name: impl Into<String>) -> Self {
        self.zone = Some(name.into());
        self
    }
}
