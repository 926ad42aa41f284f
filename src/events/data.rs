//! # Enriched event data handed to subscribers.
//!
//! Dispatch turns a [`RawEvent`](crate::RawEvent) into an [`EventData`] by
//! resolving every raw name through the host [`World`](crate::World):
//! participants gain a category and category-specific derived fields, places
//! gain a coalition, cargo gains a type. Subscribers only ever see this
//! resolved form.

use std::borrow::Cow;

use crate::events::{KindId, MarkPoint};
use crate::host::{Coalition, SimTime};

/// What a participant name resolved to.
///
/// Dispatch probes unit, then static, then cargo; a name nothing claims is
/// classified as scenery.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    Unit,
    Static,
    Cargo,
    Scenery,
}

/// A resolved event participant (initiator or target).
///
/// Only the fields the participant's category defines are populated: a
/// static has no owning group, scenery has no coalition, only a unit can
/// carry a player.
#[derive(Clone, Debug, PartialEq)]
pub struct Participant {
    /// Raw entity name the event reported.
    pub name: String,
    pub category: Category,
    /// Owning group name (units only).
    pub group: Option<String>,
    pub coalition: Option<Coalition>,
    /// Vehicle/object type name, where the category defines one.
    pub type_name: Option<String>,
    /// Occupying player name (human-controlled units only).
    pub player: Option<String>,
}

/// Where an event took place.
#[derive(Clone, Debug, PartialEq)]
pub enum Place {
    /// An airbase, FARP or carrier; coalition is `None` when the airbase
    /// could not be resolved.
    Airbase {
        name: String,
        coalition: Option<Coalition>,
    },
    /// A named ground spot (ejection landings).
    Spot { name: String },
}

/// Resolved cargo payload of a cargo event.
#[derive(Clone, Debug, PartialEq)]
pub struct CargoInfo {
    pub name: String,
    /// Cargo type, when the world still knows the object.
    pub type_name: Option<String>,
}

/// A fully resolved event, as delivered to subscribers.
#[derive(Clone, Debug)]
pub struct EventData {
    /// Event classification.
    pub kind: KindId,
    /// Registered name of the kind, for logs and filtering by name.
    pub kind_name: Cow<'static, str>,
    /// Simulation time the event occurred at.
    pub time: SimTime,
    /// Resolved initiating participant.
    pub initiator: Option<Participant>,
    /// Resolved target participant.
    pub target: Option<Participant>,
    /// Weapon type name, for shot/hit/kill events.
    pub weapon: Option<String>,
    /// Resolved place, for takeoff/landing/capture events.
    pub place: Option<Place>,
    /// Map marker, for mark events.
    pub mark: Option<MarkPoint>,
    /// Resolved cargo payload, for cargo events.
    pub cargo: Option<CargoInfo>,
    /// Zone name, for zone events.
    pub zone: Option<String>,
}
