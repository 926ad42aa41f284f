//! # Host world boundary.
//!
//! The engine never owns entity state. Everything it needs to know about the
//! simulated world (who a name belongs to, whether that entity is still
//! alive) comes through the [`World`] trait, implemented by the host and
//! passed into every dispatch call by mutable reference.
//!
//! ## Rules
//! - Resolution returns an owned snapshot ([`UnitEntry`] and friends); the
//!   engine never holds references into host storage across calls.
//! - Aliveness is re-queried at dispatch time, never cached from a snapshot.
//! - `None` from a resolver is an ordinary outcome (the name may refer to
//!   scenery or to something already gone), not an error.

/// Side an entity fights for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Coalition {
    Neutral,
    Red,
    Blue,
}

/// Snapshot of a named unit.
#[derive(Clone, Debug, PartialEq)]
pub struct UnitEntry {
    /// Vehicle/airframe type, e.g. `"F-16C"`.
    pub type_name: String,
    pub coalition: Coalition,
    /// Owning group name, when the unit belongs to one.
    pub group: Option<String>,
    /// Player name when a human occupies the unit.
    pub player: Option<String>,
    pub alive: bool,
}

impl UnitEntry {
    pub fn new(type_name: impl Into<String>, coalition: Coalition) -> Self {
        Self {
            type_name: type_name.into(),
            coalition,
            group: None,
            player: None,
            alive: true,
        }
    }

    #[inline]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    #[inline]
    pub fn with_player(mut self, player: impl Into<String>) -> Self {
        self.player = Some(player.into());
        self
    }

    /// Marks the snapshot not-alive.
    #[inline]
    pub fn dead(mut self) -> Self {
        self.alive = false;
        self
    }
}

/// Snapshot of a named group.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupEntry {
    pub coalition: Coalition,
    pub alive: bool,
}

impl GroupEntry {
    pub fn new(coalition: Coalition) -> Self {
        Self {
            coalition,
            alive: true,
        }
    }

    #[inline]
    pub fn dead(mut self) -> Self {
        self.alive = false;
        self
    }
}

/// Snapshot of a named static object.
#[derive(Clone, Debug, PartialEq)]
pub struct StaticEntry {
    pub type_name: String,
    pub coalition: Coalition,
    pub alive: bool,
}

impl StaticEntry {
    pub fn new(type_name: impl Into<String>, coalition: Coalition) -> Self {
        Self {
            type_name: type_name.into(),
            coalition,
            alive: true,
        }
    }

    #[inline]
    pub fn dead(mut self) -> Self {
        self.alive = false;
        self
    }
}

/// Snapshot of a named cargo object.
#[derive(Clone, Debug, PartialEq)]
pub struct CargoEntry {
    pub type_name: String,
}

impl CargoEntry {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
        }
    }
}

/// Snapshot of a named airbase (airfield, FARP or carrier).
#[derive(Clone, Debug, PartialEq)]
pub struct AirbaseEntry {
    pub coalition: Coalition,
}

impl AirbaseEntry {
    pub fn new(coalition: Coalition) -> Self {
        Self { coalition }
    }
}

/// Identity resolution and aliveness queries the host must answer.
///
/// Dispatch probes the resolvers in a fixed order (unit, then static, then
/// cargo) to classify a raw participant name; a name nothing claims is
/// treated as scenery.
pub trait World {
    fn resolve_unit(&self, name: &str) -> Option<UnitEntry>;

    fn resolve_group(&self, name: &str) -> Option<GroupEntry>;

    fn resolve_static(&self, name: &str) -> Option<StaticEntry>;

    fn resolve_cargo(&self, name: &str) -> Option<CargoEntry>;

    fn resolve_airbase(&self, name: &str) -> Option<AirbaseEntry>;

    /// Aliveness predicate consulted by the dispatch purge gate for
    /// unit-bound subscriptions. Default: re-resolve and read the snapshot.
    fn unit_alive(&self, name: &str) -> bool {
        self.resolve_unit(name).is_some_and(|unit| unit.alive)
    }

    /// Aliveness predicate for group-bound subscriptions.
    fn group_alive(&self, name: &str) -> bool {
        self.resolve_group(name).is_some_and(|group| group.alive)
    }

    /// Clears the "do not reclaim" marker on a cargo object.
    ///
    /// Called once per cargo-deletion event, after every subscriber for that
    /// event has run, so downstream collections do not double-remove the
    /// entry. Hosts without such a marker can keep the default no-op.
    fn clear_reclaim_guard(&mut self, _cargo: &str) {}
}
