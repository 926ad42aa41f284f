//! # Event-kind metadata and the kind table.
//!
//! Every event carries a [`KindId`]; the [`KindTable`] maps it to a
//! [`KindDef`] describing how dispatch must treat events of that kind:
//! which way to sweep the priority buckets, which participants the record
//! must carry, and whether the kind is terminal (exempt from the aliveness
//! purge).
//!
//! The table is built once at startup with the standard simulation kinds and
//! may grow at runtime through [`KindTable::register`]. Growth is
//! append-only: no kind is ever removed or redefined.
//!
//! ## Rules
//! - Ids below [`CUSTOM_KIND_START`] are reserved for the standard set.
//! - `register` with no explicit id probes upward from
//!   [`CUSTOM_KIND_START`] to the first free id.
//! - A duplicate name or an explicitly requested id that is already taken is
//!   rejected without mutating the table.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use crate::error::RegisterError;

/// First id handed out to runtime-registered kinds.
///
/// The standard set occupies 1..=31 (host simulation kinds) and 900..=904
/// (framework kinds); scripted registrations start here.
pub const CUSTOM_KIND_START: u32 = 1000;

/// Discriminator identifying a category of event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KindId(u32);

impl KindId {
    // === Host simulation kinds ===
    pub const SHOT: KindId = KindId::new(1);
    pub const HIT: KindId = KindId::new(2);
    pub const TAKEOFF: KindId = KindId::new(3);
    pub const LAND: KindId = KindId::new(4);
    pub const CRASH: KindId = KindId::new(5);
    pub const EJECTION: KindId = KindId::new(6);
    pub const REFUELING: KindId = KindId::new(7);
    pub const DEAD: KindId = KindId::new(8);
    pub const PILOT_DEAD: KindId = KindId::new(9);
    pub const BASE_CAPTURED: KindId = KindId::new(10);
    pub const MISSION_START: KindId = KindId::new(11);
    pub const MISSION_END: KindId = KindId::new(12);
    pub const BIRTH: KindId = KindId::new(15);
    pub const ENGINE_STARTUP: KindId = KindId::new(18);
    pub const ENGINE_SHUTDOWN: KindId = KindId::new(19);
    pub const PLAYER_ENTER_UNIT: KindId = KindId::new(20);
    pub const PLAYER_LEAVE_UNIT: KindId = KindId::new(21);
    pub const MARK_ADDED: KindId = KindId::new(25);
    pub const MARK_CHANGE: KindId = KindId::new(26);
    pub const MARK_REMOVED: KindId = KindId::new(27);
    pub const KILL: KindId = KindId::new(28);
    pub const LANDING_AFTER_EJECTION: KindId = KindId::new(31);

    // === Framework kinds ===
    pub const REMOVE_UNIT: KindId = KindId::new(900);
    pub const NEW_CARGO: KindId = KindId::new(901);
    pub const DELETE_CARGO: KindId = KindId::new(902);
    pub const NEW_ZONE: KindId = KindId::new(903);
    pub const DELETE_ZONE: KindId = KindId::new(904);

    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for KindId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Traversal direction over the five priority buckets.
///
/// Creation-like kinds sweep ascending so canonical low-priority registries
/// observe a new entity before higher-level consumers do; destruction-like
/// kinds sweep descending so specialized consumers let go of a dying entity
/// before the canonical registry deletes it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SweepDirection {
    /// Priority 1 first, 5 last.
    Ascending,
    /// Priority 5 first, 1 last.
    Descending,
}

/// Which participants an event record of this kind must carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParticipantRule {
    /// No participants expected (mission lifecycle, marks, cargo, zones).
    None,
    /// An initiator is required; events without one are dropped at dispatch.
    Initiator,
    /// Initiator and target are both carried; target is required at publish.
    InitiatorAndTarget,
}

/// Metadata for one event kind.
#[derive(Clone, Debug)]
pub struct KindDef {
    pub id: KindId,
    pub name: Cow<'static, str>,
    pub sweep: SweepDirection,
    pub participants: ParticipantRule,
    /// Tolerates a missing initiator even under a participant rule that
    /// names one (splash damage hits have no shooter).
    pub initiator_optional: bool,
    /// Exempt from the aliveness purge: subscriptions bound to an entity are
    /// still invoked when the entity no longer reports alive.
    pub terminal: bool,
    /// The place field names a ground spot rather than an airbase.
    pub spot_place: bool,
    /// Dispatch clears the cargo reclaim guard after all handlers ran.
    pub clears_reclaim_guard: bool,
}

impl KindDef {
    pub fn new(
        id: KindId,
        name: impl Into<Cow<'static, str>>,
        sweep: SweepDirection,
        participants: ParticipantRule,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            sweep,
            participants,
            initiator_optional: false,
            terminal: false,
            spot_place: false,
            clears_reclaim_guard: false,
        }
    }

    #[inline]
    pub fn with_optional_initiator(mut self) -> Self {
        self.initiator_optional = true;
        self
    }

    #[inline]
    pub fn with_terminal(mut self) -> Self {
        self.terminal = true;
        self
    }

    #[inline]
    pub fn with_spot_place(mut self) -> Self {
        self.spot_place = true;
        self
    }

    #[inline]
    pub fn with_reclaim_guard(mut self) -> Self {
        self.clears_reclaim_guard = true;
        self
    }
}

/// Append-only registry of event kinds, owned by the
/// [`Dispatcher`](crate::Dispatcher).
pub struct KindTable {
    defs: HashMap<KindId, KindDef>,
    by_name: HashMap<String, KindId>,
    next_custom: u32,
}

impl KindTable {
    /// Builds the standard simulation kind set.
    #[must_use]
    pub fn standard() -> Self {
        let mut table = Self {
            defs: HashMap::new(),
            by_name: HashMap::new(),
            next_custom: CUSTOM_KIND_START,
        };
        for def in standard_defs() {
            table.install(def);
        }
        table
    }

    fn install(&mut self, def: KindDef) {
        self.by_name.insert(def.name.to_string(), def.id);
        self.defs.insert(def.id, def);
    }

    pub fn get(&self, id: KindId) -> Option<&KindDef> {
        self.defs.get(&id)
    }

    /// Looks a kind up by its registered name.
    pub fn lookup(&self, name: &str) -> Option<KindId> {
        self.by_name.get(name).copied()
    }

    pub fn contains(&self, id: KindId) -> bool {
        self.defs.contains_key(&id)
    }

    /// Number of registered kinds.
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Registers a new event kind and returns its id.
    ///
    /// With `desired` set, that exact id is used or the call fails; without
    /// it, the table probes upward from [`CUSTOM_KIND_START`] for the first
    /// free id. A duplicate name fails. Nothing is mutated on failure.
    ///
    /// Custom kinds are never terminal and carry no place/cargo dispatch
    /// side effects.
    pub fn register(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        sweep: SweepDirection,
        participants: ParticipantRule,
        desired: Option<KindId>,
    ) -> Result<KindId, RegisterError> {
        let name = name.into();
        if self.by_name.contains_key(name.as_ref()) {
            return Err(RegisterError::DuplicateName {
                name: name.into_owned(),
            });
        }

        let id = match desired {
            Some(id) => {
                if self.defs.contains_key(&id) {
                    return Err(RegisterError::IdTaken { id });
                }
                id
            }
            None => {
                let mut candidate = self.next_custom;
                while self.defs.contains_key(&KindId::new(candidate)) {
                    candidate += 1;
                }
                self.next_custom = candidate + 1;
                KindId::new(candidate)
            }
        };

        self.install(KindDef::new(id, name, sweep, participants));
        Ok(id)
    }
}

impl Default for KindTable {
    fn default() -> Self {
        Self::standard()
    }
}

fn standard_defs() -> Vec<KindDef> {
    use KindId as K;
    use ParticipantRule::{Initiator, InitiatorAndTarget, None};
    use SweepDirection::{Ascending, Descending};

    vec![
        KindDef::new(K::SHOT, "Shot", Ascending, Initiator),
        KindDef::new(K::HIT, "Hit", Ascending, InitiatorAndTarget).with_optional_initiator(),
        KindDef::new(K::TAKEOFF, "Takeoff", Ascending, Initiator),
        KindDef::new(K::LAND, "Land", Ascending, Initiator),
        KindDef::new(K::CRASH, "Crash", Descending, Initiator).with_terminal(),
        KindDef::new(K::EJECTION, "Ejection", Ascending, Initiator),
        KindDef::new(K::REFUELING, "Refueling", Ascending, Initiator),
        KindDef::new(K::DEAD, "Dead", Descending, Initiator).with_terminal(),
        KindDef::new(K::PILOT_DEAD, "PilotDead", Descending, Initiator),
        KindDef::new(K::BASE_CAPTURED, "BaseCaptured", Ascending, Initiator),
        KindDef::new(K::MISSION_START, "MissionStart", Ascending, None),
        KindDef::new(K::MISSION_END, "MissionEnd", Descending, None),
        KindDef::new(K::BIRTH, "Birth", Ascending, Initiator).with_terminal(),
        KindDef::new(K::ENGINE_STARTUP, "EngineStartup", Ascending, Initiator),
        KindDef::new(K::ENGINE_SHUTDOWN, "EngineShutdown", Ascending, Initiator),
        KindDef::new(K::PLAYER_ENTER_UNIT, "PlayerEnterUnit", Ascending, Initiator),
        KindDef::new(K::PLAYER_LEAVE_UNIT, "PlayerLeaveUnit", Descending, Initiator),
        KindDef::new(K::MARK_ADDED, "MarkAdded", Ascending, None),
        KindDef::new(K::MARK_CHANGE, "MarkChange", Ascending, None),
        KindDef::new(K::MARK_REMOVED, "MarkRemoved", Descending, None),
        KindDef::new(K::KILL, "Kill", Ascending, InitiatorAndTarget),
        KindDef::new(
            K::LANDING_AFTER_EJECTION,
            "LandingAfterEjection",
            Ascending,
            Initiator,
        )
        .with_spot_place(),
        KindDef::new(K::REMOVE_UNIT, "RemoveUnit", Descending, Initiator).with_terminal(),
        KindDef::new(K::NEW_CARGO, "NewCargo", Ascending, None),
        KindDef::new(K::DELETE_CARGO, "DeleteCargo", Descending, None).with_reclaim_guard(),
        KindDef::new(K::NEW_ZONE, "NewZone", Ascending, None),
        KindDef::new(K::DELETE_ZONE, "DeleteZone", Descending, None),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_standard_table_resolves_names_and_ids() {
        let table = KindTable::standard();
        assert_eq!(table.lookup("Birth"), Some(KindId::BIRTH));
        assert_eq!(table.lookup("DeleteCargo"), Some(KindId::DELETE_CARGO));
        assert!(table.lookup("NoSuchKind").is_none());

        let dead = table.get(KindId::DEAD).expect("Dead must be registered");
        assert_eq!(dead.sweep, SweepDirection::Descending);
        assert_eq!(dead.participants, ParticipantRule::Initiator);
    }

    #[test]
    fn test_terminal_whitelist_covers_lifecycle_kinds() {
        let table = KindTable::standard();
        for id in [
            KindId::BIRTH,
            KindId::CRASH,
            KindId::DEAD,
            KindId::REMOVE_UNIT,
        ] {
            assert!(
                table.get(id).is_some_and(|def| def.terminal),
                "kind {id} must be terminal"
            );
        }
        assert!(
            table.get(KindId::HIT).is_some_and(|def| !def.terminal),
            "Hit must not be terminal"
        );
    }

    #[test]
    fn test_register_allocates_from_custom_range() {
        let mut table = KindTable::standard();
        let id = table
            .register(
                "PlayerScore",
                SweepDirection::Ascending,
                ParticipantRule::Initiator,
                None,
            )
            .expect("fresh name must register");
        assert!(id.raw() >= CUSTOM_KIND_START, "allocated id {id} too low");
        assert_eq!(table.lookup("PlayerScore"), Some(id));
    }

    #[test]
    fn test_register_probes_past_taken_ids() {
        let mut table = KindTable::standard();
        let taken = KindId::new(CUSTOM_KIND_START);
        table
            .register(
                "First",
                SweepDirection::Ascending,
                ParticipantRule::None,
                Some(taken),
            )
            .expect("explicit free id must register");

        let probed = table
            .register(
                "Second",
                SweepDirection::Ascending,
                ParticipantRule::None,
                None,
            )
            .expect("probe must skip the taken id");
        assert_ne!(probed, taken);
        assert!(probed.raw() > taken.raw());
    }

    #[test]
    fn test_duplicate_name_rejected_without_mutation() {
        let mut table = KindTable::standard();
        table
            .register(
                "CargoDropped",
                SweepDirection::Descending,
                ParticipantRule::Initiator,
                None,
            )
            .expect("first registration succeeds");
        let before = table.len();

        let err = table
            .register(
                "CargoDropped",
                SweepDirection::Ascending,
                ParticipantRule::None,
                None,
            )
            .expect_err("duplicate name must fail");
        assert_eq!(err.as_label(), "kind_duplicate_name");
        assert_eq!(table.len(), before, "failed registration must not mutate");

        let id = table.lookup("CargoDropped").expect("original entry intact");
        let def = table.get(id).expect("original def intact");
        assert_eq!(
            def.sweep,
            SweepDirection::Descending,
            "original definition must be untouched"
        );
    }

    #[test]
    fn test_explicit_id_collision_rejected() {
        let mut table = KindTable::standard();
        let before = table.len();
        let err = table
            .register(
                "FakeBirth",
                SweepDirection::Ascending,
                ParticipantRule::Initiator,
                Some(KindId::BIRTH),
            )
            .expect_err("id collision must fail");
        assert_eq!(err.as_label(), "kind_id_taken");
        assert_eq!(table.len(), before);
        assert!(table.lookup("FakeBirth").is_none());
    }
}
