//! # Raw-to-resolved event enrichment.
//!
//! Turns the plain names in a [`RawEvent`] into the resolved [`EventData`]
//! subscribers receive. Each participant name is probed against the world
//! in a fixed order (unit, static, cargo); a name nothing claims is
//! classified as scenery and carries no derived fields. Payload fields are
//! resolved only when present on the raw record.

use crate::events::{CargoInfo, Category, EventData, KindDef, Participant, Place, RawEvent};
use crate::host::World;

pub(crate) fn enrich(def: &KindDef, raw: &RawEvent, world: &dyn World) -> EventData {
    EventData {
        kind: def.id,
        kind_name: def.name.clone(),
        time: raw.time,
        initiator: raw
            .initiator
            .as_deref()
            .map(|name| resolve_participant(name, world)),
        target: raw
            .target
            .as_deref()
            .map(|name| resolve_participant(name, world)),
        weapon: raw.weapon.clone(),
        place: raw
            .place
            .as_deref()
            .map(|name| resolve_place(name, def.spot_place, world)),
        mark: raw.mark.clone(),
        cargo: raw
            .cargo
            .as_deref()
            .map(|name| resolve_cargo(name, world)),
        zone: raw.zone.clone(),
    }
}

fn resolve_participant(name: &str, world: &dyn World) -> Participant {
    if let Some(unit) = world.resolve_unit(name) {
        return Participant {
            name: name.to_string(),
            category: Category::Unit,
            group: unit.group,
            coalition: Some(unit.coalition),
            type_name: Some(unit.type_name),
            player: unit.player,
        };
    }
    if let Some(fixed) = world.resolve_static(name) {
        return Participant {
            name: name.to_string(),
            category: Category::Static,
            group: None,
            coalition: Some(fixed.coalition),
            type_name: Some(fixed.type_name),
            player: None,
        };
    }
    if let Some(cargo) = world.resolve_cargo(name) {
        return Participant {
            name: name.to_string(),
            category: Category::Cargo,
            group: None,
            coalition: None,
            type_name: Some(cargo.type_name),
            player: None,
        };
    }
    Participant {
        name: name.to_string(),
        category: Category::Scenery,
        group: None,
        coalition: None,
        type_name: None,
        player: None,
    }
}

fn resolve_place(name: &str, spot: bool, world: &dyn World) -> Place {
    if spot {
        return Place::Spot {
            name: name.to_string(),
        };
    }
    Place::Airbase {
        name: name.to_string(),
        coalition: world.resolve_airbase(name).map(|base| base.coalition),
    }
}

fn resolve_cargo(name: &str, world: &dyn World) -> CargoInfo {
    CargoInfo {
        name: name.to_string(),
        type_name: world.resolve_cargo(name).map(|cargo| cargo.type_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{KindId, KindTable};
    use crate::host::{AirbaseEntry, CargoEntry, Coalition, SimTime, StaticEntry, UnitEntry};
    use crate::testing::FakeWorld;
    use pretty_assertions::assert_eq;

    fn def(table: &KindTable, id: KindId) -> KindDef {
        table.get(id).expect("standard kind").clone()
    }

    #[test]
    fn test_unit_initiator_gains_derived_fields() {
        let table = KindTable::standard();
        let mut world = FakeWorld::new();
        world.add_unit(
            "viper-1",
            UnitEntry::new("F-16C", Coalition::Blue)
                .with_group("Viper")
                .with_player("Maverick"),
        );

        let raw = RawEvent::new(KindId::SHOT, SimTime::from_secs(4.0))
            .with_initiator("viper-1")
            .with_weapon("AIM-9X");
        let event = enrich(&def(&table, KindId::SHOT), &raw, &world);

        let initiator = event.initiator.expect("initiator resolved");
        assert_eq!(initiator.category, Category::Unit);
        assert_eq!(initiator.group.as_deref(), Some("Viper"));
        assert_eq!(initiator.coalition, Some(Coalition::Blue));
        assert_eq!(initiator.type_name.as_deref(), Some("F-16C"));
        assert_eq!(initiator.player.as_deref(), Some("Maverick"));
        assert_eq!(event.weapon.as_deref(), Some("AIM-9X"));
    }

    #[test]
    fn test_probe_order_unit_static_cargo_then_scenery() {
        let table = KindTable::standard();
        let mut world = FakeWorld::new();
        world.add_static("depot", StaticEntry::new("Warehouse", Coalition::Red));
        world.add_cargo("pallet-7", CargoEntry::new("Ammo"));

        let shot = def(&table, KindId::SHOT);

        let depot = enrich(
            &shot,
            &RawEvent::new(KindId::SHOT, SimTime::ZERO).with_initiator("depot"),
            &world,
        );
        assert_eq!(
            depot.initiator.expect("resolved").category,
            Category::Static
        );

        let pallet = enrich(
            &shot,
            &RawEvent::new(KindId::SHOT, SimTime::ZERO).with_initiator("pallet-7"),
            &world,
        );
        let pallet = pallet.initiator.expect("resolved");
        assert_eq!(pallet.category, Category::Cargo);
        assert_eq!(pallet.type_name.as_deref(), Some("Ammo"));

        let tree = enrich(
            &shot,
            &RawEvent::new(KindId::SHOT, SimTime::ZERO).with_initiator("lone-tree"),
            &world,
        );
        let tree = tree.initiator.expect("resolved");
        assert_eq!(tree.category, Category::Scenery);
        assert_eq!(tree.coalition, None);
        assert_eq!(tree.type_name, None);
    }

    #[test]
    fn test_place_resolves_airbase_coalition_when_known() {
        let table = KindTable::standard();
        let mut world = FakeWorld::new();
        world.add_airbase("Batumi", AirbaseEntry::new(Coalition::Blue));

        let land = enrich(
            &def(&table, KindId::LAND),
            &RawEvent::new(KindId::LAND, SimTime::ZERO)
                .with_initiator("viper-1")
                .with_place("Batumi"),
            &world,
        );
        assert_eq!(
            land.place,
            Some(Place::Airbase {
                name: "Batumi".into(),
                coalition: Some(Coalition::Blue),
            })
        );

        let diverted = enrich(
            &def(&table, KindId::LAND),
            &RawEvent::new(KindId::LAND, SimTime::ZERO)
                .with_initiator("viper-1")
                .with_place("Unlisted Strip"),
            &world,
        );
        assert_eq!(
            diverted.place,
            Some(Place::Airbase {
                name: "Unlisted Strip".into(),
                coalition: None,
            }),
            "unknown airbase still carries its name"
        );
    }

    #[test]
    fn test_ejection_landing_place_is_a_ground_spot() {
        let table = KindTable::standard();
        let world = FakeWorld::new();

        let event = enrich(
            &def(&table, KindId::LANDING_AFTER_EJECTION),
            &RawEvent::new(KindId::LANDING_AFTER_EJECTION, SimTime::ZERO)
                .with_initiator("pilot-1")
                .with_place("ridge-east"),
            &world,
        );
        assert_eq!(
            event.place,
            Some(Place::Spot {
                name: "ridge-east".into()
            })
        );
    }

    #[test]
    fn test_cargo_payload_resolves_type_when_world_knows_it() {
        let table = KindTable::standard();
        let mut world = FakeWorld::new();
        world.add_cargo("crate-1", CargoEntry::new("Fuel Drums"));

        let known = enrich(
            &def(&table, KindId::NEW_CARGO),
            &RawEvent::new(KindId::NEW_CARGO, SimTime::ZERO).with_cargo("crate-1"),
            &world,
        );
        assert_eq!(
            known.cargo,
            Some(CargoInfo {
                name: "crate-1".into(),
                type_name: Some("Fuel Drums".into()),
            })
        );

        let gone = enrich(
            &def(&table, KindId::DELETE_CARGO),
            &RawEvent::new(KindId::DELETE_CARGO, SimTime::ZERO).with_cargo("crate-9"),
            &world,
        );
        assert_eq!(
            gone.cargo,
            Some(CargoInfo {
                name: "crate-9".into(),
                type_name: None,
            }),
            "deleted cargo may already be unknown to the world"
        );
    }
}
