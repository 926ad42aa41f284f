//! # Example: mission_events
//!
//! Demonstrates priority-ordered dispatch over a small scripted engagement.
//!
//! Shows how to:
//! - Implement the [`Subscriber`] trait for mission logic.
//! - Subscribe at different priority levels and watch the sweep order flip
//!   between creation and destruction kinds.
//! - Filter a subscription down to one unit.
//! - Observe the mission-end latch swallowing late events.
//!
//! ## Flow
//! ```text
//! RawEvent ──► Dispatcher::dispatch
//!     ├─► enrich against FakeWorld (names become typed participants)
//!     ├─► Birth/Shot/Kill: Core ─► ... ─► Script
//!     ├─► Dead:            Script ─► ... ─► Core
//!     └─► MissionEnd: delivered once, then the feed goes dark
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example mission_events
//! ```

use simvisor::testing::FakeWorld;
use simvisor::{
    Coalition, DispatchCtl, Dispatcher, EventData, HandlerError, KindId, Priority, RawEvent,
    SimTime, Subscriber, SubscriberArena, Subscription, UnitEntry,
};

/// Registry-style subscriber: sees everything first (or last, for
/// destruction kinds) and keeps a running tally.
#[derive(Default)]
struct UnitLedger {
    alive: u32,
}

impl Subscriber for UnitLedger {
    fn on_event(&mut self, event: &EventData, _ctl: &mut DispatchCtl) -> Result<(), HandlerError> {
        match event.kind {
            KindId::BIRTH => self.alive += 1,
            KindId::DEAD => self.alive = self.alive.saturating_sub(1),
            _ => {}
        }
        println!("[ledger]  {:>10} | {} units alive", event.kind_name, self.alive);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "unit-ledger"
    }
}

/// Script-style subscriber: prints the resolved participants.
struct Commentator;

impl Subscriber for Commentator {
    fn on_event(&mut self, event: &EventData, _ctl: &mut DispatchCtl) -> Result<(), HandlerError> {
        let who = event
            .initiator
            .as_ref()
            .map(|p| p.name.as_str())
            .unwrap_or("<environment>");
        let whom = event
            .target
            .as_ref()
            .map(|p| format!(" -> {}", p.name))
            .unwrap_or_default();
        println!("[script]  {:>10} | {}{} at {}", event.kind_name, who, whom, event.time);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "commentator"
    }
}

/// Filtered subscriber: only cares about one airframe.
struct WingmanWatch;

impl Subscriber for WingmanWatch {
    fn on_event(&mut self, event: &EventData, _ctl: &mut DispatchCtl) -> Result<(), HandlerError> {
        println!("[wingman] {:>10} | viper-2 involved", event.kind_name);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "wingman-watch"
    }
}

fn main() {
    let mut dispatcher = Dispatcher::standard();
    let mut subscribers = SubscriberArena::new();

    let mut world = FakeWorld::new();
    world.add_unit(
        "viper-1",
        UnitEntry::new("F-16C", Coalition::Blue).with_group("Viper"),
    );
    world.add_unit(
        "viper-2",
        UnitEntry::new("F-16C", Coalition::Blue).with_group("Viper"),
    );
    world.add_unit("bandit-1", UnitEntry::new("MiG-29", Coalition::Red));

    let ledger = subscribers.insert(Box::new(UnitLedger::default()));
    let commentator = subscribers.insert(Box::new(Commentator));
    let wingman = subscribers.insert(Box::new(WingmanWatch));

    for kind in [KindId::BIRTH, KindId::SHOT, KindId::KILL, KindId::DEAD, KindId::MISSION_END] {
        dispatcher.subscribe(kind, Priority::Core, ledger, Subscription::new());
        dispatcher.subscribe(kind, Priority::Script, commentator, Subscription::new());
    }
    // Only events involving viper-2, initiator or (declared) target side.
    dispatcher.subscribe(
        KindId::KILL,
        Priority::Script,
        wingman,
        Subscription::for_unit("viper-2"),
    );

    // A short engagement, as the host would report it.
    let feed = vec![
        RawEvent::new(KindId::BIRTH, SimTime::from_secs(1.0)).with_initiator("viper-1"),
        RawEvent::new(KindId::BIRTH, SimTime::from_secs(1.2)).with_initiator("viper-2"),
        RawEvent::new(KindId::BIRTH, SimTime::from_secs(4.0)).with_initiator("bandit-1"),
        RawEvent::new(KindId::SHOT, SimTime::from_secs(92.5))
            .with_initiator("bandit-1")
            .with_weapon("R-73"),
        RawEvent::new(KindId::KILL, SimTime::from_secs(96.1))
            .with_initiator("bandit-1")
            .with_target("viper-2")
            .with_weapon("R-73"),
        RawEvent::new(KindId::DEAD, SimTime::from_secs(96.2)).with_initiator("viper-2"),
        RawEvent::new(KindId::MISSION_END, SimTime::from_secs(120.0)),
        // Past the latch: silently dropped.
        RawEvent::new(KindId::SHOT, SimTime::from_secs(121.0)).with_initiator("viper-1"),
    ];

    for raw in feed {
        dispatcher.dispatch(raw, &mut subscribers, &mut world);
    }

    println!("mission ended: {}", dispatcher.mission_ended());
}
