//! # Example: scheduled_patrol
//!
//! Demonstrates jittered repeating tasks driven by a manual timeline.
//!
//! Shows how to:
//! - Arm a repeating task with start delay, jitter, and a stop horizon.
//! - Arm a one-shot reminder.
//! - Tie a task's lifetime to a subscriber, and watch it cancel when the
//!   owner is removed.
//!
//! ## Flow
//! ```text
//! Scheduler::start ──► TestTimeline registration
//!        loop: timeline.next_fire() ──► Scheduler::fire(id)
//!                                          ├─► callback(now)
//!                                          └─► re-arm or retire
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example scheduled_patrol
//! ```

use std::time::Duration;

use simvisor::testing::TestTimeline;
use simvisor::{Continuation, Scheduler, Subscriber, SubscriberArena, TaskSpec};

struct PatrolLeader;
impl Subscriber for PatrolLeader {
    fn name(&self) -> &'static str {
        "patrol-leader"
    }
}

fn main() {
    let mut scheduler = Scheduler::new();
    let mut timeline = TestTimeline::new();
    let mut subscribers = SubscriberArena::new();

    // Radio check every ~60s (plus or minus 20%), for the first five minutes.
    scheduler.start(
        TaskSpec::repeating(Duration::from_secs(60))
            .with_jitter(0.4)
            .with_horizon(Duration::from_secs(300)),
        |now| {
            println!("[{now}] radio check, all stations report");
            Ok(Continuation::Continue)
        },
        &mut timeline,
    );

    // One-shot reminder a minute in.
    scheduler.start(
        TaskSpec::once().with_start_delay(Duration::from_secs(60)),
        |now| {
            println!("[{now}] reminder: push to waypoint two");
            Ok(Continuation::Continue)
        },
        &mut timeline,
    );

    // A task owned by a subscriber that will disappear mid-mission.
    let leader = subscribers.insert(Box::new(PatrolLeader));
    scheduler.start(
        TaskSpec::repeating(Duration::from_secs(45)).with_owner(leader),
        |now| {
            println!("[{now}] leader update");
            Ok(Continuation::Continue)
        },
        &mut timeline,
    );

    let mut fires = 0u32;
    while let Some((at, task)) = timeline.next_fire() {
        // Simulate the leader being despawned two minutes in: the owned
        // task cancels itself on its next fire.
        if at.as_secs() > 120.0 && subscribers.contains(leader) {
            subscribers.remove(leader);
            println!("[{at}] patrol leader despawned");
        }
        scheduler.fire(task, &mut timeline, &subscribers);
        fires += 1;
        if fires > 64 {
            break;
        }
    }

    println!("timeline drained, {} tasks still active", scheduler.active_count());
}
