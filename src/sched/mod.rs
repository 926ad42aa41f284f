//! # Simulation-time task scheduling.
//!
//! This module provides the [`Scheduler`] and the [`TaskSpec`] bundle that
//! configures each task (start delay, interval, jitter, horizon, owner).
//!
//! The scheduler holds no clock of its own: the host implements
//! [`Timeline`](crate::host::Timeline) and calls back
//! [`Scheduler::fire`] when a registration comes due. Tests drive it with
//! [`TestTimeline`](crate::testing::TestTimeline).

mod scheduler;
mod task;

pub use scheduler::{FIRE_EPSILON, Scheduler};
pub use task::{Continuation, TaskCallback, TaskId, TaskSpec};
