//! Event vocabulary: kinds, raw records, enriched data.
//!
//! This module groups the event **data model**: what a kind is, what the
//! host reports, and what subscribers receive.
//!
//! ## Contents
//! - [`KindId`], [`KindDef`], [`KindTable`] kind classification and metadata
//! - [`RawEvent`], [`MarkPoint`] unresolved records as ingested
//! - [`EventData`], [`Participant`], [`Place`], [`CargoInfo`] resolved form
//!
//! See `dispatch/mod.rs` for how records flow through enrichment and fan-out.

mod data;
mod kind;
mod record;

pub use data::{CargoInfo, Category, EventData, Participant, Place};
pub use kind::{CUSTOM_KIND_START, KindDef, KindId, KindTable, ParticipantRule, SweepDirection};
pub use record::{MarkPoint, RawEvent};
