//! Error types used by the dispatch and scheduling core.
//!
//! This module defines four error enums:
//!
//! - [`HandlerError`] — failures returned by subscriber handlers and
//!   scheduled callbacks.
//! - [`InvokeError`] — outcome of one fault-isolated invocation (a returned
//!   error or a caught panic).
//! - [`RegisterError`] — custom event-kind registration failures.
//! - [`PublishError`] — contract violations rejected by
//!   [`Dispatcher::publish`](crate::Dispatcher::publish).
//!
//! All types provide `as_label()` for short stable log/metric labels.

use std::any::Any;

use thiserror::Error;

use crate::events::KindId;

/// # Errors produced by subscriber handlers and scheduled callbacks.
///
/// Returned from [`Subscriber::on_event`](crate::Subscriber::on_event),
/// explicit subscription handlers, and scheduler callbacks. The engine logs
/// the error and carries on; for scheduled tasks it also cancels the task.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum HandlerError {
    /// Handler gave up on this event or tick.
    #[error("{reason}")]
    Failed {
        /// Human-readable failure description.
        reason: String,
    },

    /// A typed handler was attached to a subscriber of a different concrete type.
    #[error("subscriber is not a `{expected}`")]
    TypeMismatch {
        /// The concrete type the handler expected.
        expected: &'static str,
    },
}

impl HandlerError {
    /// Creates a [`HandlerError::Failed`] from any message.
    pub fn failed(reason: impl Into<String>) -> Self {
        HandlerError::Failed {
            reason: reason.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            HandlerError::Failed { .. } => "handler_failed",
            HandlerError::TypeMismatch { .. } => "handler_type_mismatch",
        }
    }
}

/// # Outcome of one fault-isolated invocation.
///
/// Every subscriber invocation and scheduled callback runs under
/// `catch_unwind`; this type carries either the error the callee returned or
/// the payload of a caught panic. The dispatch and fire loops log it and
/// continue; it never propagates.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum InvokeError {
    /// The callee returned an error.
    #[error(transparent)]
    Failed(#[from] HandlerError),

    /// The callee panicked; the payload was downcast to a message where possible.
    #[error("panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },
}

impl InvokeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            InvokeError::Failed(err) => err.as_label(),
            InvokeError::Panicked { .. } => "handler_panicked",
        }
    }
}

/// # Custom event-kind registration failures.
///
/// Registration never mutates the kind table on failure, so a rejected call
/// can simply be retried with a different name or id.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RegisterError {
    /// A kind with this name already exists.
    #[error("event kind name {name:?} is already registered")]
    DuplicateName {
        /// The rejected name.
        name: String,
    },

    /// The explicitly requested id is already in use.
    #[error("event kind id {id} is already in use")]
    IdTaken {
        /// The rejected id.
        id: KindId,
    },
}

impl RegisterError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RegisterError::DuplicateName { .. } => "kind_duplicate_name",
            RegisterError::IdTaken { .. } => "kind_id_taken",
        }
    }
}

/// # Contract violations rejected by `publish`.
///
/// Unlike host-originated dispatch, which drops malformed events silently,
/// scripted publication fails fast before any dispatch work happens.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum PublishError {
    /// The kind id is not present in the kind table.
    #[error("unknown event kind {id}")]
    UnknownKind {
        /// The unrecognized id.
        id: KindId,
    },

    /// The kind requires an initiator and the event carries none.
    #[error("kind {kind:?} requires an initiator")]
    MissingInitiator {
        /// Name of the offended kind.
        kind: String,
    },

    /// The kind requires a target and the event carries none.
    #[error("kind {kind:?} requires a target")]
    MissingTarget {
        /// Name of the offended kind.
        kind: String,
    },
}

impl PublishError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            PublishError::UnknownKind { .. } => "publish_unknown_kind",
            PublishError::MissingInitiator { .. } => "publish_missing_initiator",
            PublishError::MissingTarget { .. } => "publish_missing_target",
        }
    }
}

/// Renders a `catch_unwind` payload as text for logging.
pub(crate) fn panic_info(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
