//! Event publishing/subscription abstraction (mechanics only).
//!
//! ## Delivery model
//!
//! - **Synchronous**: `emit` returns after every matching handler ran.
//! - **Ordered**: handlers run in subscription order.
//! - **Depth-first**: a handler may emit; the nested emission is fully delivered
//!   before the outer emission moves on to its next handler.
//! - **No persistence**: a subscriber added after an emission never sees it.
//! - **Dumb router**: payloads are passed through as-is, never validated.
//!
//! Handler failures do not stop delivery. The bus neither logs nor drops them:
//! they come back to the emitter in an [`EmitReport`].

use std::rc::Rc;

use thiserror::Error;

use crate::{EventEnvelope, EventMatcher};

/// Failure returned by a handler.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct HandlerError(String);

impl HandlerError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

pub type HandlerResult = Result<(), HandlerError>;

/// A subscribed callback.
///
/// Shared (`Rc`) so the same handler value can later be passed to
/// [`EventBus::unsubscribe`], which compares handlers by identity.
pub type Handler<P> = Rc<dyn Fn(&EventEnvelope<P>) -> HandlerResult>;

/// Handle of a single subscription.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

/// A handler failure observed during one emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerFailure {
    pub subscription: SubscriptionId,
    pub event: String,
    pub error: HandlerError,
}

/// What happened during one `emit` call (nested emissions report separately).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmitReport {
    /// Number of handlers invoked.
    pub delivered: usize,
    pub failures: Vec<HandlerFailure>,
}

impl EmitReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// `true` when no handler matched the event.
    pub fn is_unheard(&self) -> bool {
        self.delivered == 0
    }
}

/// Publish/subscribe mediator.
///
/// Not `Send`/`Sync`: the storefront is single-threaded and handlers capture
/// `Rc` state.
pub trait EventBus<P> {
    /// Register `handler` for every event name `matcher` accepts.
    fn subscribe(&self, matcher: EventMatcher, handler: Handler<P>) -> SubscriptionId;

    /// Remove the subscription(s) registered with this exact matcher and this
    /// handler instance. Returns whether anything was removed.
    fn unsubscribe(&self, matcher: &EventMatcher, handler: &Handler<P>) -> bool;

    /// Deliver `payload` to every matching handler.
    fn emit(&self, name: &str, payload: P) -> EmitReport;
}

impl<P, B> EventBus<P> for Rc<B>
where
    B: EventBus<P> + ?Sized,
{
    fn subscribe(&self, matcher: EventMatcher, handler: Handler<P>) -> SubscriptionId {
        (**self).subscribe(matcher, handler)
    }

    fn unsubscribe(&self, matcher: &EventMatcher, handler: &Handler<P>) -> bool {
        (**self).unsubscribe(matcher, handler)
    }

    fn emit(&self, name: &str, payload: P) -> EmitReport {
        (**self).emit(name, payload)
    }
}
