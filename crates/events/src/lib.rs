//! `storefront-events`: the publish/subscribe mediator between state and views.
//!
//! Mechanics only: routing by name or structural pattern, synchronous depth-first
//! delivery, explicit subscription handles. Event names and payload shapes belong
//! to the application crate.

pub mod bus;
pub mod envelope;
pub mod local_bus;
pub mod matcher;

pub use bus::{EmitReport, EventBus, Handler, HandlerError, HandlerFailure, HandlerResult, SubscriptionId};
pub use envelope::EventEnvelope;
pub use local_bus::LocalEventBus;
pub use matcher::EventMatcher;
