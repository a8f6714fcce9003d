//! Single-threaded, re-entrant event bus.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::bus::{
    EmitReport, EventBus, Handler, HandlerFailure, HandlerResult, SubscriptionId,
};
use crate::{EventEnvelope, EventMatcher};

struct Subscriber<P> {
    id: SubscriptionId,
    matcher: EventMatcher,
    handler: Handler<P>,
}

/// In-process pub/sub bus.
///
/// - No IO / no async / no threads
/// - Subscription-ordered, depth-first delivery
/// - Matching handlers are resolved when `emit` starts: subscriptions added or
///   removed by a handler take effect from the next emission
pub struct LocalEventBus<P> {
    subscribers: RefCell<Vec<Subscriber<P>>>,
    next_id: Cell<u64>,
    sequence: Cell<u64>,
}

impl<P> LocalEventBus<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a closure; shorthand for wrapping it in a [`Handler`].
    pub fn on<F>(&self, matcher: impl Into<EventMatcher>, handler: F) -> SubscriptionId
    where
        F: Fn(&EventEnvelope<P>) -> HandlerResult + 'static,
    {
        self.subscribe(matcher.into(), Rc::new(handler))
    }

    /// Subscribe to every event.
    pub fn on_all<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&EventEnvelope<P>) -> HandlerResult + 'static,
    {
        self.subscribe(EventMatcher::All, Rc::new(handler))
    }

    /// Remove one subscription by handle.
    pub fn cancel(&self, id: SubscriptionId) -> bool {
        let mut subs = self.subscribers.borrow_mut();
        let before = subs.len();
        subs.retain(|s| s.id != id);
        subs.len() != before
    }

    /// Drop every subscription (teardown).
    pub fn off_all(&self) {
        // Handlers may own state whose drop touches the bus; release the borrow first.
        let dropped = std::mem::take(&mut *self.subscribers.borrow_mut());
        drop(dropped);
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    /// Number of emissions so far (nested ones included).
    pub fn emitted(&self) -> u64 {
        self.sequence.get()
    }

    /// A callback that emits `name` with whatever payload it is given.
    ///
    /// Holds the bus weakly: once the bus is gone the callback delivers nothing.
    pub fn trigger(self: &Rc<Self>, name: impl Into<String>) -> Box<dyn Fn(P) -> EmitReport>
    where
        P: 'static,
    {
        let bus: Weak<Self> = Rc::downgrade(self);
        let name = name.into();
        Box::new(move |payload| match bus.upgrade() {
            Some(bus) => bus.emit(&name, payload),
            None => EmitReport::default(),
        })
    }

    fn next_subscription_id(&self) -> SubscriptionId {
        let raw = self.next_id.get();
        self.next_id.set(raw + 1);
        SubscriptionId::new(raw)
    }
}

impl<P> Default for LocalEventBus<P> {
    fn default() -> Self {
        Self {
            subscribers: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
            sequence: Cell::new(0),
        }
    }
}

impl<P> core::fmt::Debug for LocalEventBus<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LocalEventBus")
            .field("subscribers", &self.subscriber_count())
            .field("emitted", &self.emitted())
            .finish()
    }
}

impl<P> EventBus<P> for LocalEventBus<P> {
    fn subscribe(&self, matcher: EventMatcher, handler: Handler<P>) -> SubscriptionId {
        let id = self.next_subscription_id();
        self.subscribers.borrow_mut().push(Subscriber {
            id,
            matcher,
            handler,
        });
        id
    }

    fn unsubscribe(&self, matcher: &EventMatcher, handler: &Handler<P>) -> bool {
        let mut subs = self.subscribers.borrow_mut();
        let before = subs.len();
        subs.retain(|s| !(s.matcher == *matcher && Rc::ptr_eq(&s.handler, handler)));
        subs.len() != before
    }

    fn emit(&self, name: &str, payload: P) -> EmitReport {
        let sequence_number = self.sequence.get() + 1;
        self.sequence.set(sequence_number);

        // Resolve targets up front and release the borrow: handlers re-enter the bus.
        let targets: Vec<(SubscriptionId, Handler<P>)> = self
            .subscribers
            .borrow()
            .iter()
            .filter(|s| s.matcher.matches(name))
            .map(|s| (s.id, Rc::clone(&s.handler)))
            .collect();

        let envelope = EventEnvelope::new(name, sequence_number, payload);
        let mut report = EmitReport::default();

        for (id, handler) in targets {
            report.delivered += 1;
            if let Err(error) = handler(&envelope) {
                report.failures.push(HandlerFailure {
                    subscription: id,
                    event: name.to_owned(),
                    error,
                });
            }
        }

        report
    }
}
