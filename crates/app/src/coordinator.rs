//! The coordinator: turns view events into store operations and republishes
//! derived state.
//!
//! ## Flow
//!
//! ```text
//! view ──emit──▶ bus ──▶ Coordinator handler ──▶ Catalog / Basket / Checkout
//!                                   │
//!                                   └──emit──▶ bus ──▶ views re-render
//! ```
//!
//! Stores are never touched outside a handler or a transport completion. Every
//! handler releases its state borrow before emitting, so views may emit again
//! from inside their own handlers (nested emissions are delivered depth-first).
//!
//! ## Submissions
//!
//! `contacts:submit` never performs IO itself. It snapshots the order, marks a
//! submission as in flight and queues the request; [`Coordinator::run_pending`]
//! sends it. While a submission is in flight further submit events are ignored,
//! so one checkout produces at most one request.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use storefront_catalog::{Catalog, CatalogEntry};
use storefront_core::{DomainError, Entity, ProductId, SubmissionId};
use storefront_events::{EventBus, EventEnvelope, EventMatcher, HandlerError, HandlerResult, SubscriptionId};
use storefront_orders::{Basket, Checkout, FormField, FormState, OrderResult, OrderSnapshot, Step};

use crate::events::{names, BasketItemView, BasketView, FieldChange, Payload, StoreBus};
use crate::transport::{ShopApi, TransportError};

/// Shown to the user whenever an order could not be placed.
pub const ORDER_FAILED_MESSAGE: &str = "Could not place the order. Please try again.";
/// Shown to the user whenever the catalog could not be loaded.
pub const CATALOG_FAILED_MESSAGE: &str = "Could not load the catalog. Please reload the page.";

#[derive(Debug, Default)]
struct ShopState {
    catalog: Catalog,
    basket: Basket,
    checkout: Checkout,
    preview: Option<ProductId>,
    /// An overlay is displayed; the page behind it must not scroll.
    modal_locked: bool,
    /// Set from the moment a submission is queued until its request resolves.
    submitting: Option<SubmissionId>,
}

#[derive(Debug)]
enum PendingRequest {
    SubmitOrder {
        submission: SubmissionId,
        order: OrderSnapshot,
    },
}

type Route<A> = fn(&Coordinator<A>, &EventEnvelope<Payload>) -> HandlerResult;

/// Each form view and the checkout step its fields belong to.
const FORMS: [(&str, Step); 2] = [
    (names::ORDER_FORM, Step::Payment),
    (names::CONTACTS_FORM, Step::Contacts),
];

fn field_matcher(form: &str) -> EventMatcher {
    EventMatcher::affix(names::field_change_prefix(form), names::FIELD_CHANGE_SUFFIX)
}

/// Owns catalog, basket and checkout state; reacts to view events.
pub struct Coordinator<A> {
    bus: Rc<StoreBus>,
    api: Rc<A>,
    state: RefCell<ShopState>,
    outbox: RefCell<VecDeque<PendingRequest>>,
    subscriptions: RefCell<Vec<SubscriptionId>>,
}

impl<A> Coordinator<A>
where
    A: ShopApi + 'static,
{
    /// Create a coordinator and subscribe it to every view event on `bus`.
    ///
    /// Handlers hold the coordinator weakly; dropping the last `Rc` (or calling
    /// [`Coordinator::detach`]) stops all reactions.
    pub fn install(bus: Rc<StoreBus>, api: Rc<A>) -> Rc<Self> {
        let this = Rc::new(Self {
            bus,
            api,
            state: RefCell::new(ShopState::default()),
            outbox: RefCell::new(VecDeque::new()),
            subscriptions: RefCell::new(Vec::new()),
        });

        this.route(EventMatcher::exact(names::PREVIEW_SELECT), Self::on_preview_select);
        this.route(EventMatcher::exact(names::PRODUCT_ADD_TO_BASKET), Self::on_add_to_basket);
        this.route(EventMatcher::exact(names::PRODUCT_DELETE_FROM_BASKET), Self::on_delete_from_basket);
        this.route(EventMatcher::exact(names::BASKET_OPEN), Self::on_basket_open);
        this.route(EventMatcher::exact(names::ORDER_OPEN), Self::on_order_open);
        for (form, _) in FORMS {
            this.route(field_matcher(form), Self::on_field_change);
        }
        this.route(EventMatcher::exact(names::ORDER_SUBMIT), Self::on_order_submit);
        this.route(EventMatcher::exact(names::CONTACTS_SUBMIT), Self::on_contacts_submit);
        this.route(EventMatcher::exact(names::MODAL_OPEN), Self::on_modal_open);
        this.route(EventMatcher::exact(names::MODAL_CLOSE), Self::on_modal_close);

        this
    }

    fn route(self: &Rc<Self>, matcher: EventMatcher, handler: Route<A>) {
        let weak: Weak<Self> = Rc::downgrade(self);
        let id = self.bus.on(matcher, move |env: &EventEnvelope<Payload>| match weak.upgrade() {
            Some(this) => handler(&this, env),
            None => Ok(()),
        });
        self.subscriptions.borrow_mut().push(id);
    }

    /// Remove every subscription made by [`Coordinator::install`].
    pub fn detach(&self) {
        let ids = std::mem::take(&mut *self.subscriptions.borrow_mut());
        for id in ids {
            self.bus.cancel(id);
        }
    }

    // ---------------------------------------------------------------------
    // Queries (derived state, computed on demand)
    // ---------------------------------------------------------------------

    pub fn catalog_entries(&self) -> Vec<CatalogEntry> {
        let state = self.state.borrow();
        state.catalog.entries(&state.basket)
    }

    pub fn basket_view(&self) -> BasketView {
        let state = self.state.borrow();
        build_basket_view(&state)
    }

    /// Validity and visible errors of one step, without touching any field.
    pub fn form_state(&self, step: Step) -> FormState {
        let state = self.state.borrow();
        FormState {
            step,
            valid: state.checkout.is_step_valid(step),
            errors: state.checkout.errors_for(step),
        }
    }

    pub fn is_page_locked(&self) -> bool {
        self.state.borrow().modal_locked
    }

    pub fn is_submitting(&self) -> bool {
        self.state.borrow().submitting.is_some()
    }

    pub fn pending_requests(&self) -> usize {
        self.outbox.borrow().len()
    }

    // ---------------------------------------------------------------------
    // Transport-driven operations
    // ---------------------------------------------------------------------

    /// Fetch the catalog and publish it. Returns the number of products kept.
    pub async fn load_catalog(&self) -> Result<usize, TransportError> {
        match self.api.fetch_catalog().await {
            Ok(products) => {
                let (count, entries) = {
                    let mut state = self.state.borrow_mut();
                    let count = state.catalog.set_catalog(products);
                    (count, state.catalog.entries(&state.basket))
                };
                tracing::info!(products = count, "catalog loaded");
                self.publish(names::CATALOG_CHANGED, Payload::Catalog(entries));
                self.refresh_preview();
                Ok(count)
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to load catalog");
                self.publish(names::CATALOG_FAILED, Payload::Failure(CATALOG_FAILED_MESSAGE.to_string()));
                Err(e)
            }
        }
    }

    /// Send queued requests, one at a time, until the outbox is empty.
    ///
    /// Returns how many requests were processed.
    pub async fn run_pending(&self) -> usize {
        let mut processed = 0;
        loop {
            // Short borrow: completions emit events whose handlers may queue more work.
            let next = self.outbox.borrow_mut().pop_front();
            let Some(request) = next else {
                break;
            };

            match request {
                PendingRequest::SubmitOrder { submission, order } => {
                    tracing::info!(%submission, items = order.items.len(), total = %order.total, "submitting order");
                    let ordered = order.items.clone();
                    let result = self.api.submit_order(order).await;
                    self.finish_submission(submission, &ordered, result);
                }
            }
            processed += 1;
        }
        processed
    }

    fn finish_submission(
        &self,
        submission: SubmissionId,
        ordered: &[ProductId],
        result: Result<OrderResult, TransportError>,
    ) {
        match result {
            Ok(placed) => {
                let form = {
                    let mut state = self.state.borrow_mut();
                    state.submitting = None;
                    // Items added while the request was in flight were not ordered; keep them.
                    for id in ordered {
                        state.basket.remove(id);
                    }
                    state.checkout.reset();
                    state.checkout.validate_step(Step::Payment)
                };
                tracing::info!(%submission, order_id = %placed.id, total = %placed.total, "order placed");

                self.publish_basket();
                self.refresh_preview();
                self.publish(names::FORM_ERRORS_CHANGED, Payload::Form(form));
                self.publish(names::ORDER_COMPLETED, Payload::Placed(placed));
            }
            Err(e) => {
                // Basket and draft are kept so the user can retry as is.
                self.state.borrow_mut().submitting = None;
                tracing::error!(%submission, error = %e, "order submission failed");
                self.publish(names::ORDER_FAILED, Payload::Failure(ORDER_FAILED_MESSAGE.to_string()));
            }
        }
    }

    // ---------------------------------------------------------------------
    // Handlers
    // ---------------------------------------------------------------------

    fn on_preview_select(&self, env: &EventEnvelope<Payload>) -> HandlerResult {
        let id = product_payload(env)?;
        let entry = {
            let mut state = self.state.borrow_mut();
            let entry = state.catalog.entry(&id, &state.basket);
            if entry.is_ok() {
                state.preview = Some(id.clone());
            }
            entry
        };

        match entry {
            Ok(entry) => self.publish(names::PREVIEW_CHANGED, Payload::Preview(entry)),
            Err(e) => tracing::warn!(product_id = %id, error = %e, "preview of unknown product"),
        }
        Ok(())
    }

    fn on_add_to_basket(&self, env: &EventEnvelope<Payload>) -> HandlerResult {
        let id = product_payload(env)?;
        let added = {
            let mut guard = self.state.borrow_mut();
            let ShopState { catalog, basket, .. } = &mut *guard;
            catalog.get(&id).and_then(|product| basket.add(product))
        };

        match added {
            Ok(true) => {
                tracing::debug!(product_id = %id, "added to basket");
                self.publish_basket();
                self.refresh_preview();
            }
            Ok(false) => tracing::debug!(product_id = %id, "already in basket"),
            Err(DomainError::UnknownProduct(_)) => tracing::warn!(product_id = %id, "cannot add unknown product"),
            Err(e) => tracing::warn!(product_id = %id, error = %e, "rejected add to basket"),
        }
        Ok(())
    }

    fn on_delete_from_basket(&self, env: &EventEnvelope<Payload>) -> HandlerResult {
        let id = product_payload(env)?;
        let outcome = {
            let mut state = self.state.borrow_mut();
            if !state.basket.remove(&id) {
                None
            } else if state.basket.is_empty() {
                // Nothing left to order: the draft goes with the last item.
                state.checkout.reset();
                Some(Some(state.checkout.validate_step(Step::Payment)))
            } else {
                Some(None)
            }
        };

        let Some(reset_form) = outcome else {
            tracing::debug!(product_id = %id, "not in basket; nothing to remove");
            return Ok(());
        };

        self.publish_basket();
        self.refresh_preview();
        if let Some(form) = reset_form {
            self.publish(names::FORM_ERRORS_CHANGED, Payload::Form(form));
        }
        Ok(())
    }

    fn on_basket_open(&self, _env: &EventEnvelope<Payload>) -> HandlerResult {
        self.publish_basket();
        Ok(())
    }

    fn on_order_open(&self, _env: &EventEnvelope<Payload>) -> HandlerResult {
        let form = {
            let mut state = self.state.borrow_mut();
            if state.basket.is_empty() {
                None
            } else {
                Some(state.checkout.validate_step(Step::Payment))
            }
        };

        match form {
            Some(form) => self.publish(names::FORM_ERRORS_CHANGED, Payload::Form(form)),
            None => tracing::warn!("order form opened with an empty basket; ignoring"),
        }
        Ok(())
    }

    fn on_field_change(&self, env: &EventEnvelope<Payload>) -> HandlerResult {
        let Payload::Field(FieldChange { field, value }) = env.payload() else {
            return Err(unexpected_payload(env, "field"));
        };
        let (step, named) = FORMS
            .into_iter()
            .find_map(|(form, step)| {
                field_matcher(form)
                    .captured(env.name())
                    .map(|named| (step, named))
            })
            .ok_or_else(|| HandlerError::new(format!("{}: not a form field event", env.name())))?;
        if named != field.as_str() {
            return Err(HandlerError::new(format!(
                "{}: payload is for field {field:?}",
                env.name()
            )));
        }

        let field: FormField = field
            .parse()
            .map_err(|e: DomainError| HandlerError::new(format!("{}: {e}", env.name())))?;
        if field.step() != step {
            return Err(HandlerError::new(format!(
                "{}: {field} does not belong to this form",
                env.name()
            )));
        }

        let form = self.state.borrow_mut().checkout.set_field(field, value);
        self.publish(names::FORM_ERRORS_CHANGED, Payload::Form(form));
        Ok(())
    }

    fn on_order_submit(&self, _env: &EventEnvelope<Payload>) -> HandlerResult {
        let (advance, form) = {
            let mut state = self.state.borrow_mut();
            if state.checkout.is_step_valid(Step::Payment) {
                (true, state.checkout.validate_step(Step::Contacts))
            } else {
                (false, state.checkout.reveal_step(Step::Payment))
            }
        };

        if advance {
            self.publish(names::CONTACTS_OPEN, Payload::Empty);
        } else {
            tracing::debug!("payment step incomplete; staying on it");
        }
        self.publish(names::FORM_ERRORS_CHANGED, Payload::Form(form));
        Ok(())
    }

    fn on_contacts_submit(&self, _env: &EventEnvelope<Payload>) -> HandlerResult {
        enum Outcome {
            Queued(SubmissionId, OrderSnapshot),
            InFlight(SubmissionId),
            EmptyBasket,
            Blocked(FormState),
        }

        let outcome = {
            let mut state = self.state.borrow_mut();
            if let Some(pending) = state.submitting {
                Outcome::InFlight(pending)
            } else if state.basket.is_empty() {
                Outcome::EmptyBasket
            } else {
                match state.checkout.snapshot(&state.basket) {
                    Ok(order) => {
                        let submission = SubmissionId::new();
                        state.submitting = Some(submission);
                        Outcome::Queued(submission, order)
                    }
                    Err(_) => {
                        let step = if state.checkout.is_step_valid(Step::Payment) {
                            Step::Contacts
                        } else {
                            Step::Payment
                        };
                        Outcome::Blocked(state.checkout.reveal_step(step))
                    }
                }
            }
        };

        match outcome {
            Outcome::Queued(submission, order) => {
                tracing::debug!(%submission, "order queued");
                self.outbox
                    .borrow_mut()
                    .push_back(PendingRequest::SubmitOrder { submission, order });
            }
            Outcome::InFlight(pending) => {
                tracing::debug!(submission = %pending, "submission already in flight; ignoring submit");
            }
            Outcome::EmptyBasket => tracing::warn!("submit with an empty basket; ignoring"),
            Outcome::Blocked(form) => {
                self.publish(names::FORM_ERRORS_CHANGED, Payload::Form(form));
            }
        }
        Ok(())
    }

    fn on_modal_open(&self, _env: &EventEnvelope<Payload>) -> HandlerResult {
        self.set_page_lock(true);
        Ok(())
    }

    fn on_modal_close(&self, _env: &EventEnvelope<Payload>) -> HandlerResult {
        self.state.borrow_mut().preview = None;
        self.set_page_lock(false);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Publishing
    // ---------------------------------------------------------------------

    fn set_page_lock(&self, locked: bool) {
        let changed = {
            let mut state = self.state.borrow_mut();
            let changed = state.modal_locked != locked;
            state.modal_locked = locked;
            changed
        };
        if changed {
            self.publish(names::PAGE_LOCKED, Payload::Locked(locked));
        }
    }

    fn publish_basket(&self) {
        let view = self.basket_view();
        self.publish(names::BASKET_CHANGED, Payload::Basket(view));
    }

    /// Re-derive the open preview so its "in basket" flag follows the basket.
    fn refresh_preview(&self) {
        let entry = {
            let state = self.state.borrow();
            state
                .preview
                .as_ref()
                .and_then(|id| state.catalog.entry(id, &state.basket).ok())
        };
        if let Some(entry) = entry {
            self.publish(names::PREVIEW_CHANGED, Payload::Preview(entry));
        }
    }

    fn publish(&self, name: &str, payload: Payload) {
        let report = self.bus.emit(name, payload);
        for failure in report.failures {
            tracing::warn!(
                event = %failure.event,
                subscription = failure.subscription.get(),
                error = %failure.error,
                "view handler failed"
            );
        }
    }
}

fn build_basket_view(state: &ShopState) -> BasketView {
    let items = state
        .basket
        .lines()
        .iter()
        .enumerate()
        .map(|(n, line)| BasketItemView {
            index: n + 1,
            id: line.product_id.clone(),
            title: state
                .catalog
                .get(&line.product_id)
                .map(|p| p.title().to_string())
                .unwrap_or_else(|_| line.product_id.to_string()),
            price: line.price,
        })
        .collect();

    BasketView {
        items,
        total: state.basket.total(),
    }
}

fn product_payload(env: &EventEnvelope<Payload>) -> Result<ProductId, HandlerError> {
    match env.payload() {
        Payload::Product(id) => Ok(id.clone()),
        Payload::Preview(entry) => Ok(entry.product.id().clone()),
        _ => Err(unexpected_payload(env, "product")),
    }
}

fn unexpected_payload(env: &EventEnvelope<Payload>, expected: &str) -> HandlerError {
    HandlerError::new(format!(
        "{}: expected {expected} payload, got {}",
        env.name(),
        env.payload().kind()
    ))
}

impl<A> core::fmt::Debug for Coordinator<A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Coordinator")
            .field("state", &self.state)
            .field("pending_requests", &self.outbox.borrow().len())
            .finish()
    }
}
