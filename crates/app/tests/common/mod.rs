#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use storefront_app::{AppContext, Payload, ShopApi, StorefrontConfig, TransportError};
use storefront_catalog::{Category, Product};
use storefront_core::{OrderId, Price, ProductId};
use storefront_events::EventBus;
use storefront_orders::{FormState, OrderResult, OrderSnapshot};
use tokio::sync::Notify;
use tracing_subscriber::EnvFilter;

/// In-memory backend. Clones share state so a test keeps a handle after moving
/// one copy into the context.
#[derive(Clone, Default)]
pub struct FakeShop {
    inner: Rc<FakeInner>,
}

#[derive(Default)]
struct FakeInner {
    products: RefCell<Vec<Product>>,
    catalog_down: Cell<bool>,
    orders_down: Cell<bool>,
    gate: RefCell<Option<Rc<Notify>>>,
    submitted: RefCell<Vec<OrderSnapshot>>,
}

impl FakeShop {
    pub fn with_products(products: Vec<Product>) -> Self {
        let shop = Self::default();
        *shop.inner.products.borrow_mut() = products;
        shop
    }

    pub fn fail_catalog(&self) {
        self.inner.catalog_down.set(true);
    }

    pub fn fail_orders(&self, down: bool) {
        self.inner.orders_down.set(down);
    }

    /// Hold every order request until the returned gate is notified.
    pub fn gate_orders(&self) -> Rc<Notify> {
        let gate = Rc::new(Notify::new());
        *self.inner.gate.borrow_mut() = Some(Rc::clone(&gate));
        gate
    }

    pub fn submitted(&self) -> Vec<OrderSnapshot> {
        self.inner.submitted.borrow().clone()
    }
}

impl ShopApi for FakeShop {
    async fn fetch_catalog(&self) -> Result<Vec<Product>, TransportError> {
        if self.inner.catalog_down.get() {
            return Err(TransportError::Network("connection refused".into()));
        }
        Ok(self.inner.products.borrow().clone())
    }

    async fn submit_order(&self, order: OrderSnapshot) -> Result<OrderResult, TransportError> {
        let total = order.total;
        self.inner.submitted.borrow_mut().push(order);

        let gate = self.inner.gate.borrow().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if self.inner.orders_down.get() {
            return Err(TransportError::Api(500, "internal error".into()));
        }
        let n = self.inner.submitted.borrow().len();
        Ok(OrderResult {
            id: OrderId::new(format!("order-{n}")),
            total,
        })
    }
}

pub fn product(id: &str, price: Option<u64>) -> Product {
    Product::new(
        ProductId::new(id),
        format!("Product {id}"),
        Category::Other,
        price.map(Price::new),
    )
}

/// P1 (100), P2 (not for sale), P3 (30).
pub fn sample_catalog() -> Vec<Product> {
    vec![
        product("p1", Some(100)),
        product("p2", None),
        product("p3", Some(30)),
    ]
}

/// Every event emitted on the bus, in order.
#[derive(Clone, Default)]
pub struct EventLog(Rc<RefCell<Vec<(String, Payload)>>>);

impl EventLog {
    pub fn attach(ctx: &AppContext<FakeShop>) -> Self {
        let log = Self::default();
        let sink = log.clone();
        ctx.bus().on_all(move |env| {
            sink.0
                .borrow_mut()
                .push((env.name().to_string(), env.payload().clone()));
            Ok(())
        });
        log
    }

    pub fn names(&self) -> Vec<String> {
        self.0.borrow().iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn count(&self, name: &str) -> usize {
        self.0.borrow().iter().filter(|(n, _)| n == name).count()
    }

    pub fn last(&self, name: &str) -> Option<Payload> {
        self.0
            .borrow()
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, payload)| payload.clone())
    }

    pub fn last_form(&self) -> FormState {
        match self.last(storefront_app::names::FORM_ERRORS_CHANGED) {
            Some(Payload::Form(state)) => state,
            other => panic!("Expected a form state, got {other:?}"),
        }
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

/// Route coordinator logs to the test harness (shown with `--nocapture`).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("storefront_app=debug"))
        .with_test_writer()
        .try_init();
}

/// Built-in local defaults; nothing in these tests talks to them.
pub fn config() -> StorefrontConfig {
    StorefrontConfig::from_lookup(|_| None).expect("default config is valid")
}

pub fn start(shop: FakeShop) -> AppContext<FakeShop> {
    init_tracing();
    AppContext::start(config(), shop)
}

/// A started context with the sample catalog loaded and a fresh event log.
pub async fn loaded_shop() -> (AppContext<FakeShop>, FakeShop, EventLog) {
    let shop = FakeShop::with_products(sample_catalog());
    let ctx = start(shop.clone());
    ctx.coordinator()
        .load_catalog()
        .await
        .expect("fake catalog loads");
    let log = EventLog::attach(&ctx);
    (ctx, shop, log)
}

pub fn emit(ctx: &AppContext<FakeShop>, name: &str, payload: Payload) {
    let report = ctx.bus().emit(name, payload);
    assert!(report.is_clean(), "handlers failed for {name}: {:?}", report.failures);
}

pub fn change(ctx: &AppContext<FakeShop>, form: &str, field: &str, value: &str) {
    let name = storefront_app::names::field_change(form, field);
    emit(ctx, &name, Payload::field(field, value));
}
