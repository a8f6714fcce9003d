//! Event names and payloads exchanged between views and the coordinator.

use serde::Serialize;

use storefront_catalog::CatalogEntry;
use storefront_core::{Price, ProductId};
use storefront_events::LocalEventBus;
use storefront_orders::{FormState, OrderResult};

/// The bus every storefront component shares.
pub type StoreBus = LocalEventBus<Payload>;

pub mod names {
    //! View → coordinator events.

    pub const PREVIEW_SELECT: &str = "preview:select";
    pub const PRODUCT_ADD_TO_BASKET: &str = "product:add-to-basket";
    pub const PRODUCT_DELETE_FROM_BASKET: &str = "product:delete-from-basket";
    pub const BASKET_OPEN: &str = "basket:open";
    pub const ORDER_OPEN: &str = "order:open";
    pub const ORDER_SUBMIT: &str = "order:submit";
    pub const CONTACTS_SUBMIT: &str = "contacts:submit";
    pub const MODAL_OPEN: &str = "modal:open";
    pub const MODAL_CLOSE: &str = "modal:close";

    /// Form names used as field-change prefixes: `order.<field>:change`.
    pub const ORDER_FORM: &str = "order";
    pub const CONTACTS_FORM: &str = "contacts";
    pub const FIELD_CHANGE_SUFFIX: &str = ":change";

    // Coordinator → view events.

    pub const CATALOG_CHANGED: &str = "catalog:changed";
    pub const CATALOG_FAILED: &str = "catalog:failed";
    pub const PREVIEW_CHANGED: &str = "preview:changed";
    pub const BASKET_CHANGED: &str = "basket:changed";
    pub const FORM_ERRORS_CHANGED: &str = "formErrors:changed";
    pub const CONTACTS_OPEN: &str = "contacts:open";
    pub const ORDER_COMPLETED: &str = "order:completed";
    pub const ORDER_FAILED: &str = "order:failed";
    pub const PAGE_LOCKED: &str = "page:locked";

    /// `"order.address:change"` for `("order", "address")`.
    pub fn field_change(form: &str, field: &str) -> String {
        format!("{form}.{field}{FIELD_CHANGE_SUFFIX}")
    }

    /// Prefix shared by every field-change event of `form`.
    pub fn field_change_prefix(form: &str) -> String {
        format!("{form}.")
    }
}

/// A form input changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldChange {
    pub field: String,
    pub value: String,
}

impl FieldChange {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// One rendered basket row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BasketItemView {
    /// 1-based row number.
    pub index: usize,
    pub id: ProductId,
    pub title: String,
    pub price: Price,
}

/// Everything the basket view and the header counter need.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BasketView {
    pub items: Vec<BasketItemView>,
    pub total: Price,
}

impl BasketView {
    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn ids(&self) -> Vec<ProductId> {
        self.items.iter().map(|item| item.id.clone()).collect()
    }
}

/// Bus payload. The bus never looks inside; each event name documents which
/// variant it carries.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Payload {
    Empty,
    Product(ProductId),
    Field(FieldChange),
    Catalog(Vec<CatalogEntry>),
    Preview(CatalogEntry),
    Basket(BasketView),
    Form(FormState),
    Placed(OrderResult),
    Failure(String),
    Locked(bool),
}

impl Payload {
    pub fn product(id: impl Into<ProductId>) -> Self {
        Payload::Product(id.into())
    }

    pub fn field(field: impl Into<String>, value: impl Into<String>) -> Self {
        Payload::Field(FieldChange::new(field, value))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Empty => "empty",
            Payload::Product(_) => "product",
            Payload::Field(_) => "field",
            Payload::Catalog(_) => "catalog",
            Payload::Preview(_) => "preview",
            Payload::Basket(_) => "basket",
            Payload::Form(_) => "form",
            Payload::Placed(_) => "placed",
            Payload::Failure(_) => "failure",
            Payload::Locked(_) => "locked",
        }
    }
}
