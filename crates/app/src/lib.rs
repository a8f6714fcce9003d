//! `storefront-app`: application state and event coordination.
//!
//! Views talk to the [`Coordinator`] only through the bus: they emit semantic
//! events (`product:add-to-basket`, `order.address:change`, ...) and re-render
//! from the change events it emits back (`basket:changed`, `formErrors:changed`, ...).
//! Everything is single-threaded; the only asynchronous edge is the [`ShopApi`]
//! transport.

pub mod config;
pub mod context;
pub mod coordinator;
pub mod events;
pub mod transport;

pub use config::{ConfigError, StorefrontConfig};
pub use context::AppContext;
pub use coordinator::Coordinator;
pub use events::{names, BasketItemView, BasketView, FieldChange, Payload, StoreBus};
pub use transport::{HttpShopApi, ShopApi, TransportError};
