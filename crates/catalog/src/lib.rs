//! Catalog domain module.
//!
//! Holds the fetched product list and derives per-product view flags from it.
//! The catalog is read-only from the UI's perspective: it is replaced wholesale
//! on every fetch, never patched.

pub mod product;
pub mod store;

pub use product::{CatalogEntry, Category, Product};
pub use store::{BasketMembership, Catalog};
