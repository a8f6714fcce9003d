//! Errors raised by the storefront domain.
//!
//! Transport and configuration failures have their own types in the app crate.

use thiserror::Error;

use crate::id::ProductId;

pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Input that cannot become part of an order (unknown field, incomplete draft).
    #[error("validation failed: {0}")]
    Validation(String),

    /// The product has no price, so it can never enter a basket.
    #[error("product {0} is not for sale")]
    NotForSale(ProductId),

    /// No product with this id in the current catalog.
    #[error("unknown product {0}")]
    UnknownProduct(ProductId),

    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// An order was requested for an empty basket.
    #[error("basket is empty")]
    EmptyBasket,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
