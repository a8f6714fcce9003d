//! The catalog store.

use std::collections::{HashMap, HashSet};

use storefront_core::{DomainError, DomainResult, Entity, ProductId};

use crate::product::{CatalogEntry, Product};

/// Read access to "is this product in the basket?".
///
/// The catalog only needs membership to derive `in_basket`; the basket itself
/// lives in the orders crate.
pub trait BasketMembership {
    fn contains(&self, id: &ProductId) -> bool;
}

impl BasketMembership for HashSet<ProductId> {
    fn contains(&self, id: &ProductId) -> bool {
        HashSet::contains(self, id)
    }
}

impl BasketMembership for [ProductId] {
    fn contains(&self, id: &ProductId) -> bool {
        self.iter().any(|p| p == id)
    }
}

impl<T: BasketMembership + ?Sized> BasketMembership for &T {
    fn contains(&self, id: &ProductId) -> bool {
        (**self).contains(id)
    }
}

/// Fetched products, in backend order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
    index: HashMap<ProductId, usize>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole product list.
    ///
    /// Shape is the transport's contract; the only repair done here is dropping
    /// repeated ids (the first occurrence wins). Returns how many products were kept.
    pub fn set_catalog(&mut self, products: impl IntoIterator<Item = Product>) -> usize {
        let mut kept = Vec::new();
        let mut index = HashMap::new();

        for product in products {
            if index.contains_key(product.id()) {
                continue;
            }
            index.insert(product.id().clone(), kept.len());
            kept.push(product);
        }

        self.products = kept;
        self.index = index;
        self.products.len()
    }

    pub fn get(&self, id: &ProductId) -> DomainResult<&Product> {
        self.index
            .get(id)
            .map(|&pos| &self.products[pos])
            .ok_or_else(|| DomainError::UnknownProduct(id.clone()))
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Every product with its derived flags, in catalog order.
    pub fn entries(&self, basket: &(impl BasketMembership + ?Sized)) -> Vec<CatalogEntry> {
        self.products
            .iter()
            .map(|p| derive_entry(p, basket))
            .collect()
    }

    pub fn entry(&self, id: &ProductId, basket: &(impl BasketMembership + ?Sized)) -> DomainResult<CatalogEntry> {
        self.get(id).map(|p| derive_entry(p, basket))
    }
}

fn derive_entry(product: &Product, basket: &(impl BasketMembership + ?Sized)) -> CatalogEntry {
    CatalogEntry::derive(product.clone(), basket.contains(product.id()))
}
