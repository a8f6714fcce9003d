use serde::Serialize;

use storefront_catalog::{BasketMembership, Product};
use storefront_core::{DomainError, DomainResult, Entity, Price, ProductId};

/// One basket line: a product and the price it had when added.
///
/// A line cannot be built without a price, so the total never has to guess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BasketLine {
    pub product_id: ProductId,
    pub price: Price,
}

/// Products selected for purchase, in first-add order. Each id appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Basket {
    lines: Vec<BasketLine>,
}

impl Basket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a product. Returns `Ok(true)` if the basket changed.
    ///
    /// Adding a product that is already present is a no-op, which keeps the
    /// first-add position. Products without a price are rejected here so that
    /// nothing downstream has to handle them.
    pub fn add(&mut self, product: &Product) -> DomainResult<bool> {
        let Some(price) = product.price() else {
            return Err(DomainError::NotForSale(product.id().clone()));
        };

        if self.contains(product.id()) {
            return Ok(false);
        }

        self.lines.push(BasketLine {
            product_id: product.id().clone(),
            price,
        });
        Ok(true)
    }

    /// Remove a product. Returns `true` if it was present.
    pub fn remove(&mut self, id: &ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| &line.product_id != id);
        self.lines.len() != before
    }

    pub fn contains(&self, id: &ProductId) -> bool {
        self.lines.iter().any(|line| &line.product_id == id)
    }

    pub fn total(&self) -> Price {
        self.lines.iter().map(|line| line.price).sum()
    }

    pub fn ids(&self) -> Vec<ProductId> {
        self.lines.iter().map(|line| line.product_id.clone()).collect()
    }

    pub fn lines(&self) -> &[BasketLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl BasketMembership for Basket {
    fn contains(&self, id: &ProductId) -> bool {
        Basket::contains(self, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_catalog::Category;

    fn product(id: &str, price: Option<u64>) -> Product {
        Product::new(ProductId::new(id), id.to_uppercase(), Category::SoftSkill, price.map(Price::new))
    }

    fn ids(basket: &Basket) -> Vec<String> {
        basket.ids().iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn add_appends_in_first_add_order() {
        let mut basket = Basket::new();
        assert!(basket.add(&product("p1", Some(10))).unwrap());
        assert!(basket.add(&product("p2", Some(20))).unwrap());
        assert_eq!(ids(&basket), vec!["p1", "p2"]);
    }

    #[test]
    fn add_is_idempotent_and_keeps_first_position() {
        let mut basket = Basket::new();
        basket.add(&product("p1", Some(10))).unwrap();
        basket.add(&product("p2", Some(20))).unwrap();

        let changed = basket.add(&product("p1", Some(10))).unwrap();

        assert!(!changed);
        assert_eq!(ids(&basket), vec!["p1", "p2"]);
        assert_eq!(basket.total(), Price::new(30));
    }

    #[test]
    fn unpriced_product_never_enters_the_basket() {
        let mut basket = Basket::new();
        basket.add(&product("p1", Some(100))).unwrap();

        let err = basket.add(&product("p2", None)).unwrap_err();

        match err {
            DomainError::NotForSale(id) if id.as_str() == "p2" => {}
            other => panic!("Expected NotForSale, got {other:?}"),
        }
        assert!(!basket.contains(&ProductId::new("p2")));
        assert_eq!(basket.total(), Price::new(100));
    }

    #[test]
    fn remove_absent_is_a_no_op() {
        let mut basket = Basket::new();
        basket.add(&product("p1", Some(10))).unwrap();
        assert!(!basket.remove(&ProductId::new("missing")));
        assert_eq!(ids(&basket), vec!["p1"]);
    }

    #[test]
    fn remove_middle_preserves_order_and_total() {
        let mut basket = Basket::new();
        basket.add(&product("p1", Some(10))).unwrap();
        basket.add(&product("p2", Some(20))).unwrap();
        basket.add(&product("p3", Some(30))).unwrap();

        assert!(basket.remove(&ProductId::new("p2")));

        assert_eq!(ids(&basket), vec!["p1", "p3"]);
        assert_eq!(basket.total(), Price::new(40));
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Add(u8),
            Remove(u8),
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                (0u8..8).prop_map(Op::Add),
                (0u8..8).prop_map(Op::Remove),
            ]
        }

        /// Even-numbered products carry a price, odd-numbered ones are not for sale.
        fn catalog_product(n: u8) -> Product {
            let price = (n % 2 == 0).then_some(u64::from(n) * 10 + 5);
            product(&format!("p{n}"), price)
        }

        proptest! {
            /// Property: the basket behaves like a first-insertion-ordered set of
            /// priced products, and its total is the sum of member prices.
            #[test]
            fn basket_matches_ordered_set_model(ops in proptest::collection::vec(op(), 0..60)) {
                let mut basket = Basket::new();
                let mut model: Vec<u8> = Vec::new();

                for op in ops {
                    match op {
                        Op::Add(n) => {
                            let result = basket.add(&catalog_product(n));
                            if n % 2 == 1 {
                                prop_assert!(result.is_err());
                            } else if model.contains(&n) {
                                prop_assert_eq!(result, Ok(false));
                            } else {
                                prop_assert_eq!(result, Ok(true));
                                model.push(n);
                            }
                        }
                        Op::Remove(n) => {
                            let was_present = model.contains(&n);
                            prop_assert_eq!(basket.remove(&ProductId::new(format!("p{n}"))), was_present);
                            model.retain(|m| *m != n);
                        }
                    }
                }

                let expected: Vec<String> = model.iter().map(|n| format!("p{n}")).collect();
                prop_assert_eq!(ids(&basket), expected);

                let expected_total: u64 = model.iter().map(|n| u64::from(*n) * 10 + 5).sum();
                prop_assert_eq!(basket.total(), Price::new(expected_total));
                prop_assert!(basket.lines().iter().all(|line| line.price.amount() % 10 == 5));
            }
        }
    }
}
