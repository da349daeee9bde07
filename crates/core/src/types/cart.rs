//! The shopping cart.
//!
//! A [`Cart`] is an ordered list of line items, unique by product ID. It is
//! an immutable value as far as callers are concerned: the transition
//! helpers (`with_added`, `without`, `with_amount`) return a new cart and
//! leave `self` untouched, so a rejected or failed commit never has to undo
//! anything.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{CatalogProduct, Product, ProductId};

/// Ordered, ID-unique collection of cart line items.
///
/// Serializes as a bare JSON array of [`Product`]s, which is the persisted
/// snapshot format. Deserializing rejects arrays that repeat a product or
/// hold a zero amount.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Product>", into = "Vec<Product>")]
pub struct Cart(Vec<Product>);

/// Line items that do not form a valid cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidCart {
    #[error("product {0} appears more than once")]
    DuplicateProduct(ProductId),

    #[error("product {0} has amount 0")]
    ZeroAmount(ProductId),
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Iterate over line items in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Product> {
        self.0.iter()
    }

    /// Look up the line item for a product.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.0.iter().find(|item| item.id == id)
    }

    /// Whether the cart holds a line item for `id`.
    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Number of distinct line items (the header badge count).
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the cart has no line items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all line item amounts.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.0.iter().map(|item| u64::from(item.amount)).sum()
    }

    /// Sum of `price * amount` over all line items, or `None` if it
    /// overflows `Decimal`.
    #[must_use]
    pub fn subtotal(&self) -> Option<Decimal> {
        self.0
            .iter()
            .try_fold(Decimal::ZERO, |total, item| total.checked_add(item.line_total()?))
    }

    /// Amount the cart would hold for `id` after one more unit is added.
    #[must_use]
    pub fn amount_after_add(&self, id: ProductId) -> u32 {
        self.get(id)
            .map_or(1, |item| item.amount.saturating_add(1))
    }

    /// Cart with one more unit of `product`.
    ///
    /// An existing line item keeps its position and catalog fields and has
    /// its amount incremented; otherwise a new line item with amount 1 is
    /// appended.
    #[must_use]
    pub fn with_added(&self, product: CatalogProduct) -> Self {
        if self.contains(product.id) {
            return Self(
                self.0
                    .iter()
                    .map(|item| {
                        if item.id == product.id {
                            Product {
                                amount: item.amount.saturating_add(1),
                                ..item.clone()
                            }
                        } else {
                            item.clone()
                        }
                    })
                    .collect(),
            );
        }

        let mut items = self.0.clone();
        items.push(Product::from_catalog(product, 1));
        Self(items)
    }

    /// Cart without the line item for `id`, or `None` if there is none.
    #[must_use]
    pub fn without(&self, id: ProductId) -> Option<Self> {
        if !self.contains(id) {
            return None;
        }
        Some(Self(
            self.0.iter().filter(|item| item.id != id).cloned().collect(),
        ))
    }

    /// Cart with the line item for `id` set to `amount`, or `None` if there
    /// is no such line item.
    #[must_use]
    pub fn with_amount(&self, id: ProductId, amount: u32) -> Option<Self> {
        if !self.contains(id) {
            return None;
        }
        Some(Self(
            self.0
                .iter()
                .map(|item| {
                    if item.id == id {
                        Product {
                            amount,
                            ..item.clone()
                        }
                    } else {
                        item.clone()
                    }
                })
                .collect(),
        ))
    }
}

impl TryFrom<Vec<Product>> for Cart {
    type Error = InvalidCart;

    fn try_from(items: Vec<Product>) -> Result<Self, Self::Error> {
        let mut seen = BTreeSet::new();
        for item in &items {
            if item.amount == 0 {
                return Err(InvalidCart::ZeroAmount(item.id));
            }
            if !seen.insert(item.id) {
                return Err(InvalidCart::DuplicateProduct(item.id));
            }
        }
        Ok(Self(items))
    }
}

impl From<Cart> for Vec<Product> {
    fn from(cart: Cart) -> Self {
        cart.0
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a Product;
    type IntoIter = std::slice::Iter<'a, Product>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
