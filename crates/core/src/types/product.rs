//! Catalog entries, stock levels and cart line items.
//!
//! Field names follow the inventory API's JSON: the image URL travels as
//! `image`, and prices are plain JSON numbers. Cart snapshots written by
//! earlier versions of the storefront use the same shape, so these types
//! read them unchanged.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ProductId;

/// A product as described by the catalog (`GET /products/{id}`).
///
/// This is a [`Product`] without the cart-only `amount` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub id: ProductId,
    pub title: String,
    /// Unit price in the store currency.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Product image URL.
    #[serde(rename = "image")]
    pub image_url: String,
}

/// Available inventory for a product (`GET /stock/{id}`).
///
/// Always fetched on demand; never cached and never stored in the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Stock {
    pub id: ProductId,
    pub amount: u32,
}

impl Stock {
    /// Whether `requested` units can be served from this stock level.
    #[must_use]
    pub const fn covers(&self, requested: u32) -> bool {
        self.amount >= requested
    }
}

/// A cart line item: catalog data plus the quantity in the cart.
///
/// `amount` is always at least 1 for items held in a [`Cart`](super::Cart).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(rename = "image")]
    pub image_url: String,
    pub amount: u32,
}

impl Product {
    /// Build a line item from catalog data.
    #[must_use]
    pub fn from_catalog(catalog: CatalogProduct, amount: u32) -> Self {
        Self {
            id: catalog.id,
            title: catalog.title,
            price: catalog.price,
            image_url: catalog.image_url,
            amount,
        }
    }

    /// Price of the whole line (`price * amount`), or `None` if it
    /// overflows `Decimal`.
    #[must_use]
    pub fn line_total(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.amount))
    }
}
