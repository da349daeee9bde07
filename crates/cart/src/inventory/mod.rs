//! Catalog and stock lookups.
//!
//! # Architecture
//!
//! - [`Inventory`] is the seam the cart depends on; it is generic so tests
//!   can script catalog and stock responses without a network.
//! - [`HttpInventoryClient`] talks to the REST inventory API with `reqwest`.
//!   Catalog entries are cached via `moka`; stock is always fetched live.
//!
//! # Endpoints
//!
//! - `GET /products/{id}` - catalog entry ([`CatalogProduct`])
//! - `GET /stock/{id}` - available stock ([`Stock`])

mod client;

pub use client::HttpInventoryClient;

use std::future::Future;

use rocketshoes_core::{CatalogProduct, ProductId, Stock};
use thiserror::Error;

/// Errors that can occur when querying the inventory API.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API has no record for the product.
    #[error("Not found: product {0}")]
    NotFound(ProductId),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Read-only access to catalog data and live stock levels.
pub trait Inventory: Send + Sync {
    /// Catalog entry for `id`.
    fn fetch_product(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<CatalogProduct, InventoryError>> + Send;

    /// Current stock for `id`.
    fn fetch_stock(&self, id: ProductId)
    -> impl Future<Output = Result<Stock, InventoryError>> + Send;
}
