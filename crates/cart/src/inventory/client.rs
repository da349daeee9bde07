//! REST client for the inventory API.
//!
//! Uses `reqwest` for HTTP and caches catalog entries using `moka`.

use std::sync::Arc;

use moka::future::Cache;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use rocketshoes_core::{CatalogProduct, ProductId, Stock};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::{Inventory, InventoryError};
use crate::config::InventoryConfig;

/// Maximum number of catalog entries kept in the cache.
const CATALOG_CACHE_CAPACITY: u64 = 1000;

/// Client for the inventory REST API.
///
/// Catalog entries are cached for the configured TTL. Stock levels are
/// never cached.
#[derive(Clone)]
pub struct HttpInventoryClient {
    inner: Arc<HttpInventoryClientInner>,
}

struct HttpInventoryClientInner {
    client: reqwest::Client,
    base_url: Url,
    catalog: Cache<ProductId, CatalogProduct>,
}

impl HttpInventoryClient {
    /// Create a new inventory API client.
    ///
    /// # Errors
    ///
    /// Returns error if the API token is not a valid header value or the
    /// HTTP client fails to build.
    pub fn new(config: &InventoryConfig) -> Result<Self, InventoryError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = &config.api_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| InventoryError::Parse(format!("Invalid API token format: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        let catalog = Cache::builder()
            .max_capacity(CATALOG_CACHE_CAPACITY)
            .time_to_live(config.catalog_cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(HttpInventoryClientInner {
                client,
                base_url: config.base_url.clone(),
                catalog,
            }),
        })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Drop every cached catalog entry.
    pub fn invalidate_catalog(&self) {
        self.inner.catalog.invalidate_all();
    }

    /// Execute a GET request for a product-scoped resource.
    async fn get<T: DeserializeOwned>(&self, path: &str, id: ProductId) -> Result<T, InventoryError> {
        let url = self
            .inner
            .base_url
            .join(path)
            .map_err(|e| InventoryError::Parse(format!("Invalid request path {path}: {e}")))?;

        let response = self.inner.client.get(url).send().await?;
        handle_response(response, id).await
    }
}

impl Inventory for HttpInventoryClient {
    #[instrument(skip_all, fields(product_id = %id))]
    async fn fetch_product(&self, id: ProductId) -> Result<CatalogProduct, InventoryError> {
        if let Some(product) = self.inner.catalog.get(&id).await {
            debug!("Catalog cache hit");
            return Ok(product);
        }

        let product: CatalogProduct = self.get(&format!("products/{id}"), id).await?;
        if product.id != id {
            return Err(InventoryError::Parse(format!(
                "Requested product {id}, API returned product {}",
                product.id
            )));
        }

        self.inner.catalog.insert(id, product.clone()).await;
        Ok(product)
    }

    #[instrument(skip_all, fields(product_id = %id))]
    async fn fetch_stock(&self, id: ProductId) -> Result<Stock, InventoryError> {
        let stock: Stock = self.get(&format!("stock/{id}"), id).await?;
        if stock.id != id {
            return Err(InventoryError::Parse(format!(
                "Requested stock for product {id}, API returned product {}",
                stock.id
            )));
        }

        debug!(available = stock.amount, "Stock fetched");
        Ok(stock)
    }
}

/// Handle API response and parse JSON.
async fn handle_response<T: DeserializeOwned>(
    response: reqwest::Response,
    id: ProductId,
) -> Result<T, InventoryError> {
    let status = response.status();

    if status.is_success() {
        return response
            .json()
            .await
            .map_err(|e| InventoryError::Parse(format!("Failed to parse response: {e}")));
    }

    Err(parse_error(response, id).await)
}

/// Parse error response from the inventory API.
async fn parse_error(response: reqwest::Response, id: ProductId) -> InventoryError {
    let status = response.status().as_u16();

    // Check for rate limiting
    if status == 429 {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(1);
        return InventoryError::RateLimited(retry_after);
    }

    if status == 404 {
        return InventoryError::NotFound(id);
    }

    let message = response
        .text()
        .await
        .map(|body| body.chars().take(200).collect())
        .unwrap_or_else(|_| "Unknown error".to_string());

    InventoryError::Api { status, message }
}

impl std::fmt::Debug for HttpInventoryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpInventoryClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("cached_products", &self.inner.catalog.entry_count())
            .finish_non_exhaustive()
    }
}
