//! Integration tests for the RocketShoes cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rocketshoes-integration-tests
//! ```
//!
//! The tests run against [`MockInventory`], an in-process HTTP server
//! speaking the inventory API (`GET /products/{id}`, `GET /stock/{id}`).
//! No external services are needed.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use rocketshoes_cart::InventoryConfig;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::json;

/// Canned response for a product.
#[derive(Debug, Clone)]
enum Entry {
    Product {
        title: String,
        price: Decimal,
        stock: u32,
    },
    /// Every request answers `429` with the given `Retry-After`.
    RateLimited(u64),
    /// Every request answers `500`.
    Broken,
}

#[derive(Default)]
struct MockState {
    entries: Mutex<HashMap<i32, Entry>>,
    product_requests: AtomicUsize,
    stock_requests: AtomicUsize,
    last_authorization: Mutex<Option<String>>,
}

impl MockState {
    fn entry(&self, id: i32) -> Option<Entry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    fn record_auth(&self, headers: &HeaderMap) {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        *self
            .last_authorization
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = auth;
    }
}

/// In-process inventory API server.
///
/// Dropping the handle does not stop the server; it lives until the test
/// runtime shuts down.
#[derive(Clone)]
pub struct MockInventory {
    addr: SocketAddr,
    state: Arc<MockState>,
}

impl MockInventory {
    /// Bind to an ephemeral localhost port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    #[allow(clippy::expect_used)]
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());

        let app = Router::new()
            .route("/products/{id}", get(product))
            .route("/stock/{id}", get(stock))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock inventory");
        let addr = listener
            .local_addr()
            .expect("Failed to read mock inventory address");

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, state }
    }

    /// Base URL of the server, e.g. `http://127.0.0.1:40123`.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Client configuration pointing at this server.
    ///
    /// # Panics
    ///
    /// Panics if the base URL is rejected (never happens for a bound address).
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn config(&self) -> InventoryConfig {
        InventoryConfig::new(&self.base_url()).expect("Mock base URL is valid")
    }

    /// Register a product with its stock level.
    pub fn add_product(&self, id: i32, title: &str, price: Decimal, stock: u32) {
        self.insert(
            id,
            Entry::Product {
                title: title.to_string(),
                price,
                stock,
            },
        );
    }

    /// Change the stock level of a registered product.
    pub fn set_stock(&self, id: i32, amount: u32) {
        let mut entries = self
            .state
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(Entry::Product { stock, .. }) = entries.get_mut(&id) {
            *stock = amount;
        }
    }

    /// Change the title of a registered product.
    pub fn set_title(&self, id: i32, new_title: &str) {
        let mut entries = self
            .state
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(Entry::Product { title, .. }) = entries.get_mut(&id) {
            *title = new_title.to_string();
        }
    }

    /// Make every request for `id` answer `429 Too Many Requests`.
    pub fn rate_limit(&self, id: i32, retry_after: u64) {
        self.insert(id, Entry::RateLimited(retry_after));
    }

    /// Make every request for `id` answer `500 Internal Server Error`.
    pub fn break_product(&self, id: i32) {
        self.insert(id, Entry::Broken);
    }

    /// Number of `GET /products/{id}` requests served.
    #[must_use]
    pub fn product_requests(&self) -> usize {
        self.state.product_requests.load(Ordering::SeqCst)
    }

    /// Number of `GET /stock/{id}` requests served.
    #[must_use]
    pub fn stock_requests(&self) -> usize {
        self.state.stock_requests.load(Ordering::SeqCst)
    }

    /// `Authorization` header of the most recent request.
    #[must_use]
    pub fn last_authorization(&self) -> Option<String> {
        self.state
            .last_authorization
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn insert(&self, id: i32, entry: Entry) {
        self.state
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, entry);
    }
}

async fn product(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(id): Path<i32>,
) -> Response {
    state.product_requests.fetch_add(1, Ordering::SeqCst);
    state.record_auth(&headers);

    match state.entry(id) {
        Some(Entry::Product { title, price, .. }) => Json(json!({
            "id": id,
            "title": title,
            "price": price_value(price),
            "image": format!("https://rocketseat-cdn.s3-sa-east-1.amazonaws.com/modulo-redux/tenis{id}.jpg"),
        }))
        .into_response(),
        other => failure(other),
    }
}

async fn stock(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(id): Path<i32>,
) -> Response {
    state.stock_requests.fetch_add(1, Ordering::SeqCst);
    state.record_auth(&headers);

    match state.entry(id) {
        Some(Entry::Product { stock, .. }) => Json(json!({ "id": id, "amount": stock })).into_response(),
        other => failure(other),
    }
}

fn failure(entry: Option<Entry>) -> Response {
    match entry {
        Some(Entry::RateLimited(retry_after)) => (
            StatusCode::TOO_MANY_REQUESTS,
            [("Retry-After", retry_after.to_string())],
            "slow down",
        )
            .into_response(),
        Some(Entry::Broken) => (StatusCode::INTERNAL_SERVER_ERROR, "inventory exploded").into_response(),
        Some(Entry::Product { .. }) | None => (StatusCode::NOT_FOUND, Json(json!({}))).into_response(),
    }
}

/// Prices travel as plain JSON numbers.
fn price_value(price: Decimal) -> serde_json::Value {
    json!(price.to_f64())
}
