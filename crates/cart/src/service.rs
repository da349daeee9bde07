//! The cart state machine.
//!
//! [`CartService`] owns the in-memory cart. It is built once at startup and
//! cloned into every consumer that needs to read or change the cart.
//!
//! Each operation runs under an async mutex from the first read of the cart
//! until its commit, inventory fetches included, so two callers can never
//! both pass a stock check against the same stale amount.
//!
//! Commit order is "persist, then publish": the candidate cart is written to
//! the snapshot first, and only becomes the in-memory cart once that write
//! succeeded. A failed write leaves memory untouched.

use std::sync::Arc;

use rocketshoes_core::{Cart, ProductId, Stock};
use tokio::sync::{Mutex, watch};
use tracing::{error, info, instrument, warn};

use crate::error::{CartError, Operation, Result};
use crate::inventory::Inventory;
use crate::notify::Notifier;
use crate::storage::{KeyValueStore, SnapshotStore};

/// Arguments of [`CartService::update_product_amount`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateProductAmount {
    pub product_id: ProductId,
    pub amount: u32,
}

/// Handle to the cart state.
///
/// Cheaply cloneable; all clones share the same cart.
pub struct CartService<I, S, N> {
    inner: Arc<CartServiceInner<I, S, N>>,
}

struct CartServiceInner<I, S, N> {
    inventory: I,
    store: SnapshotStore<S>,
    notifier: N,
    /// Current cart. Held for the whole duration of an operation.
    cart: Mutex<Cart>,
    /// Last committed cart, for readers and subscribers.
    updates: watch::Sender<Cart>,
}

impl<I, S, N> Clone for CartService<I, S, N> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<I, S, N> CartService<I, S, N>
where
    I: Inventory,
    S: KeyValueStore,
    N: Notifier,
{
    /// Create the service, restoring the cart from the persisted snapshot.
    pub fn new(inventory: I, store: SnapshotStore<S>, notifier: N) -> Self {
        let cart = store.load();
        info!(items = cart.len(), "Cart restored");

        let (updates, _) = watch::channel(cart.clone());

        Self {
            inner: Arc::new(CartServiceInner {
                inventory,
                store,
                notifier,
                cart: Mutex::new(cart),
                updates,
            }),
        }
    }

    /// The last committed cart.
    ///
    /// Does not wait for an in-flight operation.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.inner.updates.borrow().clone()
    }

    /// Observe every committed cart.
    ///
    /// The receiver starts out holding the current cart; failed operations
    /// publish nothing.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.inner.updates.subscribe()
    }

    /// Inventory client used for catalog and stock lookups.
    pub fn inventory(&self) -> &I {
        &self.inner.inventory
    }

    /// Snapshot store the cart is persisted to.
    pub fn store(&self) -> &SnapshotStore<S> {
        &self.inner.store
    }

    /// Notifier failures are reported to.
    pub fn notifier(&self) -> &N {
        &self.inner.notifier
    }

    /// Add one unit of a product.
    ///
    /// Appends a new line item with amount 1, or increments the existing
    /// line item in place, provided stock covers the new amount.
    ///
    /// # Errors
    ///
    /// - `CartError::Fetch` if the catalog entry or stock cannot be fetched
    /// - `CartError::OutOfStock` if stock does not cover the new amount
    /// - `CartError::Persistence` if the new cart cannot be saved
    #[instrument(skip_all, fields(product_id = %product_id))]
    pub async fn add_product(&self, product_id: ProductId) -> Result<Cart> {
        let mut cart = self.inner.cart.lock().await;
        let next = self.next_after_add(&cart, product_id).await;
        self.finish(Operation::Add, &mut cart, next)
    }

    /// Remove a product's line item.
    ///
    /// # Errors
    ///
    /// - `CartError::NotFound` if the product is not in the cart
    /// - `CartError::Persistence` if the new cart cannot be saved
    #[instrument(skip_all, fields(product_id = %product_id))]
    pub async fn remove_product(&self, product_id: ProductId) -> Result<Cart> {
        let mut cart = self.inner.cart.lock().await;
        let next = cart
            .without(product_id)
            .ok_or(CartError::NotFound(product_id));
        self.finish(Operation::Remove, &mut cart, next)
    }

    /// Set a line item's amount, re-validated against current stock.
    ///
    /// # Errors
    ///
    /// - `CartError::InvalidAmount` if `amount` is below 1
    /// - `CartError::NotFound` if the product is not in the cart
    /// - `CartError::Fetch` if stock cannot be fetched
    /// - `CartError::OutOfStock` if stock does not cover `amount`
    /// - `CartError::Persistence` if the new cart cannot be saved
    #[instrument(skip_all, fields(product_id = %request.product_id, amount = request.amount))]
    pub async fn update_product_amount(&self, request: UpdateProductAmount) -> Result<Cart> {
        let mut cart = self.inner.cart.lock().await;
        let next = self.next_after_update(&cart, request).await;
        self.finish(Operation::Update, &mut cart, next)
    }

    async fn next_after_add(&self, cart: &Cart, product_id: ProductId) -> Result<Cart> {
        let product = self.inner.inventory.fetch_product(product_id).await?;
        let requested = cart.amount_after_add(product_id);

        let stock = self.inner.inventory.fetch_stock(product_id).await?;
        ensure_in_stock(stock, product_id, requested)?;

        Ok(cart.with_added(product))
    }

    async fn next_after_update(&self, cart: &Cart, request: UpdateProductAmount) -> Result<Cart> {
        let UpdateProductAmount { product_id, amount } = request;

        if amount < 1 {
            return Err(CartError::InvalidAmount(amount));
        }
        if !cart.contains(product_id) {
            return Err(CartError::NotFound(product_id));
        }

        let stock = self.inner.inventory.fetch_stock(product_id).await?;
        ensure_in_stock(stock, product_id, amount)?;

        cart.with_amount(product_id, amount)
            .ok_or(CartError::NotFound(product_id))
    }

    /// Commit `next` or report why the operation failed.
    fn finish(&self, operation: Operation, cart: &mut Cart, next: Result<Cart>) -> Result<Cart> {
        let result = next.and_then(|next| self.commit(cart, next));

        match &result {
            Ok(committed) => info!(
                %operation,
                items = committed.len(),
                quantity = committed.total_quantity(),
                "Cart updated"
            ),
            Err(e) if e.is_rule_violation() => warn!(%operation, error = %e, "Cart operation rejected"),
            Err(e) => error!(%operation, error = %e, "Cart operation failed"),
        }

        if let Err(e) = &result {
            self.inner.notifier.notify(e.notification(operation));
        }
        result
    }

    fn commit(&self, cart: &mut Cart, next: Cart) -> Result<Cart> {
        self.inner.store.save(&next)?;
        cart.clone_from(&next);
        self.inner.updates.send_replace(next.clone());
        Ok(next)
    }
}

fn ensure_in_stock(stock: Stock, product_id: ProductId, requested: u32) -> Result<()> {
    if stock.covers(requested) {
        return Ok(());
    }
    Err(CartError::OutOfStock {
        product_id,
        requested,
        available: stock.amount,
    })
}

impl<I, S, N> std::fmt::Debug for CartService<I, S, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartService")
            .field("cart", &*self.inner.updates.borrow())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::str::FromStr;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use rocketshoes_core::CatalogProduct;
    use rust_decimal::Decimal;

    use super::*;
    use crate::inventory::InventoryError;
    use crate::notify::Notification;
    use crate::storage::{CART_SNAPSHOT_KEY, MemoryStorage, StoreError};

    // =========================================================================
    // Test doubles
    // =========================================================================

    #[derive(Default)]
    struct FakeInventory {
        products: std::sync::Mutex<HashMap<ProductId, CatalogProduct>>,
        stock: std::sync::Mutex<HashMap<ProductId, u32>>,
        fail_catalog: AtomicBool,
        fail_stock: AtomicBool,
        stock_calls: AtomicUsize,
    }

    impl FakeInventory {
        fn with_product(self, id: i32, stock: u32) -> Self {
            self.set_stock(id, stock);
            self.products
                .lock()
                .unwrap()
                .insert(ProductId::new(id), catalog(id));
            self
        }

        fn set_stock(&self, id: i32, amount: u32) {
            self.stock.lock().unwrap().insert(ProductId::new(id), amount);
        }
    }

    impl Inventory for FakeInventory {
        async fn fetch_product(&self, id: ProductId) -> std::result::Result<CatalogProduct, InventoryError> {
            tokio::task::yield_now().await;
            if self.fail_catalog.load(Ordering::SeqCst) {
                return Err(InventoryError::RateLimited(1));
            }
            self.products
                .lock()
                .unwrap()
                .get(&id)
                .cloned()
                .ok_or(InventoryError::NotFound(id))
        }

        async fn fetch_stock(&self, id: ProductId) -> std::result::Result<Stock, InventoryError> {
            tokio::task::yield_now().await;
            self.stock_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_stock.load(Ordering::SeqCst) {
                return Err(InventoryError::Api {
                    status: 500,
                    message: "stock service down".to_string(),
                });
            }
            let amount = self
                .stock
                .lock()
                .unwrap()
                .get(&id)
                .copied()
                .ok_or(InventoryError::NotFound(id))?;
            Ok(Stock { id, amount })
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        seen: std::sync::Mutex<Vec<Notification>>,
    }

    impl RecordingNotifier {
        fn take(&self) -> Vec<Notification> {
            std::mem::take(&mut *self.seen.lock().unwrap())
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notification: Notification) {
            self.seen.lock().unwrap().push(notification);
        }
    }

    /// Storage whose writes can be switched off.
    #[derive(Default)]
    struct FlakyStorage {
        inner: MemoryStorage,
        fail_writes: AtomicBool,
    }

    impl KeyValueStore for FlakyStorage {
        fn get(&self, key: &str) -> std::result::Result<Option<String>, StoreError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> std::result::Result<(), StoreError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StoreError::Io(std::io::Error::other("disk full")));
            }
            self.inner.set(key, value)
        }
    }

    type TestService = CartService<FakeInventory, FlakyStorage, RecordingNotifier>;

    fn catalog(id: i32) -> CatalogProduct {
        CatalogProduct {
            id: ProductId::new(id),
            title: format!("Sneaker {id}"),
            price: Decimal::from_str("179.9").unwrap(),
            image_url: format!("https://cdn.example.com/{id}.jpg"),
        }
    }

    fn service(inventory: FakeInventory) -> TestService {
        CartService::new(
            inventory,
            SnapshotStore::new(FlakyStorage::default()),
            RecordingNotifier::default(),
        )
    }

    fn snapshot(service: &TestService) -> Option<String> {
        service.store().storage().get(CART_SNAPSHOT_KEY).unwrap()
    }

    fn amounts(cart: &Cart) -> Vec<(i32, u32)> {
        cart.iter().map(|item| (item.id.as_i32(), item.amount)).collect()
    }

    fn id(id: i32) -> ProductId {
        ProductId::new(id)
    }

    fn update(product_id: i32, amount: u32) -> UpdateProductAmount {
        UpdateProductAmount {
            product_id: id(product_id),
            amount,
        }
    }

    // =========================================================================
    // addProduct
    // =========================================================================

    #[tokio::test]
    async fn test_add_new_product_appends_with_amount_one() {
        let service = service(
            FakeInventory::default()
                .with_product(1, 5)
                .with_product(2, 1),
        );

        service.add_product(id(1)).await.unwrap();
        let cart = service.add_product(id(2)).await.unwrap();

        assert_eq!(amounts(&cart), vec![(1, 1), (2, 1)]);
        assert_eq!(service.cart(), cart);
        assert_eq!(service.store().load(), cart);
        assert!(service.notifier().take().is_empty());
    }

    #[tokio::test]
    async fn test_add_existing_product_increments_in_place() {
        let service = service(
            FakeInventory::default()
                .with_product(1, 5)
                .with_product(2, 5),
        );

        service.add_product(id(1)).await.unwrap();
        service.add_product(id(2)).await.unwrap();
        let cart = service.add_product(id(1)).await.unwrap();

        assert_eq!(amounts(&cart), vec![(1, 2), (2, 1)]);
        let item = cart.get(id(1)).unwrap();
        assert_eq!(item.title, "Sneaker 1");
        assert_eq!(item.image_url, "https://cdn.example.com/1.jpg");
    }

    #[tokio::test]
    async fn test_add_out_of_stock_leaves_cart_and_snapshot_unchanged() {
        let service = service(FakeInventory::default().with_product(1, 1));

        service.add_product(id(1)).await.unwrap();
        let before = snapshot(&service);

        let err = service.add_product(id(1)).await.unwrap_err();

        assert!(matches!(
            err,
            CartError::OutOfStock {
                requested: 2,
                available: 1,
                ..
            }
        ));
        assert_eq!(snapshot(&service), before);
        assert_eq!(amounts(&service.cart()), vec![(1, 1)]);
        assert_eq!(service.notifier().take(), vec![Notification::OutOfStock]);
    }

    #[tokio::test]
    async fn test_add_with_zero_stock_is_out_of_stock() {
        let service = service(FakeInventory::default().with_product(1, 0));

        let err = service.add_product(id(1)).await.unwrap_err();

        assert!(matches!(err, CartError::OutOfStock { requested: 1, .. }));
        assert!(service.cart().is_empty());
        assert_eq!(snapshot(&service), None);
        assert_eq!(service.notifier().take(), vec![Notification::OutOfStock]);
    }

    #[tokio::test]
    async fn test_add_unknown_product_emits_add_error() {
        let service = service(FakeInventory::default());

        let err = service.add_product(id(99)).await.unwrap_err();

        assert!(matches!(err, CartError::Fetch(InventoryError::NotFound(_))));
        assert!(service.cart().is_empty());
        assert_eq!(service.notifier().take(), vec![Notification::AddError]);
    }

    #[tokio::test]
    async fn test_add_catalog_failure_skips_stock_fetch() {
        let service = service(FakeInventory::default().with_product(1, 5));
        service.inventory().fail_catalog.store(true, Ordering::SeqCst);

        assert!(service.add_product(id(1)).await.is_err());

        assert_eq!(service.inventory().stock_calls.load(Ordering::SeqCst), 0);
        assert_eq!(service.notifier().take(), vec![Notification::AddError]);
    }

    #[tokio::test]
    async fn test_add_stock_failure_emits_add_error() {
        let service = service(FakeInventory::default().with_product(1, 5));
        service.inventory().fail_stock.store(true, Ordering::SeqCst);

        let err = service.add_product(id(1)).await.unwrap_err();

        assert!(matches!(err, CartError::Fetch(InventoryError::Api { status: 500, .. })));
        assert!(service.cart().is_empty());
        assert_eq!(service.notifier().take(), vec![Notification::AddError]);
    }

    // =========================================================================
    // removeProduct
    // =========================================================================

    #[tokio::test]
    async fn test_remove_missing_product_emits_remove_error() {
        let service = service(FakeInventory::default().with_product(1, 5));
        service.add_product(id(1)).await.unwrap();
        let before = snapshot(&service);

        let err = service.remove_product(id(2)).await.unwrap_err();

        assert!(matches!(err, CartError::NotFound(missing) if missing == id(2)));
        assert_eq!(amounts(&service.cart()), vec![(1, 1)]);
        assert_eq!(snapshot(&service), before);
        assert_eq!(service.notifier().take(), vec![Notification::RemoveError]);
    }

    #[tokio::test]
    async fn test_remove_only_removes_that_item() {
        let service = service(
            FakeInventory::default()
                .with_product(1, 5)
                .with_product(2, 5)
                .with_product(3, 5),
        );
        for product in [1, 2, 3] {
            service.add_product(id(product)).await.unwrap();
        }

        let cart = service.remove_product(id(2)).await.unwrap();

        assert_eq!(amounts(&cart), vec![(1, 1), (3, 1)]);
        assert_eq!(service.store().load(), cart);
    }

    #[tokio::test]
    async fn test_remove_does_not_query_inventory() {
        let service = service(FakeInventory::default().with_product(1, 5));
        service.add_product(id(1)).await.unwrap();
        let calls = service.inventory().stock_calls.load(Ordering::SeqCst);

        service.remove_product(id(1)).await.unwrap();

        assert_eq!(service.inventory().stock_calls.load(Ordering::SeqCst), calls);
    }

    // =========================================================================
    // updateProductAmount
    // =========================================================================

    #[tokio::test]
    async fn test_update_zero_amount_emits_update_error() {
        let service = service(FakeInventory::default().with_product(1, 5));
        service.add_product(id(1)).await.unwrap();

        for product in [1, 2] {
            let err = service.update_product_amount(update(product, 0)).await.unwrap_err();
            assert!(matches!(err, CartError::InvalidAmount(0)));
        }

        assert_eq!(amounts(&service.cart()), vec![(1, 1)]);
        assert_eq!(
            service.notifier().take(),
            vec![Notification::UpdateError, Notification::UpdateError]
        );
    }

    #[tokio::test]
    async fn test_update_missing_product_emits_update_error() {
        let service = service(FakeInventory::default().with_product(1, 5));

        let err = service.update_product_amount(update(1, 2)).await.unwrap_err();

        assert!(matches!(err, CartError::NotFound(_)));
        assert_eq!(service.inventory().stock_calls.load(Ordering::SeqCst), 0);
        assert_eq!(service.notifier().take(), vec![Notification::UpdateError]);
    }

    #[tokio::test]
    async fn test_update_sets_exact_amount() {
        let service = service(
            FakeInventory::default()
                .with_product(1, 10)
                .with_product(2, 10),
        );
        service.add_product(id(1)).await.unwrap();
        service.add_product(id(2)).await.unwrap();

        let cart = service.update_product_amount(update(1, 7)).await.unwrap();
        assert_eq!(amounts(&cart), vec![(1, 7), (2, 1)]);

        let cart = service.update_product_amount(update(1, 3)).await.unwrap();
        assert_eq!(amounts(&cart), vec![(1, 3), (2, 1)]);
        assert_eq!(service.store().load(), cart);
    }

    #[tokio::test]
    async fn test_update_beyond_stock_emits_out_of_stock() {
        let service = service(FakeInventory::default().with_product(1, 4));
        service.add_product(id(1)).await.unwrap();
        let before = snapshot(&service);

        let err = service.update_product_amount(update(1, 5)).await.unwrap_err();

        assert!(matches!(
            err,
            CartError::OutOfStock {
                requested: 5,
                available: 4,
                ..
            }
        ));
        assert_eq!(snapshot(&service), before);
        assert_eq!(service.notifier().take(), vec![Notification::OutOfStock]);
    }

    #[tokio::test]
    async fn test_update_uses_live_stock() {
        let service = service(FakeInventory::default().with_product(1, 5));
        service.add_product(id(1)).await.unwrap();

        service.inventory().set_stock(1, 2);
        assert!(service.update_product_amount(update(1, 3)).await.is_err());

        service.inventory().set_stock(1, 3);
        let cart = service.update_product_amount(update(1, 3)).await.unwrap();
        assert_eq!(amounts(&cart), vec![(1, 3)]);
    }

    #[tokio::test]
    async fn test_update_stock_failure_emits_update_error() {
        let service = service(FakeInventory::default().with_product(1, 5));
        service.add_product(id(1)).await.unwrap();
        service.inventory().fail_stock.store(true, Ordering::SeqCst);

        let err = service.update_product_amount(update(1, 2)).await.unwrap_err();

        assert!(matches!(err, CartError::Fetch(_)));
        assert_eq!(amounts(&service.cart()), vec![(1, 1)]);
        assert_eq!(service.notifier().take(), vec![Notification::UpdateError]);
    }

    // =========================================================================
    // Commit & persistence
    // =========================================================================

    #[tokio::test]
    async fn test_failed_save_rolls_back_and_emits_persistence_error() {
        let service = service(FakeInventory::default().with_product(1, 5));
        service.add_product(id(1)).await.unwrap();
        let before = service.cart();

        service
            .store()
            .storage()
            .fail_writes
            .store(true, Ordering::SeqCst);

        let err = service.add_product(id(1)).await.unwrap_err();
        assert!(matches!(err, CartError::Persistence(_)));
        assert_eq!(service.cart(), before);
        assert_eq!(service.store().load(), before);
        assert_eq!(service.notifier().take(), vec![Notification::PersistenceError]);

        // Once storage recovers, the next operation starts from the old cart
        service
            .store()
            .storage()
            .fail_writes
            .store(false, Ordering::SeqCst);
        let cart = service.add_product(id(1)).await.unwrap();
        assert_eq!(amounts(&cart), vec![(1, 2)]);
    }

    #[tokio::test]
    async fn test_failed_save_on_remove_keeps_item() {
        let service = service(FakeInventory::default().with_product(1, 5));
        service.add_product(id(1)).await.unwrap();
        service
            .store()
            .storage()
            .fail_writes
            .store(true, Ordering::SeqCst);

        assert!(service.remove_product(id(1)).await.is_err());
        assert!(service.cart().contains(id(1)));
        assert_eq!(service.notifier().take(), vec![Notification::PersistenceError]);
    }

    #[tokio::test]
    async fn test_restores_cart_from_snapshot() {
        let storage = Arc::new(MemoryStorage::new());
        let first = CartService::new(
            FakeInventory::default().with_product(1, 5).with_product(2, 5),
            SnapshotStore::new(Arc::clone(&storage)),
            RecordingNotifier::default(),
        );
        first.add_product(id(2)).await.unwrap();
        first.add_product(id(1)).await.unwrap();
        first.add_product(id(2)).await.unwrap();
        let expected = first.cart();
        drop(first);

        let restarted = CartService::new(
            FakeInventory::default(),
            SnapshotStore::new(storage),
            RecordingNotifier::default(),
        );

        assert_eq!(restarted.cart(), expected);
        assert_eq!(amounts(&restarted.cart()), vec![(2, 2), (1, 1)]);
    }

    #[tokio::test]
    async fn test_snapshot_with_repeated_product_starts_empty() {
        let storage = MemoryStorage::new();
        storage
            .set(
                CART_SNAPSHOT_KEY,
                r#"[{"id":1,"title":"Sneaker 1","price":179.9,"image":"1.jpg","amount":1},
                    {"id":1,"title":"Sneaker 1","price":179.9,"image":"1.jpg","amount":1}]"#,
            )
            .unwrap();

        let service = CartService::new(
            FakeInventory::default().with_product(1, 2),
            SnapshotStore::new(storage),
            RecordingNotifier::default(),
        );
        assert!(service.cart().is_empty());

        service.add_product(id(1)).await.unwrap();
        service.add_product(id(1)).await.unwrap();
        assert!(service.add_product(id(1)).await.is_err());

        assert_eq!(amounts(&service.cart()), vec![(1, 2)]);
        assert_eq!(service.cart().total_quantity(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_operations_on_multi_thread_runtime() {
        let service = service(FakeInventory::default().with_product(1, 3));
        let other = service.clone();

        let handle = tokio::spawn(async move { other.add_product(id(1)).await });
        service.add_product(id(1)).await.unwrap();
        handle.await.unwrap().unwrap();

        assert_eq!(amounts(&service.cart()), vec![(1, 2)]);
        assert!(snapshot(&service).unwrap().contains("\"amount\":2"));
    }

    #[tokio::test]
    async fn test_subscribers_see_commits_only() {
        let service = service(FakeInventory::default().with_product(1, 1));
        let mut updates = service.subscribe();
        assert!(updates.borrow_and_update().is_empty());

        service.add_product(id(1)).await.unwrap();
        assert!(updates.has_changed().unwrap());
        assert_eq!(amounts(&updates.borrow_and_update()), vec![(1, 1)]);

        assert!(service.add_product(id(1)).await.is_err());
        assert!(!updates.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_adds_cannot_oversell() {
        let service = service(FakeInventory::default().with_product(1, 1));
        let other = service.clone();

        let (first, second) = tokio::join!(service.add_product(id(1)), other.add_product(id(1)));

        assert_eq!(
            [first.is_ok(), second.is_ok()].iter().filter(|ok| **ok).count(),
            1
        );
        assert_eq!(amounts(&service.cart()), vec![(1, 1)]);
        assert_eq!(service.notifier().take(), vec![Notification::OutOfStock]);
    }

    #[tokio::test]
    async fn test_add_update_remove_scenario() {
        let service = service(FakeInventory::default().with_product(1, 5));

        service.add_product(id(1)).await.unwrap();
        let cart = service.add_product(id(1)).await.unwrap();
        assert_eq!(amounts(&cart), vec![(1, 2)]);

        let cart = service.update_product_amount(update(1, 5)).await.unwrap();
        assert_eq!(amounts(&cart), vec![(1, 5)]);

        let err = service.update_product_amount(update(1, 6)).await.unwrap_err();
        assert!(matches!(err, CartError::OutOfStock { .. }));
        assert_eq!(amounts(&service.cart()), vec![(1, 5)]);
        assert_eq!(service.notifier().take(), vec![Notification::OutOfStock]);

        let cart = service.remove_product(id(1)).await.unwrap();
        assert!(cart.is_empty());
        assert_eq!(snapshot(&service).as_deref(), Some("[]"));
    }
}
