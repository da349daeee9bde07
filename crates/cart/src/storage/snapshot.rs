//! Cart snapshot adapter.

use rocketshoes_core::Cart;
use tracing::{debug, instrument, warn};

use super::{CART_SNAPSHOT_KEY, KeyValueStore, StoreError, run_blocking};

/// Reads and writes the single persisted cart snapshot.
#[derive(Debug)]
pub struct SnapshotStore<S> {
    storage: S,
    key: String,
}

impl<S: KeyValueStore> SnapshotStore<S> {
    /// Snapshot stored under [`CART_SNAPSHOT_KEY`].
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, CART_SNAPSHOT_KEY)
    }

    /// Snapshot stored under a custom key.
    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// Storage key of the snapshot.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Underlying key/value storage.
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Last persisted cart, or an empty cart if there is none.
    ///
    /// Never fails: unreadable storage and corrupt snapshots are logged and
    /// treated as an empty cart. The next successful [`save`](Self::save)
    /// overwrites the bad value.
    #[instrument(skip(self), fields(key = %self.key))]
    pub fn load(&self) -> Cart {
        let raw = match run_blocking(|| self.storage.get(&self.key)) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No cart snapshot stored, starting empty");
                return Cart::new();
            }
            Err(e) => {
                warn!(error = %e, "Failed to read cart snapshot, starting empty");
                return Cart::new();
            }
        };

        match serde_json::from_str::<Cart>(&raw) {
            Ok(cart) => {
                debug!(items = cart.len(), "Cart snapshot loaded");
                cart
            }
            Err(e) => {
                warn!(error = %e, "Cart snapshot is corrupt, starting empty");
                Cart::new()
            }
        }
    }

    /// Overwrite the persisted snapshot with `cart`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the cart cannot be serialized or written.
    #[instrument(skip(self, cart), fields(key = %self.key, items = cart.len()))]
    pub fn save(&self, cart: &Cart) -> Result<(), StoreError> {
        let raw = serde_json::to_string(cart)?;
        run_blocking(|| self.storage.set(&self.key, &raw))
    }
}
