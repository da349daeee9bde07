//! RocketShoes Cart - persistent, stock-checked shopping cart.
//!
//! # Architecture
//!
//! - [`CartService`] owns the in-memory cart and is the only thing that
//!   changes it. Build it once and clone the handle into every consumer.
//! - [`Inventory`] supplies catalog entries and live stock; the REST
//!   implementation is [`HttpInventoryClient`].
//! - [`SnapshotStore`] persists the cart to a [`KeyValueStore`] slot so it
//!   survives restarts.
//! - [`Notifier`] receives one [`Notification`] for every failed operation.
//!
//! # Example
//!
//! ```rust,ignore
//! use rocketshoes_cart::{
//!     CartConfig, CartService, FileStorage, HttpInventoryClient, SnapshotStore, TracingNotifier,
//! };
//!
//! let config = CartConfig::from_env()?;
//! let inventory = HttpInventoryClient::new(&config.inventory)?;
//! let store = SnapshotStore::with_key(FileStorage::new(&config.storage.path), &config.storage.key);
//! let cart = CartService::new(inventory, store, TracingNotifier);
//!
//! cart.add_product(ProductId::new(1)).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod inventory;
pub mod notify;
pub mod service;
pub mod storage;

pub use config::{CartConfig, ConfigError, InventoryConfig, StorageConfig};
pub use error::{CartError, Operation};
pub use inventory::{HttpInventoryClient, Inventory, InventoryError};
pub use notify::{BroadcastNotifier, Notification, Notifier, TracingNotifier};
pub use service::{CartService, UpdateProductAmount};
pub use storage::{
    CART_SNAPSHOT_KEY, FileStorage, KeyValueStore, MemoryStorage, SnapshotStore, StoreError,
};
