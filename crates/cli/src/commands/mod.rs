//! CLI commands.

pub mod cart;

use rocketshoes_cart::{
    CartConfig, CartService, FileStorage, HttpInventoryClient, SnapshotStore, TracingNotifier,
};

/// Cart service as wired up by the CLI.
pub type Cart = CartService<HttpInventoryClient, FileStorage, TracingNotifier>;

/// Build the cart service from environment configuration.
///
/// The cart is restored from local storage, so every invocation continues
/// where the previous one left off.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the HTTP client cannot
/// be built.
pub fn open_cart() -> Result<Cart, Box<dyn std::error::Error>> {
    let config = CartConfig::from_env()?;
    tracing::debug!(?config, "Configuration loaded");

    let inventory = HttpInventoryClient::new(&config.inventory)?;
    let store = SnapshotStore::with_key(
        FileStorage::new(config.storage.path.clone()),
        config.storage.key.as_str(),
    );

    Ok(CartService::new(inventory, store, TracingNotifier))
}
