//! Durable local storage for the cart snapshot.
//!
//! # Architecture
//!
//! Storage is modelled as a string-keyed slot map ([`KeyValueStore`]), the
//! way browser local storage works: the cart is one slot, keyed by
//! [`CART_SNAPSHOT_KEY`], whose value is the JSON-serialized cart.
//!
//! - [`FileStorage`] - JSON file on disk, atomic replace on every write
//! - [`MemoryStorage`] - process-local map, for tests and throwaway sessions
//! - [`SnapshotStore`] - the cart-facing adapter (`load`/`save`)

mod file;
mod memory;
mod snapshot;

pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use snapshot::SnapshotStore;

use thiserror::Error;
use tokio::runtime::{Handle, RuntimeFlavor};

/// Namespaced storage key of the cart snapshot.
pub const CART_SNAPSHOT_KEY: &str = "@RocketShoes:cart";

/// Errors that can occur when reading or writing storage.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value or the storage file itself could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The storage lock was poisoned by a panicking writer.
    #[error("Storage lock poisoned")]
    Poisoned,
}

/// String-keyed durable slot storage.
///
/// Calls are blocking; implementations must make `set` durable before
/// returning. [`SnapshotStore`] runs them through [`run_blocking`], so on a
/// multi-threaded runtime they do not stall other tasks.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backing storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Overwrite the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the value cannot be written durably.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

/// Run blocking storage I/O from sync or async context.
///
/// On a multi-threaded tokio runtime the current worker hands its other
/// tasks off first (`block_in_place`). On a current-thread runtime, or
/// outside any runtime, `f` runs inline.
pub(crate) fn run_blocking<T>(f: impl FnOnce() -> T) -> T {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(f)
        }
        _ => f(),
    }
}
