//! Cart operation errors.
//!
//! Every variant is recoverable: the operation that produced it left the
//! cart unchanged and has already emitted the matching [`Notification`].

use rocketshoes_core::ProductId;
use thiserror::Error;

use crate::inventory::InventoryError;
use crate::notify::Notification;
use crate::storage::StoreError;

/// The mutating cart operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Add,
    Remove,
    Update,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Add => write!(f, "add"),
            Self::Remove => write!(f, "remove"),
            Self::Update => write!(f, "update"),
        }
    }
}

/// Why a cart operation was not applied.
#[derive(Debug, Error)]
pub enum CartError {
    /// Catalog or stock data could not be fetched.
    #[error("Inventory fetch failed: {0}")]
    Fetch(#[from] InventoryError),

    /// The product is not in the cart.
    #[error("Product {0} is not in the cart")]
    NotFound(ProductId),

    /// Not enough stock for the requested amount.
    #[error("Product {product_id}: requested {requested}, only {available} in stock")]
    OutOfStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// Requested amount is below 1.
    #[error("Invalid amount: {0} (must be at least 1)")]
    InvalidAmount(u32),

    /// The new cart could not be persisted; memory was left unchanged.
    #[error("Failed to persist cart: {0}")]
    Persistence(#[from] StoreError),
}

impl CartError {
    /// Notification emitted when `operation` fails with this error.
    #[must_use]
    pub const fn notification(&self, operation: Operation) -> Notification {
        match self {
            Self::OutOfStock { .. } => Notification::OutOfStock,
            Self::Persistence(_) => Notification::PersistenceError,
            Self::Fetch(_) | Self::NotFound(_) | Self::InvalidAmount(_) => match operation {
                Operation::Add => Notification::AddError,
                Operation::Remove => Notification::RemoveError,
                Operation::Update => Notification::UpdateError,
            },
        }
    }

    /// Whether the failure came from a business rule rather than a
    /// collaborator (inventory API or storage).
    #[must_use]
    pub const fn is_rule_violation(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::OutOfStock { .. } | Self::InvalidAmount(_)
        )
    }
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;
