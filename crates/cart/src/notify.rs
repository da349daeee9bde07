//! User-facing failure notifications.
//!
//! Every failed cart operation emits exactly one [`Notification`] before it
//! returns. How it reaches the user (toast, status line, log) is up to the
//! [`Notifier`] the service was built with.

use serde::Serialize;
use tokio::sync::broadcast;

/// Default buffer of [`BroadcastNotifier`].
const BROADCAST_CAPACITY: usize = 32;

/// User-facing message kinds. All are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Notification {
    /// Adding a product failed (catalog or stock unavailable).
    AddError,
    /// Removing a product failed (not in cart).
    RemoveError,
    /// Changing a quantity failed (invalid amount, not in cart, stock unavailable).
    UpdateError,
    /// The requested quantity exceeds available stock.
    OutOfStock,
    /// The cart could not be saved; the change was discarded.
    PersistenceError,
}

impl Notification {
    /// Message shown to the user.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::AddError => "Error adding product",
            Self::RemoveError => "Error removing product",
            Self::UpdateError => "Error changing product quantity",
            Self::OutOfStock => "Requested quantity out of stock",
            Self::PersistenceError => "Could not save your cart",
        }
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// One-way sink for user-facing notifications.
pub trait Notifier: Send + Sync {
    /// Deliver `notification`. Must not block or fail.
    fn notify(&self, notification: Notification);
}

/// Emits notifications as `tracing` error events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        tracing::error!(kind = ?notification, "{}", notification.message());
    }
}

/// Fans notifications out to any number of subscribers.
///
/// Sending with no subscribers is not an error; the notification is dropped.
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    sender: broadcast::Sender<Notification>,
}

impl BroadcastNotifier {
    /// Create a notifier with the default buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(BROADCAST_CAPACITY)
    }

    /// Create a notifier buffering up to `capacity` notifications per
    /// subscriber.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Receive every notification sent from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for BroadcastNotifier {
    fn notify(&self, notification: Notification) {
        // Err only means nobody is listening
        let _ = self.sender.send(notification);
    }
}
