//! Cart commands.
//!
//! Each command performs at most one cart operation and then logs the
//! resulting cart. Failures have already been reported by the notifier;
//! the returned error only drives the exit status.

use rocketshoes_cart::{CartError, UpdateProductAmount};
use rocketshoes_core::{Cart as CartState, ProductId};
use rust_decimal::Decimal;
use tracing::info;

use super::Cart;

/// Log the current cart.
pub fn show(cart: &Cart) {
    log_cart(&cart.cart());
}

/// Add one unit of `product_id`.
///
/// # Errors
///
/// Returns `CartError` if the product could not be added.
pub async fn add(cart: &Cart, product_id: ProductId) -> Result<(), CartError> {
    let updated = cart.add_product(product_id).await?;
    log_cart(&updated);
    Ok(())
}

/// Remove `product_id` from the cart.
///
/// # Errors
///
/// Returns `CartError` if the product could not be removed.
pub async fn remove(cart: &Cart, product_id: ProductId) -> Result<(), CartError> {
    let updated = cart.remove_product(product_id).await?;
    log_cart(&updated);
    Ok(())
}

/// Set the quantity of `product_id` to `amount`.
///
/// # Errors
///
/// Returns `CartError` if the quantity could not be changed.
pub async fn update(cart: &Cart, product_id: ProductId, amount: u32) -> Result<(), CartError> {
    let updated = cart
        .update_product_amount(UpdateProductAmount { product_id, amount })
        .await?;
    log_cart(&updated);
    Ok(())
}

fn log_cart(cart: &CartState) {
    if cart.is_empty() {
        info!("Cart is empty");
        return;
    }

    info!("Cart ({} items)", cart.len());
    for item in cart {
        info!(
            "  #{:<4} {:<40} {:>3} x {:>12} = {:>12}",
            item.id,
            item.title,
            item.amount,
            format_price(item.price),
            format_total(item.line_total())
        );
    }
    info!("  Subtotal: {}", format_total(cart.subtotal()));
}

/// Format a price in the store currency (Brazilian real).
fn format_price(amount: Decimal) -> String {
    format!("R$ {:.2}", amount.round_dp(2))
}

/// Format a computed total; `None` means it did not fit in a `Decimal`.
fn format_total(total: Option<Decimal>) -> String {
    total.map_or_else(|| "R$ (too large)".to_string(), format_price)
}
