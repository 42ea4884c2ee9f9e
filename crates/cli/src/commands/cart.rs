//! Cart commands.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use shieldline_core::{CartItem, CartLineItem, ProductId, format_amount};
use shieldline_storefront::AppState;

use super::emit;

/// Cart contents as printed by `cart show --json`.
#[derive(Debug, Serialize)]
struct CartView {
    items: Vec<CartLineItem>,
    item_count: u64,
    #[serde(with = "rust_decimal::serde::str")]
    total: Decimal,
}

/// Add `quantity` units of `item`.
///
/// # Errors
///
/// Returns an error if the cart cannot be written to storage.
pub fn add(state: &AppState, item: CartItem, quantity: u32) -> Result<(), Box<dyn std::error::Error>> {
    let id = item.id.clone();
    state.cart().add_to_cart(item, quantity);
    ensure_saved(state)?;

    let quantity = state.cart().line(&id).map_or(0, |line| line.quantity);
    info!(product_id = %id, quantity, "Cart updated");
    summary_line(state)
}

/// Remove the line for `id`.
///
/// # Errors
///
/// Returns an error if the cart cannot be written to storage.
pub fn remove(state: &AppState, id: String) -> Result<(), Box<dyn std::error::Error>> {
    let id = ProductId::new(id);
    if !state.cart().contains(&id) {
        info!(product_id = %id, "Product not in cart");
    }
    state.cart().remove_from_cart(&id);
    ensure_saved(state)?;
    summary_line(state)
}

/// Set the quantity for `id`; zero or below removes it.
///
/// # Errors
///
/// Returns an error if the cart cannot be written to storage.
pub fn update(state: &AppState, id: String, quantity: i64) -> Result<(), Box<dyn std::error::Error>> {
    let id = ProductId::new(id);
    if !state.cart().contains(&id) {
        info!(product_id = %id, "Product not in cart");
    }
    state.cart().update_quantity(&id, quantity);
    ensure_saved(state)?;
    summary_line(state)
}

/// Empty the cart.
///
/// # Errors
///
/// Returns an error if the cart cannot be written to storage.
pub fn clear(state: &AppState) -> Result<(), Box<dyn std::error::Error>> {
    state.cart().clear_cart();
    ensure_saved(state)?;
    summary_line(state)
}

/// Print the cart as a table or JSON.
///
/// # Errors
///
/// Returns an error if output cannot be written.
pub fn show(state: &AppState, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (items, total) = state.cart().checkout_view();

    if json {
        let view = CartView {
            item_count: items.iter().map(|line| u64::from(line.quantity)).sum(),
            items,
            total,
        };
        emit(&serde_json::to_string_pretty(&view)?)?;
        return Ok(());
    }

    if items.is_empty() {
        emit("Cart is empty")?;
        return Ok(());
    }

    for line in &items {
        emit(&format!(
            "{:<12} {:<28} {:>4} x {:>10} = {:>10}",
            line.id.as_str(),
            line.name,
            line.quantity,
            line.price.display(),
            format_amount(line.line_total()),
        ))?;
    }
    emit(&format!("Total: {}", format_amount(total)))?;
    Ok(())
}

/// Write again if the store's last write failed, so failures reach the user.
pub(super) fn ensure_saved(state: &AppState) -> Result<(), Box<dyn std::error::Error>> {
    if !state.cart().is_durable() {
        state.cart().flush()?;
    }
    Ok(())
}

fn summary_line(state: &AppState) -> Result<(), Box<dyn std::error::Error>> {
    let summary = state.cart().summary();
    emit(&format!(
        "{} item(s), {} line(s), total {}",
        summary.item_count,
        summary.distinct_items,
        format_amount(summary.total)
    ))?;
    Ok(())
}
