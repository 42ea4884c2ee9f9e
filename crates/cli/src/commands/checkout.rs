//! Checkout command.

use shieldline_core::{Email, format_amount};
use shieldline_storefront::{AppState, CustomerInfo, StorefrontError};

use super::cart::ensure_saved;
use super::emit;

/// Build customer details from command-line values.
#[must_use]
pub fn customer(
    name: String,
    email: Email,
    phone: String,
    address: String,
    notes: Option<String>,
) -> CustomerInfo {
    CustomerInfo {
        name,
        email,
        phone,
        address,
        notes: notes.filter(|n| !n.trim().is_empty()),
    }
}

/// Submit the cart and print the confirmation.
///
/// # Errors
///
/// Returns an error if checkout fails, in which case the cart is left intact.
/// Also fails when the order was placed but the emptied cart could not be
/// saved; the error names the order so it is not submitted twice.
pub async fn place_order(
    state: &AppState,
    customer: CustomerInfo,
) -> Result<(), Box<dyn std::error::Error>> {
    let confirmation = state
        .checkout(customer)
        .await
        .inspect_err(StorefrontError::report)?;

    emit(&format!(
        "Order {} placed ({}): {} item(s), total {}",
        confirmation.order_id,
        confirmation.status,
        confirmation.item_count,
        format_amount(confirmation.total)
    ))?;

    ensure_saved(state).map_err(|e| {
        format!(
            "order {} was placed but the saved cart still holds its items ({e}); do not check out again",
            confirmation.order_id
        )
    })?;
    Ok(())
}
