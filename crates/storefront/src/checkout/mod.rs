//! Checkout: turn the cart into an order.
//!
//! Checkout reads the cart once, submits the items and total to the order
//! API through an [`OrderGateway`], and removes the ordered lines only after
//! the API has accepted the order. A failed submission leaves the cart as it
//! was so the shopper can retry. Anything added while the order is in flight
//! was not part of it and stays in the cart.

pub mod client;

use std::future::Future;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument, warn};

use shieldline_core::{CartLineItem, Email, OrderId, OrderStatus};

use crate::cart::CartStore;
use crate::error::add_breadcrumb;

pub use client::OrdersClient;

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// There is nothing to order.
    #[error("cart is empty")]
    EmptyCart,

    /// A required customer field is blank.
    #[error("missing customer field: {0}")]
    MissingField(&'static str),

    /// No order API is configured.
    #[error("order API is not configured: {0}")]
    NotConfigured(String),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse the API response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Customer details from the checkout form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub email: Email,
    pub phone: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CustomerInfo {
    /// Check that the free-text fields are filled in.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::MissingField` naming the first blank field.
    pub fn validate(&self) -> Result<(), CheckoutError> {
        for (field, value) in [
            ("name", &self.name),
            ("phone", &self.phone),
            ("address", &self.address),
        ] {
            if value.trim().is_empty() {
                return Err(CheckoutError::MissingField(field));
            }
        }
        Ok(())
    }
}

/// Body sent to the order API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRequest {
    pub customer: CustomerInfo,
    pub items: Vec<CartLineItem>,
    #[serde(with = "rust_decimal::serde::str")]
    pub total: Decimal,
}

/// What the order API returns for an accepted order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderReceipt {
    pub order_id: OrderId,
    pub status: OrderStatus,
}

/// Result of a completed checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderConfirmation {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub total: Decimal,
    pub item_count: u64,
    pub placed_at: DateTime<Utc>,
}

/// Something that can create orders.
pub trait OrderGateway: Send + Sync {
    /// Submit an order and return the identifier the API assigned.
    fn submit_order(
        &self,
        order: &OrderRequest,
    ) -> impl Future<Output = Result<OrderReceipt, CheckoutError>> + Send;
}

/// Place an order for everything in `cart`.
///
/// The submitted lines leave the cart only when the gateway accepts the
/// order; lines added during submission are kept.
///
/// # Errors
///
/// Returns `CheckoutError::MissingField` for an incomplete form,
/// `CheckoutError::EmptyCart` without contacting the gateway when there is
/// nothing to buy, or whatever the gateway reports.
#[instrument(skip_all, fields(customer = %customer.email))]
pub async fn checkout<G: OrderGateway>(
    cart: &CartStore,
    gateway: &G,
    customer: CustomerInfo,
) -> Result<OrderConfirmation, CheckoutError> {
    customer.validate()?;

    let (items, total) = cart.checkout_view();
    if items.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    let item_count: u64 = items.iter().map(|line| u64::from(line.quantity)).sum();

    let request = OrderRequest {
        customer,
        items,
        total,
    };

    let total_str = total.to_string();
    add_breadcrumb(
        "checkout",
        "Submitting order",
        Some(&[("total", total_str.as_str())]),
    );

    let receipt = match gateway.submit_order(&request).await {
        Ok(receipt) => receipt,
        Err(e) => {
            warn!(error = %e, %total, "Order submission failed; cart left intact");
            return Err(e);
        }
    };

    cart.remove_ordered(&request.items);
    info!(order_id = %receipt.order_id, %total, item_count, "Order placed");

    Ok(OrderConfirmation {
        order_id: receipt.order_id,
        status: receipt.status,
        total,
        item_count,
        placed_at: Utc::now(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Mutex;

    use shieldline_core::{CartItem, ProductId};

    use super::*;

    /// Gateway that records requests and answers with a fixed result.
    struct RecordingGateway {
        fail_with: Option<u16>,
        requests: Mutex<Vec<OrderRequest>>,
    }

    impl RecordingGateway {
        fn accepting() -> Self {
            Self {
                fail_with: None,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                fail_with: Some(status),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    impl OrderGateway for RecordingGateway {
        async fn submit_order(&self, order: &OrderRequest) -> Result<OrderReceipt, CheckoutError> {
            self.requests.lock().unwrap().push(order.clone());
            match self.fail_with {
                Some(status) => Err(CheckoutError::Api {
                    status,
                    message: "order service down".to_string(),
                }),
                None => Ok(OrderReceipt {
                    order_id: OrderId::new("ord-1001"),
                    status: OrderStatus::Pending,
                }),
            }
        }
    }

    fn customer() -> CustomerInfo {
        CustomerInfo {
            name: "Dana Reyes".to_string(),
            email: Email::parse("dana@example.com").unwrap(),
            phone: "+1 555 0100".to_string(),
            address: "12 Harbor Rd".to_string(),
            notes: None,
        }
    }

    fn stocked_cart() -> CartStore {
        let cart = CartStore::in_memory();
        cart.add_to_cart(
            CartItem::new("cam1", "Dome camera", "1299".parse().unwrap()),
            2,
        );
        cart.add_to_cart(
            CartItem::new("ext1", "Extinguisher", "450".parse().unwrap()),
            3,
        );
        cart
    }

    #[tokio::test]
    async fn test_checkout_submits_and_clears() {
        let cart = stocked_cart();
        let gateway = RecordingGateway::accepting();

        let confirmation = checkout(&cart, &gateway, customer()).await.unwrap();

        assert_eq!(confirmation.order_id, OrderId::new("ord-1001"));
        assert_eq!(confirmation.total, Decimal::new(3948, 0));
        assert_eq!(confirmation.item_count, 5);
        assert!(cart.is_empty());

        let requests = gateway.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].items.len(), 2);
        assert_eq!(requests[0].total, Decimal::new(3948, 0));
    }

    /// Gateway that adds to the cart while the order is being placed.
    struct BusyShopperGateway {
        cart: CartStore,
    }

    impl OrderGateway for BusyShopperGateway {
        async fn submit_order(&self, _order: &OrderRequest) -> Result<OrderReceipt, CheckoutError> {
            self.cart
                .add_one(CartItem::new("late", "Window sensor", "75".parse().unwrap()));
            Ok(OrderReceipt {
                order_id: OrderId::new("ord-1002"),
                status: OrderStatus::Pending,
            })
        }
    }

    #[tokio::test]
    async fn test_lines_added_during_submit_survive() {
        let cart = stocked_cart();
        let gateway = BusyShopperGateway { cart: cart.clone() };

        let confirmation = checkout(&cart, &gateway, customer()).await.unwrap();

        assert_eq!(confirmation.item_count, 5);
        assert!(cart.contains(&ProductId::new("late")));
        assert!(!cart.contains(&ProductId::new("cam1")));
        assert_eq!(cart.cart_items_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_cart_never_reaches_gateway() {
        let cart = CartStore::in_memory();
        let gateway = RecordingGateway::accepting();

        let err = checkout(&cart, &gateway, customer()).await.unwrap_err();

        assert!(matches!(err, CheckoutError::EmptyCart));
        assert!(gateway.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_gateway_failure_keeps_cart() {
        let cart = stocked_cart();
        let gateway = RecordingGateway::failing(503);

        let err = checkout(&cart, &gateway, customer()).await.unwrap_err();

        assert!(matches!(err, CheckoutError::Api { status: 503, .. }));
        assert_eq!(cart.cart_items_count(), 5);
        assert!(cart.contains(&ProductId::new("cam1")));
    }

    #[tokio::test]
    async fn test_blank_fields_rejected() {
        let cart = stocked_cart();
        let gateway = RecordingGateway::accepting();
        let mut incomplete = customer();
        incomplete.address = "   ".to_string();

        let err = checkout(&cart, &gateway, incomplete).await.unwrap_err();

        assert!(matches!(err, CheckoutError::MissingField("address")));
        assert!(gateway.requests.lock().unwrap().is_empty());
        assert!(!cart.is_empty());
    }

    #[test]
    fn test_order_request_serialization() {
        let request = OrderRequest {
            customer: customer(),
            items: stocked_cart().items(),
            total: Decimal::new(3948, 0),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["total"], "3948");
        assert_eq!(value["customer"]["email"], "dana@example.com");
        assert!(value["customer"].get("notes").is_none());
        assert_eq!(value["items"][1]["quantity"], 3);
    }
}
