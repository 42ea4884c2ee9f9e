//! HTTP client for the order-creation API.

use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use shieldline_core::{OrderId, OrderStatus};

use super::{CheckoutError, OrderGateway, OrderReceipt, OrderRequest};
use crate::config::StorefrontConfig;

/// Keys the API has used for the new order's identifier.
const ID_KEYS: &[&str] = &["_id", "id", "orderId"];

/// Keys the API has used to wrap the created order.
const WRAPPER_KEYS: &[&str] = &["order", "data"];

/// Order API client.
#[derive(Debug, Clone)]
pub struct OrdersClient {
    client: reqwest::Client,
    orders_url: Url,
}

impl OrdersClient {
    /// Create a client for the API rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns error if the URL cannot be extended or the HTTP client fails
    /// to build.
    pub fn new(base_url: &Url, timeout: Duration) -> Result<Self, CheckoutError> {
        let orders_url = endpoint(base_url, "orders")?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { client, orders_url })
    }

    /// Create a client from storefront configuration.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::NotConfigured` if no API base URL is set.
    pub fn from_config(config: &StorefrontConfig) -> Result<Self, CheckoutError> {
        let base_url = config.api_base_url.as_ref().ok_or_else(|| {
            CheckoutError::NotConfigured("STOREFRONT_API_BASE_URL is not set".to_string())
        })?;
        Self::new(base_url, config.http_timeout)
    }

    /// The URL orders are posted to.
    #[must_use]
    pub const fn orders_url(&self) -> &Url {
        &self.orders_url
    }
}

impl OrderGateway for OrdersClient {
    #[instrument(skip_all, fields(url = %self.orders_url, lines = order.items.len()))]
    async fn submit_order(&self, order: &OrderRequest) -> Result<OrderReceipt, CheckoutError> {
        let response = self
            .client
            .post(self.orders_url.clone())
            .json(order)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CheckoutError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| CheckoutError::Parse(e.to_string()))?;
        debug!("Order API accepted order");

        parse_receipt(&body)
    }
}

/// Append a path segment to an API base URL, tolerating a missing trailing slash.
fn endpoint(base: &Url, segment: &str) -> Result<Url, CheckoutError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(segment)
        .map_err(|e| CheckoutError::NotConfigured(format!("invalid API base URL {base}: {e}")))
}

/// Pull the order id and status out of an API response.
///
/// Accepts the order object itself or one nested under `order`/`data`.
fn parse_receipt(body: &Value) -> Result<OrderReceipt, CheckoutError> {
    let order = WRAPPER_KEYS
        .iter()
        .find_map(|key| body.get(key).filter(|v| v.is_object()))
        .unwrap_or(body);

    let order_id = ID_KEYS
        .iter()
        .find_map(|key| order.get(key))
        .and_then(|id| serde_json::from_value::<OrderId>(id.clone()).ok())
        .ok_or_else(|| CheckoutError::Parse(format!("response has no order id: {body}")))?;

    let status = order
        .get("status")
        .and_then(|s| serde_json::from_value::<OrderStatus>(s.clone()).ok())
        .unwrap_or_default();

    Ok(OrderReceipt { order_id, status })
}
