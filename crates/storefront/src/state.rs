//! Application state shared by storefront front ends.

use std::sync::Arc;

use crate::cart::{CartStore, FileStorage, KeyValueStorage};
use crate::checkout::{self, CheckoutError, CustomerInfo, OrderConfirmation, OrdersClient};
use crate::config::StorefrontConfig;
use crate::error::Result;

/// Application state shared by everything that renders or changes the cart.
///
/// This struct is cheaply cloneable via `Arc`. The cart is opened once here
/// and handed out by reference, so every consumer sees the same cart.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    cart: CartStore,
    orders: Option<OrdersClient>,
}

impl AppState {
    /// Create application state with file-backed cart storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created or the order
    /// client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self> {
        let storage = FileStorage::open(&config.data_dir)?;
        Self::with_storage(config, Arc::new(storage))
    }

    /// Create application state over an explicit storage backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the order client cannot be built.
    pub fn with_storage(
        config: StorefrontConfig,
        storage: Arc<dyn KeyValueStorage>,
    ) -> Result<Self> {
        let cart = CartStore::open(storage, config.cart_key.clone());
        let orders = match &config.api_base_url {
            Some(base_url) => Some(OrdersClient::new(base_url, config.http_timeout)?),
            None => None,
        };

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                cart,
                orders,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the cart.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    /// Get the order API client, if one is configured.
    #[must_use]
    pub fn orders(&self) -> Option<&OrdersClient> {
        self.inner.orders.as_ref()
    }

    /// Check out the shared cart through the configured order API.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::NotConfigured` without an API base URL, or any
    /// checkout failure.
    pub async fn checkout(&self, customer: CustomerInfo) -> Result<OrderConfirmation> {
        let orders = self.orders().ok_or_else(|| {
            CheckoutError::NotConfigured("STOREFRONT_API_BASE_URL is not set".to_string())
        })?;
        Ok(checkout::checkout(self.cart(), orders, customer).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shieldline_core::{CartItem, Email};

    use super::*;
    use crate::cart::MemoryStorage;
    use crate::error::StorefrontError;

    #[test]
    fn test_cart_shared_across_clones() {
        let state = AppState::with_storage(
            StorefrontConfig::default(),
            Arc::new(MemoryStorage::new()),
        )
        .unwrap();
        let other = state.clone();

        state
            .cart()
            .add_one(CartItem::new("kp1", "Keypad", "89.50".parse().unwrap()));
        assert_eq!(other.cart().cart_items_count(), 1);
        assert!(other.orders().is_none());
    }

    #[tokio::test]
    async fn test_checkout_requires_api() {
        let state = AppState::with_storage(
            StorefrontConfig::default(),
            Arc::new(MemoryStorage::new()),
        )
        .unwrap();
        let customer = CustomerInfo {
            name: "Sam".to_string(),
            email: Email::parse("sam@example.com").unwrap(),
            phone: "555".to_string(),
            address: "1 Main St".to_string(),
            notes: None,
        };

        let err = state.checkout(customer).await.unwrap_err();
        assert!(matches!(
            err,
            StorefrontError::Checkout(CheckoutError::NotConfigured(_))
        ));
    }

    #[test]
    fn test_file_backed_state_uses_configured_key() {
        let dir = std::env::temp_dir().join(format!("shieldline-state-{}", uuid::Uuid::new_v4()));
        let config = StorefrontConfig {
            data_dir: dir.clone(),
            cart_key: "guest".to_string(),
            ..StorefrontConfig::default()
        };

        let state = AppState::new(config.clone()).unwrap();
        state
            .cart()
            .add_to_cart(CartItem::new("s1", "Siren", "120".parse().unwrap()), 2);
        assert!(dir.join("guest.json").exists());

        let reopened = AppState::new(config).unwrap();
        assert_eq!(reopened.cart().cart_items_count(), 2);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
