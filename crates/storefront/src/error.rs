//! Unified error handling with Sentry integration.
//!
//! Each concern has its own error type ([`ConfigError`], [`StorageError`],
//! [`CartError`], [`CheckoutError`]); `StorefrontError` wraps them for
//! callers such as the CLI that deal with all of them at once.

use thiserror::Error;

use crate::cart::{CartError, StorageError};
use crate::checkout::CheckoutError;
use crate::config::ConfigError;

/// Storefront-level error type.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Storage backend could not be opened.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Cart could not be flushed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Checkout failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),
}

impl StorefrontError {
    /// Whether the failure came from a remote service rather than local input.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Checkout(CheckoutError::Http(_) | CheckoutError::Api { .. } | CheckoutError::Parse(_))
        )
    }

    /// Report remote failures to Sentry and log them.
    pub fn report(&self) {
        if self.is_remote() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront error"
            );
        } else {
            tracing::error!(error = %self, "Storefront error");
        }
    }
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;

/// Add a breadcrumb for shopper actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error. Without an initialized Sentry client this does
/// nothing.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("checkout", "Submitting order", Some(&[("total", "3948")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StorefrontError::from(CheckoutError::EmptyCart);
        assert_eq!(err.to_string(), "Checkout error: cart is empty");

        let err = StorefrontError::from(ConfigError::MissingEnvVar("X".to_string()));
        assert_eq!(
            err.to_string(),
            "Configuration error: Missing environment variable: X"
        );
    }

    #[test]
    fn test_is_remote() {
        assert!(
            StorefrontError::from(CheckoutError::Api {
                status: 500,
                message: String::new()
            })
            .is_remote()
        );
        assert!(!StorefrontError::from(CheckoutError::EmptyCart).is_remote());
        assert!(
            !StorefrontError::from(StorageError::InvalidKey("../x".to_string())).is_remote()
        );
    }

    #[test]
    fn test_breadcrumb_without_client_is_noop() {
        add_breadcrumb("cart", "Added item", Some(&[("product_id", "cam1")]));
        add_breadcrumb("cart", "Cleared", None);
    }
}
