//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `STOREFRONT_API_BASE_URL` - Base URL of the REST API (required for checkout)
//! - `STOREFRONT_DATA_DIR` - Directory holding persisted carts (default: .shieldline)
//! - `STOREFRONT_CART_KEY` - Storage slot for the cart (default: cart)
//! - `STOREFRONT_HTTP_TIMEOUT_SECS` - Timeout for API requests (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::cart::DEFAULT_CART_KEY;

const DEFAULT_DATA_DIR: &str = ".shieldline";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// REST API root; orders are posted to `{api_base_url}/orders`
    pub api_base_url: Option<Url>,
    /// Directory for file-backed cart storage
    pub data_dir: PathBuf,
    /// Storage slot holding the cart snapshot
    pub cart_key: String,
    /// Timeout applied to API requests
    pub http_timeout: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            api_base_url: None,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            cart_key: DEFAULT_CART_KEY.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let api_base_url = lookup("STOREFRONT_API_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .map(|v| parse_url("STOREFRONT_API_BASE_URL", &v))
            .transpose()?;

        let data_dir = lookup("STOREFRONT_DATA_DIR").map_or(defaults.data_dir, PathBuf::from);
        let cart_key = lookup("STOREFRONT_CART_KEY").unwrap_or(defaults.cart_key);

        let http_timeout = match lookup("STOREFRONT_HTTP_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|e| {
                    ConfigError::InvalidEnvVar(
                        "STOREFRONT_HTTP_TIMEOUT_SECS".to_string(),
                        e.to_string(),
                    )
                })?;
                if secs == 0 {
                    return Err(ConfigError::InvalidEnvVar(
                        "STOREFRONT_HTTP_TIMEOUT_SECS".to_string(),
                        "must be greater than zero".to_string(),
                    ));
                }
                Duration::from_secs(secs)
            }
            None => defaults.http_timeout,
        };

        Ok(Self {
            api_base_url,
            data_dir,
            cart_key,
            http_timeout,
            sentry_dsn: lookup("SENTRY_DSN"),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
        })
    }

    /// The API base URL, required for checkout.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if it is not configured.
    pub fn require_api_base_url(&self) -> Result<&Url, ConfigError> {
        self.api_base_url
            .as_ref()
            .ok_or_else(|| ConfigError::MissingEnvVar("STOREFRONT_API_BASE_URL".to_string()))
    }
}

/// Parse an http(s) URL from a variable.
fn parse_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme {}", url.scheme()),
        ));
    }
    Ok(url)
}
