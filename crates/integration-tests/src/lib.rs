//! Integration tests for Shieldline.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shieldline-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_persistence` - Cart store over file storage, reloads and upgrades
//! - `checkout_flow` - Checkout against a mocked order API
//! - `unread_notifier` - Contacts client and notifier against a mocked API
//!
//! No external services are needed: HTTP tests mount `wiremock` mocks on a
//! local [`MockServer`](wiremock::MockServer) and point clients at
//! [`api_base`].

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::{Path, PathBuf};

use shieldline_core::{CartItem, Price};
use url::Url;
use wiremock::MockServer;

/// Scratch directory removed on drop.
pub struct TempDir {
    path: PathBuf,
}

impl TempDir {
    /// Create a fresh, uniquely named directory under the system temp dir.
    ///
    /// # Panics
    ///
    /// Panics if the directory cannot be created.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new(label: &str) -> Self {
        let path = std::env::temp_dir().join(format!("shieldline-{label}-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&path).expect("Failed to create temp dir");
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

/// Security products used across tests.
#[must_use]
#[allow(clippy::expect_used)]
pub fn product(id: &str, name: &str, price: &str) -> CartItem {
    let price: Price = price.parse().expect("valid test price");
    CartItem::new(id, name, price).with_category("security")
}

/// API root on `server` to hand to clients, e.g. `http://127.0.0.1:PORT/api`.
///
/// # Panics
///
/// Panics if the mock server URI is not a valid URL.
#[must_use]
#[allow(clippy::expect_used)]
pub fn api_base(server: &MockServer) -> Url {
    Url::parse(&format!("{}/api", server.uri())).expect("mock server URL")
}
