//! Shieldline Storefront library.
//!
//! The shopper-facing half of Shieldline: the cart, its persistence, and
//! checkout.
//!
//! # Modules
//!
//! - [`cart`] - Cart store, storage backends, snapshot format, subscriptions
//! - [`checkout`] - Order submission and the order API client
//! - [`config`] - Environment configuration
//! - [`state`] - Shared application state handed to front ends
//! - [`error`] - Crate-level error type and Sentry helpers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod state;

pub use cart::{CartError, CartEvent, CartStore, CartSummary, Subscription};
pub use checkout::{CheckoutError, CustomerInfo, OrderConfirmation, OrderGateway, checkout};
pub use config::StorefrontConfig;
pub use error::StorefrontError;
pub use state::AppState;
