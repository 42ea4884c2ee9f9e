//! Shieldline Core - Shared types library.
//!
//! This crate provides common types used across all Shieldline components:
//! - `storefront` - Cart store, persistence and checkout
//! - `admin` - Contacts polling and the unread-messages notifier
//! - `cli` - Command-line driver for the cart and checkout
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for identifiers, prices, emails, statuses
//!   and cart line items

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
