//! Core types for Shieldline.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod line_item;
pub mod price;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use line_item::{CartItem, CartLineItem};
pub use price::{Price, PriceError, format_amount};
pub use status::*;
