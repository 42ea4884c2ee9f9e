//! Shieldline admin library.
//!
//! Back-office pieces that run alongside the storefront:
//!
//! - [`contacts`]: client for the contact-form messages endpoint
//! - [`notifier`]: periodic poller that tracks unread messages
//!
//! The `shieldline-admin` binary wires these together with Sentry and
//! structured logging.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod contacts;
pub mod notifier;

pub use config::{AdminConfig, ConfigError};
pub use contacts::{ContactMessage, ContactsClient, ContactsError, ContactsSource};
pub use notifier::{PollOutcome, PollReport, RECENT_LIMIT, UnreadNotifier};
