//! GSW Notify
//!
//! Formats change events as plain-text messages and hands them to a
//! transport. Delivery is best effort and never retried.
//!
//! # Example
//!
//! ```rust,ignore
//! use gsw_notify::{Notifier, WebhookNotifier};
//!
//! let notifier = WebhookNotifier::new("https://hooks.slack.com/services/T000/B000/XXXX")?;
//! notifier.notify_event(&event).await?;
//! ```

#![warn(unreachable_pub)]

pub mod error;
mod notifier;

pub use error::DeliveryError;
pub use notifier::{LogNotifier, Notifier, WebhookNotifier, DEFAULT_TIMEOUT};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
