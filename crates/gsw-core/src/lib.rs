//! GSW Core
//!
//! The poll loop of the Gardener shoot watcher.
//!
//! # Core Concepts
//!
//! - [`WatchConfig`]: snapshot path, interval and transport settings
//! - [`Watcher`]: owns the observer, notifier and store; runs cycles
//! - [`CycleReport`]: what one cycle observed, reported and persisted
//!
//! # Example
//!
//! ```rust,ignore
//! use gsw_core::{WatchConfig, Watcher};
//! use gsw_notify::LogNotifier;
//! use gsw_observer::GardenerObserver;
//! use tokio_util::sync::CancellationToken;
//!
//! let config = WatchConfig::new("db.json");
//! let observer = GardenerObserver::connect(None).await?;
//! let mut watcher = Watcher::new(&config, observer, LogNotifier)?;
//! watcher.run(CancellationToken::new()).await?;
//! ```

#![warn(unreachable_pub)]

pub mod config;
pub mod error;
mod watcher;

pub use config::{WatchConfig, DEFAULT_INTERVAL};
pub use error::{ConfigError, WatchError};
pub use watcher::{CycleKind, CycleReport, LoopState, Watcher};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
