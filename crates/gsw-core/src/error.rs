//! Error types for GSW Core

use gsw_observer::ObserveError;
use std::path::PathBuf;

/// Poll loop failures
///
/// Delivery and persistence failures are logged per cycle and never surface
/// here.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// Observation failed; the loop has terminated
    #[error("observation failed: {0}")]
    Observe(#[from] ObserveError),

    /// Configuration rejected before the loop started
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Startup validation failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Snapshot path is empty
    #[error("snapshot filename must not be empty")]
    EmptySnapshotPath,

    /// Explicit kubeconfig does not exist
    #[error("kubeconfig {0} does not exist")]
    KubeconfigMissing(PathBuf),

    /// Webhook URL is not an http(s) URL
    #[error("webhook url {0:?} must start with http:// or https://")]
    InvalidWebhookUrl(String),

    /// Poll interval is zero
    #[error("poll interval must be greater than zero")]
    ZeroInterval,

    /// Notification timeout is zero
    #[error("notification timeout must be greater than zero")]
    ZeroNotifyTimeout,
}
