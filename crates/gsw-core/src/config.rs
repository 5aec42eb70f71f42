//! Watcher configuration

use crate::error::ConfigError;
use gsw_notify::DEFAULT_TIMEOUT;
use std::path::PathBuf;
use std::time::Duration;

/// Default pause between cycles
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

/// Watcher configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchConfig {
    /// Snapshot file
    pub snapshot_path: PathBuf,
    /// Explicit kubeconfig; inferred when absent
    pub kubeconfig: Option<PathBuf>,
    /// Incoming webhook; notifications are only logged when absent
    pub webhook_url: Option<String>,
    /// Pause between the end of one cycle and the start of the next
    pub interval: Duration,
    /// Per-notification transport timeout
    pub notify_timeout: Duration,
}

impl WatchConfig {
    /// Create configuration for a snapshot file
    #[inline]
    #[must_use]
    pub fn new(snapshot_path: impl Into<PathBuf>) -> Self {
        Self {
            snapshot_path: snapshot_path.into(),
            ..Self::default()
        }
    }

    /// With kubeconfig path
    #[inline]
    #[must_use]
    pub fn with_kubeconfig(mut self, path: impl Into<PathBuf>) -> Self {
        self.kubeconfig = Some(path.into());
        self
    }

    /// With webhook URL
    #[inline]
    #[must_use]
    pub fn with_webhook_url(mut self, url: impl Into<String>) -> Self {
        self.webhook_url = Some(url.into());
        self
    }

    /// With poll interval
    #[inline]
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// With notification timeout
    #[inline]
    #[must_use]
    pub fn with_notify_timeout(mut self, timeout: Duration) -> Self {
        self.notify_timeout = timeout;
        self
    }

    /// Check the configuration before anything is started
    ///
    /// # Errors
    /// Returns the first violated rule as a [`ConfigError`]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.snapshot_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptySnapshotPath);
        }
        if let Some(path) = &self.kubeconfig {
            if !path.exists() {
                return Err(ConfigError::KubeconfigMissing(path.clone()));
            }
        }
        if let Some(url) = &self.webhook_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidWebhookUrl(url.clone()));
            }
        }
        if self.interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        if self.notify_timeout.is_zero() {
            return Err(ConfigError::ZeroNotifyTimeout);
        }
        Ok(())
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::new(),
            kubeconfig: None,
            webhook_url: None,
            interval: DEFAULT_INTERVAL,
            notify_timeout: DEFAULT_TIMEOUT,
        }
    }
}
