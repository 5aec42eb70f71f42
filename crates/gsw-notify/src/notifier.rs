//! Notifier trait and transports
//!
//! A [`Notifier`] delivers one plain-text message per call. Delivery is best
//! effort: no retry, the caller gets a classified [`DeliveryError`].

use crate::error::DeliveryError;
use async_trait::async_trait;
use gsw_model::ChangeEvent;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Default transport timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Body the webhook acknowledges a message with
const ACK_BODY: &str = "ok";

/// Delivers single-line messages to an external endpoint
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one message
    ///
    /// # Errors
    /// Returns error if the endpoint cannot be reached or does not
    /// acknowledge the message
    async fn notify(&self, message: &str) -> Result<(), DeliveryError>;

    /// Render a change event and deliver it
    ///
    /// # Errors
    /// Same as [`Notifier::notify`]
    async fn notify_event(&self, event: &ChangeEvent) -> Result<(), DeliveryError> {
        self.notify(&event.to_string()).await
    }
}

#[async_trait]
impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    async fn notify(&self, message: &str) -> Result<(), DeliveryError> {
        (**self).notify(message).await
    }
}

#[async_trait]
impl<T: Notifier + ?Sized> Notifier for Box<T> {
    async fn notify(&self, message: &str) -> Result<(), DeliveryError> {
        (**self).notify(message).await
    }
}

#[derive(Debug, Serialize)]
struct WebhookBody<'a> {
    text: &'a str,
}

/// Posts messages to a Slack-style incoming webhook
///
/// Success requires a 2xx status and the body `ok`.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    /// Create notifier with [`DEFAULT_TIMEOUT`]
    ///
    /// # Errors
    /// Returns `DeliveryError::Client` if the HTTP client cannot be built
    pub fn new(url: impl Into<String>) -> Result<Self, DeliveryError> {
        Self::with_timeout(url, DEFAULT_TIMEOUT)
    }

    /// Create notifier with an explicit transport timeout
    ///
    /// # Errors
    /// Returns `DeliveryError::Client` if the HTTP client cannot be built
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(DeliveryError::Client)?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Target URL
    #[inline]
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, message: &str) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(&self.url)
            .json(&WebhookBody { text: message })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(DeliveryError::Status {
                code: status.as_u16(),
                body,
            });
        }
        if body.trim() != ACK_BODY {
            return Err(DeliveryError::Rejected { body });
        }

        tracing::debug!(text = %message, "notification delivered");
        Ok(())
    }
}

/// Writes messages to the log instead of sending them
///
/// Used when no webhook is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, message: &str) -> Result<(), DeliveryError> {
        tracing::info!(text = %message, "notification (dry run)");
        Ok(())
    }
}
