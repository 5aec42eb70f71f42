//! Delivery errors
//!
//! Every failure is classified so the caller can decide what to do; the poll
//! loop only logs them.

/// Notification delivery failures
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// HTTP client could not be constructed
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),

    /// Network error or timeout
    #[error("webhook request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Endpoint answered with a non-success status
    #[error("webhook returned status {code}: {body}")]
    Status {
        /// HTTP status code
        code: u16,
        /// Response body
        body: String,
    },

    /// Endpoint answered but did not acknowledge the message
    #[error("webhook did not acknowledge message: {body:?}")]
    Rejected {
        /// Response body
        body: String,
    },
}

impl DeliveryError {
    /// Check if the request ran into the transport timeout
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }
}
