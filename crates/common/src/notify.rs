//! Outbound notifications.
//!
//! The service only ever needs "post this text somewhere and tell me the HTTP status",
//! so the seam is a single-method trait. `SlackNotifier` is the production implementation.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notifier misconfigured: {0}")]
    Config(String),
    #[error("network error: {0}")]
    Network(String),
}

/// Posts a message and reports the HTTP status of the receiving end.
/// Failures are reported to the caller; nothing is retried.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn post(&self, message: &str) -> Result<u16, NotifyError>;
}

/// Slack incoming-webhook client.
#[derive(Clone)]
pub struct SlackNotifier {
    client: reqwest::Client,
    webhook_url: String,
}

impl SlackNotifier {
    pub fn new(webhook_url: impl Into<String>, timeout: Duration) -> Result<Self, NotifyError> {
        let webhook_url = webhook_url.into();
        if webhook_url.trim().is_empty() {
            return Err(NotifyError::Config("empty webhook url".into()));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError::Config(e.to_string()))?;
        Ok(Self { client, webhook_url })
    }
}

#[derive(serde::Serialize)]
struct SlackPayload<'a> {
    text: &'a str,
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn post(&self, message: &str) -> Result<u16, NotifyError> {
        let resp = self
            .client
            .post(&self.webhook_url)
            .json(&SlackPayload { text: message })
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "slack webhook unreachable");
                NotifyError::Network(e.to_string())
            })?;
        let status = resp.status().as_u16();
        debug!(status, "slack webhook responded");
        Ok(status)
    }
}
