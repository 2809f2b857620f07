//! Discord-style webhook forwarder.
//!
//! Posts the envelope as JSON to the configured URL with a shared
//! `reqwest::Client`. No retries and no timeout beyond the client defaults.

use std::fmt;

use async_trait::async_trait;
use reqwest::Url;

use super::{ForwardError, Forwarder};
use crate::config::redact_url;
use crate::models::Envelope;

/// Forwards envelopes to a single webhook URL.
#[derive(Clone)]
pub struct WebhookForwarder {
    client: reqwest::Client,
    url: Url,
}

impl fmt::Debug for WebhookForwarder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookForwarder")
            .field("url", &redact_url(&self.url))
            .finish()
    }
}

impl WebhookForwarder {
    /// Build a forwarder with a default HTTP client.
    pub fn new(url: Url) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("formrelay/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, url))
    }

    /// Build a forwarder around an existing client.
    pub fn with_client(client: reqwest::Client, url: Url) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl Forwarder for WebhookForwarder {
    async fn forward(&self, envelope: &Envelope) -> Result<(), ForwardError> {
        let response = self
            .client
            .post(self.url.clone())
            .header("Content-Type", "application/json")
            .json(envelope)
            .send()
            .await
            .map_err(|e| ForwardError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ForwardError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}
