//! Forwarding submissions to the destination webhook.
//!
//! [`Forwarder`] is the seam between the HTTP handler and the outbound
//! call, so the handler can be exercised without a network. [`submit`]
//! is the whole relay operation: reshape, forward once, and collapse the
//! result into a [`RelayOutcome`] that carries no error detail.

pub mod webhook;

use async_trait::async_trait;
use axum::http::StatusCode;
use thiserror::Error;

use crate::models::{Envelope, Submission, build_envelope};

pub use webhook::WebhookForwarder;

/// Errors from a single delivery attempt.
#[derive(Error, Debug)]
pub enum ForwardError {
    #[error("destination returned HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("request to destination failed: {0}")]
    Transport(String),
}

/// Delivers an envelope to the destination.
#[async_trait]
pub trait Forwarder: Send + Sync {
    /// Send the envelope once. Any non-2xx answer is a [`ForwardError::Rejected`].
    async fn forward(&self, envelope: &Envelope) -> Result<(), ForwardError>;
}

/// What the browser-side caller is told about a relay attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Destination accepted the message.
    Delivered,
    /// Destination answered with a non-success status.
    Rejected,
    /// Destination could not be reached.
    Failed,
}

impl RelayOutcome {
    pub fn status_code(self) -> StatusCode {
        match self {
            RelayOutcome::Delivered => StatusCode::NO_CONTENT,
            RelayOutcome::Rejected => StatusCode::BAD_GATEWAY,
            RelayOutcome::Failed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<&Result<(), ForwardError>> for RelayOutcome {
    fn from(result: &Result<(), ForwardError>) -> Self {
        match result {
            Ok(()) => RelayOutcome::Delivered,
            Err(ForwardError::Rejected { .. }) => RelayOutcome::Rejected,
            Err(ForwardError::Transport(_)) => RelayOutcome::Failed,
        }
    }
}

/// Relay one submission. Failures are logged here and nowhere else.
pub async fn submit(forwarder: &dyn Forwarder, submission: &Submission) -> RelayOutcome {
    let envelope = build_envelope(submission);
    tracing::debug!(
        keys = submission.len(),
        fallback = envelope.is_fallback(),
        "forwarding submission"
    );

    let result = forwarder.forward(&envelope).await;
    match &result {
        Ok(()) => {}
        Err(ForwardError::Rejected { status, body }) => {
            tracing::error!(status, body = %body, "destination returned an error");
        }
        Err(err @ ForwardError::Transport(_)) => {
            tracing::error!(error = %err, "proxy error");
        }
    }
    RelayOutcome::from(&result)
}
