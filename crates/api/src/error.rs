//! Unified error handling for relay operations.

use std::fmt;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Longest upstream body excerpt carried in an error message.
const MAX_EXCERPT_CHARS: usize = 500;

/// External platform a relay call talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    /// Commerce platform.
    Shopify,
    /// Print-fulfillment platform.
    Printful,
    /// Generative AI platform.
    OpenAi,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Shopify => "Shopify",
            Self::Printful => "Printful",
            Self::OpenAi => "OpenAI",
        })
    }
}

/// Request-level error type for every adapter and workflow.
#[derive(Debug, Error)]
pub enum RelayError {
    /// A credential the operation needs is absent.
    #[error("{}", missing_credentials_message(*.0))]
    Config(Provider),

    /// The platform answered with an error.
    #[error("{provider} API error{}: {message}", status_suffix(*.status))]
    Provider {
        provider: Provider,
        /// HTTP status, absent for GraphQL errors delivered with 200.
        status: Option<u16>,
        message: String,
        /// Structured upstream error payload (e.g. user errors), if any.
        details: Option<serde_json::Value>,
    },

    /// A staged upload step failed outside the platform's API contract.
    #[error("Upload failed: {0}")]
    Upload(String),

    /// A polling workflow exhausted its attempt ceiling.
    #[error("{task} timed out after {attempts} attempts")]
    Timeout { task: String, attempts: u32 },

    /// The fulfillment platform reported the render task as failed.
    #[error("Mockup task {task_key} failed: {reason}")]
    Render { task_key: String, reason: String },

    /// The request was cancelled (client disconnect or shutdown).
    #[error("Operation cancelled")]
    Cancelled,

    /// The platform could not be reached.
    #[error("{provider} request failed: {source}")]
    Transport {
        provider: Provider,
        #[source]
        source: reqwest::Error,
    },

    /// The local project scan could not run.
    #[error("Status check failed: {0}")]
    StatusCheck(String),

    /// Malformed caller input.
    #[error("{0}")]
    BadRequest(String),
}

impl RelayError {
    /// Build a provider error without structured details.
    pub fn provider(provider: Provider, status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider,
            status,
            message: message.into(),
            details: None,
        }
    }

    /// Build a transport error from a `reqwest` failure.
    #[must_use]
    pub const fn transport(provider: Provider, source: reqwest::Error) -> Self {
        Self::Transport { provider, source }
    }

    /// Whether this is a missing-credential error for `provider`.
    #[must_use]
    pub fn is_config_for(&self, provider: Provider) -> bool {
        matches!(self, Self::Config(p) if *p == provider)
    }

    /// HTTP status for the inbound response.
    ///
    /// Only malformed caller input maps to an error status; application
    /// failures are reported in the body.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::OK,
        }
    }

    const fn should_capture(&self) -> bool {
        matches!(
            self,
            Self::Provider { .. }
                | Self::Transport { .. }
                | Self::Render { .. }
                | Self::Upload(_)
                | Self::StatusCheck(_)
        )
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        if self.should_capture() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Relay request error"
            );
        } else if matches!(self, Self::Timeout { .. } | Self::Cancelled) {
            tracing::warn!(error = %self, "Relay request did not complete");
        } else {
            tracing::debug!(error = %self, "Relay request rejected");
        }

        let body = json!({ "ok": false, "error": self.to_string() });
        (self.status_code(), Json(body)).into_response()
    }
}

const fn missing_credentials_message(provider: Provider) -> &'static str {
    match provider {
        Provider::Shopify => "Shopify credentials not configured",
        Provider::Printful => "Printful API key not configured",
        Provider::OpenAi => "OpenAI API key not configured",
    }
}

fn status_suffix(status: Option<u16>) -> String {
    status.map_or_else(String::new, |s| format!(" ({s})"))
}

/// Truncate an upstream response body for inclusion in an error message.
pub(crate) fn body_excerpt(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(MAX_EXCERPT_CHARS) {
        Some((idx, _)) => format!("{}...", trimmed.get(..idx).unwrap_or(trimmed)),
        None => trimmed.to_string(),
    }
}
