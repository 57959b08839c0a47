//! Response normalization.
//!
//! Every route answers with exactly one of:
//!
//! - `{ok: true, ...payload}`
//! - `{ok: false, error}` (rendered by [`RelayError`]'s `IntoResponse`)
//! - `{ok: true, ...placeholder, message}`, only for routes that opt in via
//!   [`or_placeholder`] and only when the failure is a missing credential of
//!   that route's own provider.

use axum::Json;
use serde::Serialize;

use crate::error::{Provider, RelayError};

/// Successful response body.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
    pub ok: bool,
    #[serde(flatten)]
    pub payload: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// What every relay handler returns.
pub type RelayResult<T> = Result<Json<Envelope<T>>, RelayError>;

/// Wrap a payload as `{ok: true, ...payload}`.
#[must_use]
pub const fn success<T>(payload: T) -> Json<Envelope<T>> {
    Json(Envelope {
        ok: true,
        payload,
        message: None,
    })
}

/// Wrap a stand-in payload as `{ok: true, ...payload, message}`.
#[must_use]
pub fn placeholder<T>(payload: T, message: impl Into<String>) -> Json<Envelope<T>> {
    Json(Envelope {
        ok: true,
        payload,
        message: Some(message.into()),
    })
}

/// Normalize an operation outcome.
///
/// # Errors
///
/// Passes the operation's error through unchanged.
pub fn normalize<T>(result: Result<T, RelayError>) -> RelayResult<T> {
    result.map(success)
}

/// Normalize an outcome, substituting `fallback` when `provider`'s
/// credentials are missing.
///
/// `fallback` returns the stand-in payload and its explanatory message.
///
/// # Errors
///
/// Any error other than `RelayError::Config(provider)` passes through.
pub fn or_placeholder<T, F>(provider: Provider, result: Result<T, RelayError>, fallback: F) -> RelayResult<T>
where
    F: FnOnce() -> (T, String),
{
    match result {
        Ok(payload) => Ok(success(payload)),
        Err(err) if err.is_config_for(provider) => {
            tracing::info!(%provider, "Credentials not configured, returning placeholder");
            let (payload, message) = fallback();
            Ok(placeholder(payload, message))
        }
        Err(err) => Err(err),
    }
}
