//! POD Relay API library.
//!
//! A JSON relay that sits between the creator studio front end and three
//! upstream platforms: the commerce store (Shopify), the print-on-demand
//! fulfillment service (Printful) and the generative AI service (`OpenAI`).
//!
//! Credentials come from the process environment and may be overridden per
//! request with `x-shopify-store`, `x-shopify-token`, `x-printful-key` and
//! `x-openai-key` headers. Routes whose upstream is not configured answer with
//! clearly-labelled placeholder data instead of failing.
//!
//! The router is built by [`app`] so that the binary and the integration
//! tests serve exactly the same stack.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod openai;
pub mod poll;
pub mod printful;
pub mod respond;
pub mod routes;
pub mod services;
pub mod shopify;
pub mod state;

use axum::{Router, extract::DefaultBodyLimit};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::state::AppState;

/// Largest accepted request body. Inline base64 images dominate.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Build the relay router with its middleware stack.
///
/// Sentry layers are not included; the binary adds them outermost.
pub fn app(state: AppState) -> Router {
    let cors = middleware::cors_layer(&state.config().allowed_origin);

    routes::routes()
        .with_state(state)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .layer(cors)
}
