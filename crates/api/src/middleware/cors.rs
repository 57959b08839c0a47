//! CORS policy built from `ALLOWED_ORIGIN`.

use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::AllowedOrigin;

/// Credential override headers browsers must be allowed to send.
const OVERRIDE_HEADERS: [&str; 4] = [
    "x-shopify-store",
    "x-shopify-token",
    "x-printful-key",
    "x-openai-key",
];

/// Build the CORS layer.
///
/// `*` allows any origin. Otherwise only the exact configured origin is
/// echoed back; other origins get no CORS headers. Credentials are never
/// allowed.
#[must_use]
pub fn cors_layer(allowed: &AllowedOrigin) -> CorsLayer {
    let mut headers = vec![
        header::CONTENT_TYPE,
        header::AUTHORIZATION,
        header::HeaderName::from_static("x-request-id"),
    ];
    headers.extend(OVERRIDE_HEADERS.map(header::HeaderName::from_static));

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(headers);

    match allowed {
        AllowedOrigin::Any => layer.allow_origin(Any),
        AllowedOrigin::Exact(origin) => match HeaderValue::from_str(origin) {
            Ok(value) => layer.allow_origin(AllowOrigin::list([value])),
            Err(_) => {
                tracing::warn!(origin = %origin, "ALLOWED_ORIGIN is not a valid header value, rejecting all origins");
                layer.allow_origin(AllowOrigin::list(std::iter::empty()))
            }
        },
    }
}
