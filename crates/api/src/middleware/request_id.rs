//! Request ID middleware for request tracing and correlation.
//!
//! Uses the caller's `x-request-id` when present, otherwise a UUID v4. The
//! ID is recorded on the current span, tagged on the Sentry scope and echoed
//! in the response headers.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Middleware that ensures every request has a request ID.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|id| !id.trim().is_empty())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    Span::current().record("request_id", request_id.as_str());

    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

#[cfg(test)]
mod tests {
    use axum::{Router, body::Body, http::Request as HttpRequest, middleware, routing::get};
    use tower::ServiceExt;

    use super::*;

    fn app() -> Router {
        Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(middleware::from_fn(request_id_middleware))
    }

    #[tokio::test]
    async fn test_generates_request_id() {
        let response = app()
            .oneshot(HttpRequest::get("/").body(Body::empty()).expect("request"))
            .await
            .expect("response");

        let id = response
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .expect("request id header");
        assert!(Uuid::parse_str(id).is_ok());
    }

    #[tokio::test]
    async fn test_echoes_incoming_request_id() {
        let response = app()
            .oneshot(
                HttpRequest::get("/")
                    .header(REQUEST_ID_HEADER, "edge-1234")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(
            response.headers().get(REQUEST_ID_HEADER).and_then(|v| v.to_str().ok()),
            Some("edge-1234")
        );
    }
}
