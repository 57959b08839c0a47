//! HTTP middleware stack for the relay.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request span with status and latency)
//! 3. Request ID (`x-request-id`, recorded on the span and Sentry scope)
//! 4. CORS (`ALLOWED_ORIGIN`)
//! 5. Body limit (10 MiB)
//!
//! Extractors for per-request credentials and lenient JSON bodies live in
//! [`extract`].

pub mod cors;
pub mod extract;
pub mod request_id;

pub use cors::cors_layer;
pub use extract::{Credentials, JsonPayload};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
