//! HTTP route handlers for the relay.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Service info and configured defaults
//!
//! # Catalog
//! GET  /api/config             - Design style constants and integration flags
//! GET  /api/channels           - Sales channels with enabled flags
//!
//! # Design (AI)
//! POST /api/trends             - Design trends for a niche
//! POST /api/prompts            - Design prompts for a niche and style
//! POST /api/generate-design    - Design image from a prompt
//!
//! # Media
//! POST /api/upload-image       - Staged upload to the store's file CDN
//! POST /api/mockup             - Product mockup render
//!
//! # Listings
//! POST /api/listing            - Create a draft product
//! POST /api/publish            - Activate a draft product
//!
//! # Store status
//! POST /api/store-status       - Analyse a posted status report
//! POST /api/run-check-status   - Scan the project root and analyse it
//! ```
//!
//! Every response carries `ok`; see [`crate::respond`].

pub mod design;
pub mod health;
pub mod listing;
pub mod media;
pub mod store;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the API routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/config", get(health::config))
        .route("/channels", get(health::channels))
        .route("/trends", post(design::trends))
        .route("/prompts", post(design::prompts))
        .route("/generate-design", post(design::generate_design))
        .route("/upload-image", post(media::upload_image))
        .route("/mockup", post(media::mockup))
        .route("/listing", post(listing::create))
        .route("/publish", post(listing::publish))
        .route("/store-status", post(store::store_status))
        .route("/run-check-status", post(store::run_check_status))
}

/// Create the full router: `/health` plus everything under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .nest("/api", api_routes())
}
