//! Core types for the POD relay.
//!
//! This module provides the request-scoped domain values shared by the API
//! server and the CLI.

pub mod credential;
pub mod placement;
pub mod status;
pub mod store_status;

pub use credential::CredentialSet;
pub use placement::{PlacementRect, PlacementSpec, RenderedMockup};
pub use status::*;
pub use store_status::{StoreAnalysis, StoreStatusReport, analyze};
