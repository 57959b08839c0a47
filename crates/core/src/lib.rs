//! POD Relay Core - Shared types library.
//!
//! This crate provides common types used across the relay components:
//! - `api` - JSON relay server in front of the commerce, fulfillment and AI platforms
//! - `cli` - Command-line tools for local status checks and one-off uploads/renders
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Credentials and their resolver, placement geometry, task
//!   statuses, and the store-status report with its analysis

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
