//! Business logic services for the relay.
//!
//! # Services
//!
//! - `catalog` - Starter product catalog CSVs
//! - `design` - Trend research, prompt brainstorming and design image generation
//! - `store_scan` - Local project scan behind the store status report

pub mod catalog;
pub mod design;
pub mod store_scan;

pub use catalog::{CatalogError, CatalogFiles, write_catalog};
pub use store_scan::{ProjectScan, ScanDetails, ScanError, save_report, scan_project};
