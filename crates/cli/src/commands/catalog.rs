//! Starter catalog CSV export.
//!
//! # Usage
//!
//! ```bash
//! pod-cli gen-csv
//! pod-cli gen-csv --root ../my-store
//! ```
//!
//! Writes the product import CSV and the fulfillment mapping template,
//! replacing existing copies. Nothing is sent upstream.

use std::path::Path;

use pod_relay_api::services::{CatalogError, CatalogFiles, write_catalog};

/// Write both catalog CSVs under `root` and print their paths.
///
/// # Errors
///
/// Returns `CatalogError` if `root` is not a directory or a file cannot be
/// written.
#[allow(clippy::print_stdout)]
pub fn gen_csv(root: &Path) -> Result<(), CatalogError> {
    let files = write_catalog(root)?;

    for line in describe(&files) {
        println!("{line}");
    }

    Ok(())
}

fn describe(files: &CatalogFiles) -> [String; 2] {
    [
        format!("Wrote {} ({} variants)", files.products.display(), files.variants),
        format!("Wrote {}", files.mapping.display()),
    ]
}
