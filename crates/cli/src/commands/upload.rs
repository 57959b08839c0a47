//! One-off staged upload.
//!
//! # Usage
//!
//! ```bash
//! pod-cli upload artworks/design.png --alt "Debug mode tee"
//! ```
//!
//! # Environment Variables
//!
//! - `SHOPIFY_STORE` - Store domain
//! - `SHOPIFY_ACCESS_TOKEN` - Admin API access token

use std::path::Path;

use pod_relay_api::shopify::{UploadAsset, UploadOutcome};

use super::{CommandError, load_state};

/// Upload `file` to the store's file CDN and print where it landed.
///
/// # Errors
///
/// Returns `CommandError` if the file cannot be read, the configuration is
/// invalid, or any upload step fails.
#[allow(clippy::print_stdout)]
pub async fn upload_file(file: &Path, alt: Option<String>) -> Result<(), CommandError> {
    let bytes = tokio::fs::read(file).await.map_err(|source| CommandError::Read {
        path: file.display().to_string(),
        source,
    })?;
    let filename = file
        .file_name()
        .map_or_else(|| "upload".to_string(), |name| name.to_string_lossy().into_owned());

    let state = load_state()?;
    let asset = UploadAsset::from_bytes(bytes, filename).with_alt(alt);
    tracing::info!("Uploading {} ({} bytes)", asset.filename, asset.bytes.len());

    let outcome = state
        .shopify()
        .upload(&state.config().credentials, asset)
        .await?;

    println!("{}", describe(&outcome));
    Ok(())
}

fn describe(outcome: &UploadOutcome) -> String {
    let file = outcome.file();
    match outcome.public_url() {
        Some(url) => format!("Uploaded {}: {url}", file.remote_id),
        None => format!("Uploaded {}: processing", file.remote_id),
    }
}
