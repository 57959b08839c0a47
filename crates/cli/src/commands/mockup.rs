//! One-off mockup render.
//!
//! # Usage
//!
//! ```bash
//! pod-cli mockup --image-url https://cdn.example.com/design.png
//! pod-cli mockup --image-url https://cdn.example.com/design.png --product-id 71 --variant-id 4012
//! ```
//!
//! # Environment Variables
//!
//! - `PRINTFUL_API_KEY` - Fulfillment API key
//! - `MOCKUP_POLL_INTERVAL_MS` / `MOCKUP_MAX_ATTEMPTS` - Polling cadence
//!
//! Ctrl-C stops the polling loop.

use pod_relay_api::printful::{MockupRender, MockupRequest};

use super::{CommandError, load_state};

/// Render mockups for `image_url` and print their URLs.
///
/// # Errors
///
/// Returns `CommandError` if the configuration is invalid or the render
/// task fails, times out or is cancelled.
#[allow(clippy::print_stdout)]
pub async fn render(image_url: String, product_id: u64, variant_id: u64) -> Result<(), CommandError> {
    let state = load_state()?;
    let printful = state.printful();

    let request = MockupRequest {
        product_id,
        variant_id,
        ..MockupRequest::new(image_url)
    };

    let cancel = state.shutdown_token().clone();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling mockup polling");
            on_interrupt.cancel();
        }
    });

    let render = printful
        .render_mockup(
            &state.config().credentials,
            &request,
            printful.poll_policy(),
            &cancel,
        )
        .await?;

    for line in describe(&render) {
        println!("{line}");
    }
    Ok(())
}

fn describe(render: &MockupRender) -> Vec<String> {
    let mut lines = vec![format!(
        "Rendered {} mockup(s) after {} poll(s)",
        render.mockups.len(),
        render.attempts
    )];
    lines.extend(
        render
            .mockups
            .iter()
            .map(|mockup| format!("  {}: {}", mockup.placement, mockup.url)),
    );
    lines
}
