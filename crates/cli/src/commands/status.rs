//! Project status check.
//!
//! # Usage
//!
//! ```bash
//! pod-cli check-status
//! pod-cli check-status --root ../my-store --no-save
//! ```
//!
//! Reads `.env`, `brand/`, `artworks/`, `mockups/`, the product CSVs and
//! `Cargo.lock` under the root. Nothing is sent upstream.

use std::path::Path;

use pod_relay_api::services::{ProjectScan, ScanError, save_report, scan_project};
use pod_relay_core::{StoreAnalysis, analyze};

/// Scan `root`, print the summary and analysis, optionally save the report.
///
/// # Errors
///
/// Returns `ScanError` if the root cannot be scanned or the report cannot
/// be written.
#[allow(clippy::print_stdout)]
pub fn check_status(root: &Path, save: bool) -> Result<(), ScanError> {
    tracing::info!("Checking store status in {}", root.display());

    let scan = scan_project(root)?;
    let analysis = analyze(&scan.report);

    for line in summary_lines(&scan, &analysis) {
        println!("{line}");
    }

    if save {
        let path = save_report(root, &scan.report)?;
        println!();
        println!("Report saved to {}", path.display());
    }

    Ok(())
}

fn mark(ok: bool) -> &'static str {
    if ok { "[x]" } else { "[ ]" }
}

/// Human-readable report, one line per entry.
fn summary_lines(scan: &ProjectScan, analysis: &StoreAnalysis) -> Vec<String> {
    let report = &scan.report;
    let details = &scan.details;
    let env = &report.environment;

    let mut lines = vec![
        "Store status".to_string(),
        String::new(),
        "Environment".to_string(),
        format!("  {} Shopify store", mark(env.has_shopify_store)),
        format!("  {} Shopify access token", mark(env.has_shopify_token)),
        format!("  {} Printful API key", mark(env.has_printful_key)),
        format!("  {} Theme id", mark(details.has_theme_id)),
        String::new(),
        "Brand".to_string(),
        format!("  {} Logo", mark(details.has_logo)),
        format!("  {} Favicon", mark(details.has_favicon)),
        format!("  {} Banner", mark(details.has_banner)),
        String::new(),
        "Assets".to_string(),
        format!("  Artworks: {}", report.assets.artworks),
        format!("  Mockups: {}", report.assets.mockups),
        format!("  Brand files: {}", report.assets.brand),
        String::new(),
        "Products".to_string(),
        format!("  {} Shopify product CSV", mark(report.csv_files.shopify_products)),
        format!("  {} Printful mapping CSV", mark(report.csv_files.printful_mapping)),
        format!("  {} Dependencies installed", mark(report.dependencies.installed)),
    ];

    if !report.next_steps.is_empty() {
        lines.push(String::new());
        lines.push("Next steps".to_string());
        lines.extend(report.next_steps.iter().map(|step| format!("  {step}")));
    }

    lines.push(String::new());
    lines.push(format!(
        "Completion: {}%{}",
        analysis.completion_percentage,
        if analysis.ready_for_launch {
            " (ready for launch)"
        } else {
            ""
        }
    ));
    lines.extend(analysis.recommendations.iter().map(|r| format!("  - {r}")));

    lines
}
