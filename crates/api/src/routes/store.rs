//! Store status routes.

use axum::extract::State;
use pod_relay_core::{StoreAnalysis, StoreStatusReport, analyze};
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use crate::error::RelayError;
use crate::middleware::JsonPayload;
use crate::respond::{RelayResult, success};
use crate::services::{ScanDetails, save_report, scan_project};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct StoreStatusResponse {
    pub analysis: StoreAnalysis,
    /// The posted report, echoed verbatim.
    pub report: Value,
}

/// Analyse a posted status report.
///
/// POST /api/store-status
///
/// # Errors
///
/// Returns `RelayError::BadRequest` if a known report field has the wrong
/// type.
#[instrument(skip_all)]
pub async fn store_status(JsonPayload(report): JsonPayload<Value>) -> RelayResult<StoreStatusResponse> {
    let parsed: StoreStatusReport = serde_json::from_value(report.clone())
        .map_err(|e| RelayError::BadRequest(format!("Invalid store status report: {e}")))?;

    let analysis = analyze(&parsed);
    tracing::info!(
        completion = analysis.completion_percentage,
        ready = analysis.ready_for_launch,
        "Store status analysed"
    );

    Ok(success(StoreStatusResponse { analysis, report }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckStatusResponse {
    pub analysis: StoreAnalysis,
    pub report: StoreStatusReport,
    pub details: ScanDetails,
    /// Where the report was written, if saving succeeded.
    pub saved_to: Option<String>,
}

/// Scan the configured project root, save the report and analyse it.
///
/// POST /api/run-check-status
///
/// # Errors
///
/// Returns `RelayError::StatusCheck` if the project root cannot be scanned.
#[instrument(skip_all)]
pub async fn run_check_status(State(state): State<AppState>) -> RelayResult<CheckStatusResponse> {
    let root = state.config().project_root.clone();
    tracing::info!(root = %root.display(), "Running store status check");

    let (scan, saved_to) = tokio::task::spawn_blocking(move || {
        let scan = scan_project(&root)?;
        let saved_to = match save_report(&root, &scan.report) {
            Ok(path) => Some(path.display().to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to save store status report");
                None
            }
        };
        Ok::<_, crate::services::ScanError>((scan, saved_to))
    })
    .await
    .map_err(|e| RelayError::StatusCheck(e.to_string()))?
    .map_err(|e| RelayError::StatusCheck(e.to_string()))?;

    Ok(success(CheckStatusResponse {
        analysis: analyze(&scan.report),
        report: scan.report,
        details: scan.details,
        saved_to,
    }))
}
