//! Local store setup report and its launch-readiness analysis.
//!
//! The report is produced by scanning a project directory (see the CLI's
//! `check-status` command) or posted by a client. Every field defaults, so a
//! partial report still analyses.

use serde::{Deserialize, Serialize};

/// Completion percentage at which a store counts as ready for launch.
pub const READY_THRESHOLD: u8 = 80;

/// Point-in-time snapshot of a local store setup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreStatusReport {
    /// ISO 8601 time the scan ran.
    pub timestamp: Option<String>,
    pub environment: EnvironmentStatus,
    pub assets: AssetCounts,
    pub dependencies: DependencyStatus,
    pub csv_files: CsvFiles,
    /// Human-readable next steps computed by the scanner.
    pub next_steps: Vec<String>,
}

/// Environment file checks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnvironmentStatus {
    /// A `.env` file exists.
    pub configured: bool,
    pub has_shopify_store: bool,
    pub has_shopify_token: bool,
    pub has_printful_key: bool,
}

/// Counts of local asset files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetCounts {
    pub artworks: u32,
    pub mockups: u32,
    pub brand: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DependencyStatus {
    pub installed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CsvFiles {
    pub shopify_products: bool,
    pub printful_mapping: bool,
}

/// Launch-readiness verdict for a [`StoreStatusReport`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreAnalysis {
    /// 0-100.
    pub completion_percentage: u8,
    pub ready_for_launch: bool,
    pub missing_steps: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Score a report.
///
/// Weights: environment file 20, artworks 30, mockups 20, dependencies 10,
/// commerce credentials 20.
#[must_use]
pub fn analyze(report: &StoreStatusReport) -> StoreAnalysis {
    let mut completion: u8 = 0;
    let mut missing_steps = Vec::new();

    if report.environment.configured {
        completion += 20;
    } else {
        missing_steps.push("Configure environment variables".to_string());
    }

    if report.assets.artworks > 0 {
        completion += 30;
    } else {
        missing_steps.push("Add artwork files".to_string());
    }

    if report.assets.mockups > 0 {
        completion += 20;
    } else {
        missing_steps.push("Generate product mockups".to_string());
    }

    if report.dependencies.installed {
        completion += 10;
    }

    if report.environment.has_shopify_store && report.environment.has_shopify_token {
        completion += 20;
    } else {
        missing_steps.push("Configure Shopify credentials".to_string());
    }

    let ready_for_launch = completion >= READY_THRESHOLD;

    let recommendations = if ready_for_launch {
        Vec::new()
    } else {
        missing_steps
            .iter()
            .map(|step| format!("Complete: {step}"))
            .chain([
                "Run 'pod-cli gen-csv' to generate the product import CSVs".to_string(),
                "Run 'pod-cli upload brand/banner.png' to add a hero banner".to_string(),
            ])
            .collect()
    };

    StoreAnalysis {
        completion_percentage: completion,
        ready_for_launch,
        missing_steps,
        recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_report() -> StoreStatusReport {
        StoreStatusReport {
            environment: EnvironmentStatus {
                configured: true,
                has_shopify_store: true,
                has_shopify_token: true,
                has_printful_key: true,
            },
            assets: AssetCounts {
                artworks: 12,
                mockups: 4,
                brand: 3,
            },
            dependencies: DependencyStatus { installed: true },
            ..StoreStatusReport::default()
        }
    }

    #[test]
    fn test_empty_report_scores_zero() {
        let analysis = analyze(&StoreStatusReport::default());

        assert_eq!(analysis.completion_percentage, 0);
        assert!(!analysis.ready_for_launch);
        assert_eq!(analysis.missing_steps.len(), 4);
        // Each missing step plus the two setup hints
        assert_eq!(analysis.recommendations.len(), 6);
        assert_eq!(
            analysis.recommendations.first().map(String::as_str),
            Some("Complete: Configure environment variables")
        );
    }

    #[test]
    fn test_complete_report_is_ready() {
        let analysis = analyze(&complete_report());

        assert_eq!(analysis.completion_percentage, 100);
        assert!(analysis.ready_for_launch);
        assert!(analysis.missing_steps.is_empty());
        assert!(analysis.recommendations.is_empty());
    }

    #[test]
    fn test_threshold_is_inclusive() {
        // Everything but mockups: 20 + 30 + 10 + 20 = 80
        let mut report = complete_report();
        report.assets.mockups = 0;

        let analysis = analyze(&report);
        assert_eq!(analysis.completion_percentage, 80);
        assert!(analysis.ready_for_launch);
        assert_eq!(analysis.missing_steps, vec!["Generate product mockups"]);
        assert!(analysis.recommendations.is_empty());
    }

    #[test]
    fn test_dependencies_never_add_a_missing_step() {
        let mut report = complete_report();
        report.dependencies.installed = false;

        let analysis = analyze(&report);
        assert_eq!(analysis.completion_percentage, 90);
        assert!(analysis.missing_steps.is_empty());
    }

    #[test]
    fn test_partial_json_report_deserializes() {
        let report: StoreStatusReport =
            serde_json::from_str(r#"{"assets": {"artworks": 2}, "environment": {"configured": true}}"#)
                .expect("deserialize");

        assert_eq!(report.assets.artworks, 2);
        assert!(report.environment.configured);
        assert_eq!(analyze(&report).completion_percentage, 50);
    }
}
