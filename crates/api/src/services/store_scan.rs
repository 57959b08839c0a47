//! Local project scan producing a [`StoreStatusReport`].
//!
//! Looks at `.env`, `brand/`, `artworks/`, `mockups/`, the product CSVs and
//! `Cargo.lock` under a project root. The scan is synchronous; async
//! callers run it on the blocking pool.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use pod_relay_core::types::store_status::{
    AssetCounts, CsvFiles, DependencyStatus, EnvironmentStatus,
};
use pod_relay_core::StoreStatusReport;
use serde::Serialize;
use thiserror::Error;

use super::catalog::{PRINTFUL_MAPPING_CSV, SHOPIFY_IMPORT_CSV};

/// File the report is written to, relative to the project root.
pub const REPORT_FILE: &str = "store_status_report.json";

/// Present once the workspace dependencies have been resolved.
const LOCK_FILE: &str = "Cargo.lock";
const PRINTFUL_SAMPLE_KEY: &str = "pf_xxx";
const SAMPLE_THEME_ID: &str = "123456789";
const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];
const SAMPLE_LIMIT: usize = 3;

/// Errors from scanning or saving.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("project root {0} is not a directory")]
    NotADirectory(PathBuf),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },

    #[error("failed to write report: {0}")]
    Write(#[from] io::Error),

    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Checks that only the terminal summary shows.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanDetails {
    pub has_theme_id: bool,
    pub brand_exists: bool,
    pub has_logo: bool,
    pub has_favicon: bool,
    pub has_banner: bool,
    pub artworks_exist: bool,
    pub mockups_exist: bool,
    /// First few artwork file names, sorted.
    pub sample_artworks: Vec<String>,
}

/// A report together with its display details.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectScan {
    pub report: StoreStatusReport,
    pub details: ScanDetails,
}

/// Scan the project at `root`.
///
/// # Errors
///
/// Returns `ScanError::NotADirectory` if `root` is not a directory, and
/// `ScanError::Read`/`ScanError::EnvFile` if a present file or folder
/// cannot be read.
pub fn scan_project(root: &Path) -> Result<ProjectScan, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    let env_path = root.join(".env");
    let env = if env_path.is_file() {
        Some(read_env_file(&env_path)?)
    } else {
        None
    };

    let brand = list_dir(&root.join("brand"))?;
    let artworks = list_dir(&root.join("artworks"))?;
    let mockups = list_dir(&root.join("mockups"))?;

    let artwork_images = images(artworks.as_deref());
    let mockup_images = images(mockups.as_deref());

    let environment = env.as_ref().map_or_else(EnvironmentStatus::default, |vars| {
        EnvironmentStatus {
            configured: true,
            has_shopify_store: has_value(vars, "SHOPIFY_STORE"),
            has_shopify_token: has_value(vars, "SHOPIFY_ACCESS_TOKEN"),
            has_printful_key: has_value(vars, "PRINTFUL_API_KEY")
                && vars.get("PRINTFUL_API_KEY").map(String::as_str) != Some(PRINTFUL_SAMPLE_KEY),
        }
    });
    let has_theme_id = env.as_ref().is_some_and(|vars| {
        has_value(vars, "THEME_ID") && vars.get("THEME_ID").map(String::as_str) != Some(SAMPLE_THEME_ID)
    });

    let brand_names = brand.as_deref().unwrap_or_default();
    let brand_has = |needle: &str| {
        brand_names
            .iter()
            .any(|name| name.to_lowercase().contains(needle))
    };

    let details = ScanDetails {
        has_theme_id,
        brand_exists: brand.is_some(),
        has_logo: brand_has("logo"),
        has_favicon: brand_has("favicon"),
        has_banner: brand_has("banner") || brand_has("hero"),
        artworks_exist: artworks.is_some(),
        mockups_exist: mockups.is_some(),
        sample_artworks: artwork_images.iter().take(SAMPLE_LIMIT).cloned().collect(),
    };

    let mut report = StoreStatusReport {
        timestamp: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        environment,
        assets: AssetCounts {
            artworks: count(&artwork_images),
            mockups: count(&mockup_images),
            brand: count(brand_names),
        },
        dependencies: DependencyStatus {
            installed: root.join(LOCK_FILE).is_file(),
        },
        csv_files: CsvFiles {
            shopify_products: root.join(SHOPIFY_IMPORT_CSV).is_file(),
            printful_mapping: root.join(PRINTFUL_MAPPING_CSV).is_file(),
        },
        next_steps: Vec::new(),
    };
    report.next_steps = next_steps(&report, artworks.as_deref(), brand.as_deref());

    Ok(ProjectScan { report, details })
}

/// Write `report` as pretty JSON to `{root}/store_status_report.json`.
///
/// # Errors
///
/// Returns `ScanError::Serialize` or `ScanError::Write` on failure.
pub fn save_report(root: &Path, report: &StoreStatusReport) -> Result<PathBuf, ScanError> {
    let path = root.join(REPORT_FILE);
    let json = serde_json::to_string_pretty(report)?;
    fs::write(&path, json)?;
    Ok(path)
}

/// Ordered, numbered setup steps still outstanding.
fn next_steps(
    report: &StoreStatusReport,
    artworks: Option<&[String]>,
    brand: Option<&[String]>,
) -> Vec<String> {
    let mut steps: Vec<String> = Vec::new();
    let mut push = |text: &str| {
        let n = steps.len() + 1;
        steps.push(format!("{n}. {text}"));
    };

    let env = &report.environment;
    if !(env.configured && env.has_shopify_store && env.has_shopify_token) {
        push("Configure .env file with your Shopify and Printful credentials");
    }

    if !report.dependencies.installed {
        push("Fetch dependencies: cargo fetch");
    }

    if artworks.is_none_or(<[String]>::is_empty) {
        push("Add your product artwork PNGs to the 'artworks' folder");
    }

    if brand.is_none_or(|files| files.len() < 3) {
        push("Add logo, favicon, and banner to 'brand' folder");
    }

    if !(report.csv_files.shopify_products && report.csv_files.printful_mapping) {
        push("Generate product CSVs: pod-cli gen-csv");
    }

    if env.configured && report.assets.mockups == 0 {
        push("Render product mockups: pod-cli mockup --image-url <artwork URL>");
    }

    steps
}

fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ScanError> {
    let to_error = |source| ScanError::EnvFile {
        path: path.to_path_buf(),
        source,
    };

    dotenvy::from_path_iter(path)
        .map_err(to_error)?
        .collect::<Result<HashMap<_, _>, _>>()
        .map_err(to_error)
}

/// File names in `dir`, sorted; `None` if the folder does not exist.
fn list_dir(dir: &Path) -> Result<Option<Vec<String>>, ScanError> {
    if !dir.is_dir() {
        return Ok(None);
    }

    let to_error = |source| ScanError::Read {
        path: dir.to_path_buf(),
        source,
    };

    let mut names = fs::read_dir(dir)
        .map_err(to_error)?
        .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(to_error)?;
    names.sort();

    Ok(Some(names))
}

fn images(names: Option<&[String]>) -> Vec<String> {
    names
        .unwrap_or_default()
        .iter()
        .filter(|name| is_image(name))
        .cloned()
        .collect()
}

fn is_image(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

fn has_value(vars: &HashMap<String, String>, key: &str) -> bool {
    vars.get(key).is_some_and(|v| !v.trim().is_empty())
}

fn count(items: &[String]) -> u32 {
    u32::try_from(items.len()).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use pod_relay_core::analyze;

    use super::*;

    /// Temporary project directory removed on drop.
    struct TempProject(PathBuf);

    impl TempProject {
        fn new() -> Self {
            let path = std::env::temp_dir().join(format!("pod-relay-scan-{}", uuid::Uuid::new_v4()));
            fs::create_dir_all(&path).expect("create temp dir");
            Self(path)
        }

        fn write(&self, relative: &str, contents: &str) {
            let path = self.0.join(relative);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).expect("create parent");
            }
            fs::write(path, contents).expect("write file");
        }
    }

    impl Drop for TempProject {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.0);
        }
    }

    #[test]
    fn test_scan_empty_project() {
        let project = TempProject::new();

        let scan = scan_project(&project.0).expect("scan");

        assert!(!scan.report.environment.configured);
        assert_eq!(scan.report.assets, AssetCounts::default());
        assert!(!scan.details.brand_exists);
        assert_eq!(
            scan.report.next_steps,
            vec![
                "1. Configure .env file with your Shopify and Printful credentials",
                "2. Fetch dependencies: cargo fetch",
                "3. Add your product artwork PNGs to the 'artworks' folder",
                "4. Add logo, favicon, and banner to 'brand' folder",
                "5. Generate product CSVs: pod-cli gen-csv",
            ]
        );
        assert!(scan.report.timestamp.is_some());
    }

    #[test]
    fn test_scan_configured_project() {
        let project = TempProject::new();
        project.write(
            ".env",
            "SHOPIFY_STORE=dev-mode.myshopify.com\nSHOPIFY_ACCESS_TOKEN=shpat_abc\nPRINTFUL_API_KEY=pf_xxx\nTHEME_ID=987\n",
        );
        project.write("brand/logo.svg", "<svg/>");
        project.write("brand/Favicon.ico", "");
        project.write("brand/hero-banner.png", "");
        project.write("artworks/a.png", "");
        project.write("artworks/b.JPG", "");
        project.write("artworks/c.jpeg", "");
        project.write("artworks/d.png", "");
        project.write("artworks/notes.txt", "");
        project.write("mockups/front.jpg", "");
        project.write(SHOPIFY_IMPORT_CSV, "Handle,Title\n");
        project.write("Cargo.lock", "version = 4\n");

        let scan = scan_project(&project.0).expect("scan");
        let report = &scan.report;

        assert!(report.environment.configured);
        assert!(report.environment.has_shopify_store);
        assert!(report.environment.has_shopify_token);
        assert!(!report.environment.has_printful_key);
        assert!(scan.details.has_theme_id);
        assert!(scan.details.has_logo && scan.details.has_favicon && scan.details.has_banner);
        assert_eq!(
            report.assets,
            AssetCounts {
                artworks: 4,
                mockups: 1,
                brand: 3
            }
        );
        assert_eq!(scan.details.sample_artworks, vec!["a.png", "b.JPG", "c.jpeg"]);
        assert!(report.dependencies.installed);
        assert!(report.csv_files.shopify_products);
        assert!(!report.csv_files.printful_mapping);
        assert_eq!(
            report.next_steps,
            vec!["1. Generate product CSVs: pod-cli gen-csv"]
        );

        let analysis = analyze(report);
        assert_eq!(analysis.completion_percentage, 100);
        assert!(analysis.ready_for_launch);
    }

    #[test]
    fn test_scan_complete_project_suggests_mockups() {
        let project = TempProject::new();
        project.write(".env", "SHOPIFY_STORE=dev-mode\nSHOPIFY_ACCESS_TOKEN=shpat_abc\n");
        project.write("Cargo.lock", "version = 4\n");
        project.write("brand/logo.png", "");
        project.write("brand/favicon.png", "");
        project.write("brand/banner.png", "");
        project.write("artworks/a.png", "");
        crate::services::catalog::write_catalog(&project.0).expect("write catalog");

        let scan = scan_project(&project.0).expect("scan");

        assert!(scan.report.csv_files.shopify_products);
        assert!(scan.report.csv_files.printful_mapping);
        assert_eq!(
            scan.report.next_steps,
            vec!["1. Render product mockups: pod-cli mockup --image-url <artwork URL>"]
        );
    }

    #[test]
    fn test_scan_blank_values_are_not_configured() {
        let project = TempProject::new();
        project.write(".env", "SHOPIFY_STORE=\nSHOPIFY_ACCESS_TOKEN=   \nTHEME_ID=123456789\n");

        let scan = scan_project(&project.0).expect("scan");

        assert!(scan.report.environment.configured);
        assert!(!scan.report.environment.has_shopify_store);
        assert!(!scan.report.environment.has_shopify_token);
        assert!(!scan.details.has_theme_id);
    }

    #[test]
    fn test_scan_missing_root() {
        let missing = std::env::temp_dir().join(format!("pod-relay-missing-{}", uuid::Uuid::new_v4()));
        assert!(matches!(scan_project(&missing), Err(ScanError::NotADirectory(_))));
    }

    #[test]
    fn test_save_report() {
        let project = TempProject::new();
        let scan = scan_project(&project.0).expect("scan");

        let path = save_report(&project.0, &scan.report).expect("save");

        let saved: StoreStatusReport =
            serde_json::from_str(&fs::read_to_string(path).expect("read")).expect("parse");
        assert_eq!(saved, scan.report);
    }
}
