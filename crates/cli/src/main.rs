//! POD Relay CLI - Local status checks and one-off upstream runs.
//!
//! # Usage
//!
//! ```bash
//! # Scan the current project and save store_status_report.json
//! pod-cli check-status
//!
//! # Scan another directory without writing the report
//! pod-cli check-status --root ../my-store --no-save
//!
//! # Write the starter product import CSVs
//! pod-cli gen-csv
//!
//! # Upload a design to the store's file CDN
//! pod-cli upload artworks/design.png --alt "Debug mode tee"
//!
//! # Render mockups for a public image
//! pod-cli mockup --image-url https://cdn.example.com/design.png
//! ```
//!
//! # Commands
//!
//! - `check-status` - Scan the project for setup progress
//! - `gen-csv` - Write the starter catalog CSVs the status check looks for
//! - `upload` - Run the staged upload with the environment's store credentials
//! - `mockup` - Run the mockup render with the environment's fulfillment key

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pod_relay_api::printful::{DEFAULT_PRODUCT_ID, DEFAULT_VARIANT_ID};

mod commands;

#[derive(Parser)]
#[command(name = "pod-cli")]
#[command(author, version, about = "POD relay CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a project directory and report setup progress
    CheckStatus {
        /// Project root to scan
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Print the report without writing `store_status_report.json`
        #[arg(long)]
        no_save: bool,
    },
    /// Write the starter product import and mapping CSVs
    GenCsv {
        /// Directory to write the CSVs into
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
    },
    /// Upload an image file to the store
    Upload {
        /// Image file to upload
        file: PathBuf,

        /// Alt text for the uploaded file
        #[arg(long)]
        alt: Option<String>,
    },
    /// Render product mockups for a public image URL
    Mockup {
        /// Public URL of the design image
        #[arg(long)]
        image_url: String,

        /// Catalog product id
        #[arg(long, default_value_t = DEFAULT_PRODUCT_ID)]
        product_id: u64,

        /// Catalog variant id
        #[arg(long, default_value_t = DEFAULT_VARIANT_ID)]
        variant_id: u64,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::CheckStatus { root, no_save } => {
            commands::status::check_status(&root, !no_save)?;
        }
        Commands::GenCsv { root } => commands::catalog::gen_csv(&root)?,
        Commands::Upload { file, alt } => commands::upload::upload_file(&file, alt).await?,
        Commands::Mockup {
            image_url,
            product_id,
            variant_id,
        } => commands::mockup::render(image_url, product_id, variant_id).await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_mockup_defaults() {
        let cli = Cli::try_parse_from(["pod-cli", "mockup", "--image-url", "https://cdn.example/a.png"])
            .expect("parse");
        match cli.command {
            Commands::Mockup {
                image_url,
                product_id,
                variant_id,
            } => {
                assert_eq!(image_url, "https://cdn.example/a.png");
                assert_eq!(product_id, 71);
                assert_eq!(variant_id, 4012);
            }
            _ => panic!("expected mockup command"),
        }
    }

    #[test]
    fn test_gen_csv_root() {
        let cli = Cli::try_parse_from(["pod-cli", "gen-csv"]).expect("parse");
        match cli.command {
            Commands::GenCsv { root } => assert_eq!(root, PathBuf::from(".")),
            _ => panic!("expected gen-csv command"),
        }
    }

    #[test]
    fn test_check_status_flags() {
        let cli = Cli::try_parse_from(["pod-cli", "check-status", "--root", "shop", "--no-save"])
            .expect("parse");
        match cli.command {
            Commands::CheckStatus { root, no_save } => {
                assert_eq!(root, PathBuf::from("shop"));
                assert!(no_save);
            }
            _ => panic!("expected check-status command"),
        }
    }
}
