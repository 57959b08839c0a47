//! Starter product catalog exported as CSV.
//!
//! Produces two files under a project root:
//!
//! - `Shopify_DevMode_ProductImport.csv` in the store's product import
//!   format, one row per variant
//! - `DevMode_Printful_Mapping_Template.csv` with one row per variant and
//!   empty fulfillment columns to fill in by hand
//!
//! The catalog is fixed: mugs, tees and hoodies with their option matrices.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use thiserror::Error;

/// Product import file, relative to the project root.
pub const SHOPIFY_IMPORT_CSV: &str = "Shopify_DevMode_ProductImport.csv";

/// Fulfillment mapping template, relative to the project root.
pub const PRINTFUL_MAPPING_CSV: &str = "DevMode_Printful_Mapping_Template.csv";

const VENDOR: &str = "Dev Mode";
const TAGS: &str =
    "developer, coding, AI, software engineer, geek, humor, coffee, devmode, dark mode, tech gift";

const APPAREL_SIZES: &[&str] = &["S", "M", "L", "XL", "2XL"];

const IMPORT_HEADERS: [&str; 32] = [
    "Handle",
    "Title",
    "Body (HTML)",
    "Vendor",
    "Type",
    "Tags",
    "Published",
    "Option1 Name",
    "Option1 Value",
    "Option2 Name",
    "Option2 Value",
    "Option3 Name",
    "Option3 Value",
    "Variant SKU",
    "Variant Grams",
    "Variant Inventory Tracker",
    "Variant Inventory Qty",
    "Variant Inventory Policy",
    "Variant Fulfillment Service",
    "Variant Price",
    "Variant Compare At Price",
    "Variant Requires Shipping",
    "Variant Taxable",
    "Variant Barcode",
    "Image Src",
    "Image Position",
    "Image Alt Text",
    "Gift Card",
    "SEO Title",
    "SEO Description",
    "Variant Weight Unit",
    "Status",
];

const MAPPING_HEADERS: [&str; 13] = [
    "Handle",
    "Title",
    "Type",
    "Opt1 Name",
    "Opt1 Value",
    "Opt2 Name",
    "Opt2 Value",
    "Variant Label",
    "Printful Product ID",
    "Printful Variant ID",
    "Mockup File",
    "Artwork File",
    "Notes",
];

/// Errors from writing the catalog files.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("project root {0} is not a directory")]
    NotADirectory(PathBuf),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// One product option axis, e.g. `Size: S, M, L`.
#[derive(Debug, Clone, Copy)]
struct OptionAxis {
    name: &'static str,
    values: &'static [&'static str],
}

/// A product type and the titles sold in it.
#[derive(Debug, Clone, Copy)]
struct ProductLine {
    product_type: &'static str,
    titles: &'static [&'static str],
    /// Outer loop axis; its value comes first in the variant label.
    first: OptionAxis,
    second: OptionAxis,
    /// Price and compare-at price in cents.
    price_cents: i64,
    compare_at_cents: i64,
    body_html: &'static str,
    seo_title_suffix: &'static str,
    seo_description: &'static str,
}

fn product_lines() -> [ProductLine; 3] {
    [
        ProductLine {
            product_type: "Mug",
            titles: &[
                "Code. Coffee. Repeat. Mug",
                "In Dev Mode Mug",
                "Artificially Intelligent Mug",
                "Ship It Friday Mug",
                "I Have No Bugs — Just Features Mug",
                "Hello World Mug",
                "AI Wrote This Mug",
                "Dark Mode Everything Mug",
                "sudo make me a coffee Mug",
                "404 Sleep Not Found Mug",
            ],
            first: OptionAxis {
                name: "Size",
                values: &["11oz", "15oz"],
            },
            second: OptionAxis {
                name: "Color",
                values: &["Black", "White"],
            },
            price_cents: 1995,
            compare_at_cents: 2495,
            body_html: "<p>Minimalist developer mug with monospaced design. Dishwasher and microwave safe. Handle-left orientation. Brand: Dev Mode.</p>",
            seo_title_suffix: "Dev Mode Mug for Programmers",
            seo_description: "Clean monospaced design for coders and AI lovers. Printed on demand in the USA. Perfect gift for developers.",
        },
        ProductLine {
            product_type: "T-Shirt",
            titles: &[
                "Hello World T-Shirt",
                "AI Wrote This Shirt T-Shirt",
                "Dark Mode Everything T-Shirt",
                "sudo make me a coffee T-Shirt",
                "404 Sleep Not Found T-Shirt",
                "Code. Coffee. Repeat. T-Shirt",
                "In Dev Mode T-Shirt",
                "Artificially Intelligent T-Shirt",
                "Ship It Friday T-Shirt",
                "I Have No Bugs — Just Features T-Shirt",
            ],
            first: OptionAxis {
                name: "Color",
                values: &["Black", "White"],
            },
            second: OptionAxis {
                name: "Size",
                values: APPAREL_SIZES,
            },
            price_cents: 2795,
            compare_at_cents: 3295,
            body_html: "<p>Premium unisex tee (Bella+Canvas 3001). Large back design in monospaced type. Small Dev Mode logo on left chest. Soft and lightweight.</p>",
            seo_title_suffix: "Dev Mode T-Shirt for Developers",
            seo_description: "Monospaced developer tee built for dark mode lovers. Clean design, premium feel. Printed on demand in the USA.",
        },
        ProductLine {
            product_type: "Hoodie",
            titles: &[
                "Hello World Hoodie",
                "Dark Mode Everything Hoodie",
                "404 Sleep Not Found Hoodie",
                "Code. Coffee. Repeat. Hoodie",
                "In Dev Mode Hoodie",
            ],
            first: OptionAxis {
                name: "Color",
                values: &["Black", "Heather Gray"],
            },
            second: OptionAxis {
                name: "Size",
                values: APPAREL_SIZES,
            },
            price_cents: 4495,
            compare_at_cents: 5495,
            body_html: "<p>Premium fleece hoodie. Large back design in monospaced type. Small contrasting Dev Mode logo on left sleeve cuff.</p>",
            seo_title_suffix: "Dev Mode Hoodie for Developers",
            seo_description: "Monospaced developer hoodie with sleeve logo. Clean streetwear aesthetic. Printed on demand in the USA.",
        },
    ]
}

/// Product-level fields, present only on the first variant row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductHeader {
    pub title: String,
    pub body_html: String,
    pub seo_title: String,
    pub seo_description: String,
}

/// One variant of one product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRow {
    pub handle: String,
    pub product_type: &'static str,
    /// Set on the first variant of each product.
    pub header: Option<ProductHeader>,
    pub option1: (&'static str, &'static str),
    pub option2: (&'static str, &'static str),
    pub price: Decimal,
    pub compare_at_price: Decimal,
    /// `{title} - {option1} - {option2}`.
    pub variant_label: String,
}

/// Every variant of the starter catalog, mugs then tees then hoodies.
#[must_use]
pub fn catalog_rows() -> Vec<CatalogRow> {
    let mut rows = Vec::new();

    for line in product_lines() {
        for title in line.titles {
            let handle = handleize(title);
            let mut first_variant = true;

            for first in line.first.values {
                for second in line.second.values {
                    let header = first_variant.then(|| ProductHeader {
                        title: (*title).to_string(),
                        body_html: line.body_html.to_string(),
                        seo_title: format!("{title} | {}", line.seo_title_suffix),
                        seo_description: line.seo_description.to_string(),
                    });
                    first_variant = false;

                    rows.push(CatalogRow {
                        handle: handle.clone(),
                        product_type: line.product_type,
                        header,
                        option1: (line.first.name, *first),
                        option2: (line.second.name, *second),
                        price: Decimal::new(line.price_cents, 2),
                        compare_at_price: Decimal::new(line.compare_at_cents, 2),
                        variant_label: format!("{title} - {first} - {second}"),
                    });
                }
            }
        }
    }

    rows
}

/// Render `rows` in the store's product import format.
#[must_use]
pub fn products_csv(rows: &[CatalogRow]) -> String {
    let records = rows.iter().map(|row| {
        let header = row.header.as_ref();
        let field = |f: fn(&ProductHeader) -> &str| header.map_or("", f).to_string();

        vec![
            row.handle.clone(),
            field(|h| h.title.as_str()),
            field(|h| h.body_html.as_str()),
            VENDOR.to_string(),
            row.product_type.to_string(),
            TAGS.to_string(),
            "TRUE".to_string(),
            row.option1.0.to_string(),
            row.option1.1.to_string(),
            row.option2.0.to_string(),
            row.option2.1.to_string(),
            String::new(),
            String::new(),
            String::new(),
            "0".to_string(),
            String::new(),
            "0".to_string(),
            "deny".to_string(),
            "manual".to_string(),
            row.price.to_string(),
            row.compare_at_price.to_string(),
            "TRUE".to_string(),
            "TRUE".to_string(),
            String::new(),
            String::new(),
            String::new(),
            row.variant_label.clone(),
            "FALSE".to_string(),
            field(|h| h.seo_title.as_str()),
            field(|h| h.seo_description.as_str()),
            "g".to_string(),
            "active".to_string(),
        ]
    });

    to_csv(&IMPORT_HEADERS, records)
}

/// Render the fulfillment mapping template for `rows`.
#[must_use]
pub fn mapping_csv(rows: &[CatalogRow]) -> String {
    let records = rows.iter().map(|row| {
        let mut record = vec![
            row.handle.clone(),
            row.header
                .as_ref()
                .map(|h| h.title.clone())
                .unwrap_or_default(),
            row.product_type.to_string(),
            row.option1.0.to_string(),
            row.option1.1.to_string(),
            row.option2.0.to_string(),
            row.option2.1.to_string(),
            row.variant_label.clone(),
        ];
        record.resize(MAPPING_HEADERS.len(), String::new());
        record
    });

    to_csv(&MAPPING_HEADERS, records)
}

/// Paths written by [`write_catalog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogFiles {
    pub products: PathBuf,
    pub mapping: PathBuf,
    pub variants: usize,
}

/// Write both catalog CSVs under `root`, replacing existing files.
///
/// # Errors
///
/// Returns `CatalogError::NotADirectory` if `root` is not a directory and
/// `CatalogError::Write` if a file cannot be written.
pub fn write_catalog(root: &Path) -> Result<CatalogFiles, CatalogError> {
    if !root.is_dir() {
        return Err(CatalogError::NotADirectory(root.to_path_buf()));
    }

    let rows = catalog_rows();
    let products = root.join(SHOPIFY_IMPORT_CSV);
    let mapping = root.join(PRINTFUL_MAPPING_CSV);

    write_file(&products, &products_csv(&rows))?;
    write_file(&mapping, &mapping_csv(&rows))?;

    tracing::info!(variants = rows.len(), "Catalog CSVs written");
    Ok(CatalogFiles {
        products,
        mapping,
        variants: rows.len(),
    })
}

fn write_file(path: &Path, contents: &str) -> Result<(), CatalogError> {
    fs::write(path, contents).map_err(|source| CatalogError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// URL handle for a product title: lowercase, dashes for whitespace runs,
/// no apostrophes or periods.
fn handleize(title: &str) -> String {
    let mut handle = String::with_capacity(title.len());
    let mut in_whitespace = false;

    for c in title.to_lowercase().chars() {
        if c == '\'' || c == '.' {
            continue;
        }
        if c.is_whitespace() {
            if !in_whitespace {
                handle.push('-');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        handle.push(if c == '—' || c == '–' { '-' } else { c });
    }

    handle
}

/// Header line plus records, newline-separated, no trailing newline.
fn to_csv(headers: &[&str], records: impl Iterator<Item = Vec<String>>) -> String {
    let mut lines = vec![headers.join(",")];
    lines.extend(records.map(|record| {
        record
            .iter()
            .map(|value| escape_field(value))
            .collect::<Vec<_>>()
            .join(",")
    }));
    lines.join("\n")
}

fn escape_field(value: &str) -> String {
    if value.contains(['"', ',', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
