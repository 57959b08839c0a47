//! Print placement geometry.
//!
//! A placement says where a design image sits on a product's print area. All
//! dimensions are in the fulfillment platform's pixel units.

use serde::{Deserialize, Serialize};

/// Placement rectangle of a design inside a print area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementRect {
    /// Width of the printable area.
    pub area_width: u32,
    /// Height of the printable area.
    pub area_height: u32,
    /// Width of the design inside the area.
    pub width: u32,
    /// Height of the design inside the area.
    pub height: u32,
    /// Offset from the top edge of the area.
    pub top: u32,
    /// Offset from the left edge of the area.
    pub left: u32,
}

impl Default for PlacementRect {
    /// Centered square on a 3:4 front print area.
    fn default() -> Self {
        Self {
            area_width: 1800,
            area_height: 2400,
            width: 1800,
            height: 1800,
            top: 300,
            left: 0,
        }
    }
}

/// A named placement (e.g. `front`, `back`) with its rectangle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementSpec {
    /// Placement tag understood by the fulfillment platform.
    pub placement: String,
    /// Where the design goes.
    #[serde(default, alias = "position")]
    pub rect: PlacementRect,
}

impl Default for PlacementSpec {
    fn default() -> Self {
        Self {
            placement: "front".to_string(),
            rect: PlacementRect::default(),
        }
    }
}

/// One rendered preview returned by a completed mockup task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedMockup {
    /// Public URL of the rendered image.
    pub url: String,
    /// Placement tag the image was rendered for.
    pub placement: String,
    /// Variant the image was rendered for, when reported.
    #[serde(rename = "variant")]
    pub variant_id: Option<u64>,
}
