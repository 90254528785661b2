//! Hotspot (look item) models.
//!
//! A hotspot tags one product onto one image of a lookbook at percentage
//! coordinates, top-left origin.

use serde::{Deserialize, Serialize};

/// Lower bound of a hotspot coordinate, in percent.
pub const POSITION_MIN: f64 = 0.0;
/// Upper bound of a hotspot coordinate, in percent.
pub const POSITION_MAX: f64 = 100.0;
/// Coordinate given to freshly placed hotspots (dead center).
pub const POSITION_CENTER: f64 = 50.0;

/// Coordinate axis of a hotspot position.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

/// A hotspot persisted in `shop_look_items`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Hotspot {
    pub id: String,
    pub look_id: String,
    pub product_id: String,
    pub x_position: f64,
    pub y_position: f64,
    pub target_image_url: String,
}

impl Hotspot {
    /// Strip the persisted identity so the hotspot can be edited again.
    pub fn to_draft(&self) -> HotspotDraft {
        HotspotDraft {
            product_id: self.product_id.clone(),
            x_position: self.x_position,
            y_position: self.y_position,
            target_image_url: self.target_image_url.clone(),
        }
    }
}

/// A hotspot held by the editor. It has no id until the lookbook is saved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HotspotDraft {
    pub product_id: String,
    #[serde(default = "default_position")]
    pub x_position: f64,
    #[serde(default = "default_position")]
    pub y_position: f64,
    pub target_image_url: String,
}

fn default_position() -> f64 {
    POSITION_CENTER
}

impl HotspotDraft {
    /// Create a draft at the center of `target_image_url`.
    pub fn centered(product_id: &str, target_image_url: &str) -> Self {
        Self {
            product_id: product_id.to_string(),
            x_position: POSITION_CENTER,
            y_position: POSITION_CENTER,
            target_image_url: target_image_url.to_string(),
        }
    }

    /// Whether this draft is identified by `(product_id, target_image_url)`.
    pub fn is_keyed(&self, product_id: &str, target_image_url: &str) -> bool {
        self.product_id == product_id && self.target_image_url == target_image_url
    }
}

/// Request body for tagging a product on one image of a lookbook.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddHotspotRequest {
    /// Image the product is placed on; required, see [`crate::lookbook::HotspotEditor::add_hotspot`]
    #[serde(default)]
    pub target_image_url: Option<String>,
    pub product_id: String,
    #[serde(default)]
    pub expected_version: Option<i64>,
}

/// Query parameters identifying one hotspot by its compound key.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotspotKeyQuery {
    pub product_id: String,
    pub target_image_url: String,
    #[serde(default)]
    pub expected_version: Option<i64>,
}

/// Request body for moving a hotspot along one axis.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePositionRequest {
    pub product_id: String,
    pub target_image_url: String,
    pub axis: Axis,
    pub value: f64,
    #[serde(default)]
    pub expected_version: Option<i64>,
}

/// Result of tagging a product through the editor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AddOutcome {
    Added,
    AlreadyTagged,
}
