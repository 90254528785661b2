//! Storefront rendering of hotspots.
//!
//! Every surface that draws markers goes through [`active_hotspots`], so a
//! product tagged on one image never shows up on another.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::{Hotspot, Product, ProductPreview};

/// CSS offset that centers a marker on its anchor point.
pub const MARKER_TRANSFORM: &str = "translate(-50%, -50%)";

/// Hotspots anchored to `current_image_url`, in their stored order.
pub fn active_hotspots<'a>(all: &'a [Hotspot], current_image_url: &str) -> Vec<&'a Hotspot> {
    all.iter()
        .filter(|h| h.target_image_url == current_image_url)
        .collect()
}

/// Where a marker sits over its image, as percentages of the rendered box.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MarkerPlacement {
    pub left_percent: f64,
    pub top_percent: f64,
    pub transform: &'static str,
}

impl MarkerPlacement {
    pub fn for_hotspot(hotspot: &Hotspot) -> Self {
        Self {
            left_percent: hotspot.x_position,
            top_percent: hotspot.y_position,
            transform: MARKER_TRANSFORM,
        }
    }

    /// Inline style for an absolutely positioned marker.
    pub fn css(&self) -> String {
        format!(
            "left: {}%; top: {}%; transform: {};",
            self.left_percent, self.top_percent, self.transform
        )
    }
}

/// A hotspot ready to draw. `product` is `None` when the tagged product no
/// longer exists.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub hotspot_id: String,
    pub product_id: String,
    pub placement: MarkerPlacement,
    pub style: String,
    pub product: Option<ProductPreview>,
}

impl Marker {
    pub fn new(hotspot: &Hotspot, product: Option<&Product>) -> Self {
        let placement = MarkerPlacement::for_hotspot(hotspot);
        Self {
            hotspot_id: hotspot.id.clone(),
            product_id: hotspot.product_id.clone(),
            style: placement.css(),
            placement,
            product: product.map(ProductPreview::from),
        }
    }
}

/// Markers for the image currently on screen.
pub fn build_markers(
    all: &[Hotspot],
    current_image_url: &str,
    products: &HashMap<String, Product>,
) -> Vec<Marker> {
    active_hotspots(all, current_image_url)
        .into_iter()
        .map(|h| Marker::new(h, products.get(&h.product_id)))
        .collect()
}

/// View state of a lookbook surface.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum ViewState {
    #[default]
    Browsing,
    #[serde(rename_all = "camelCase")]
    Previewing {
        hotspot_id: String,
        product: ProductPreview,
    },
}

impl ViewState {
    /// Open the quick view for `marker`. A marker whose product is gone
    /// leaves the state unchanged.
    pub fn activate(self, marker: &Marker) -> Self {
        match &marker.product {
            Some(product) => ViewState::Previewing {
                hotspot_id: marker.hotspot_id.clone(),
                product: product.clone(),
            },
            None => self,
        }
    }

    /// Close the quick view.
    pub fn dismiss(self) -> Self {
        ViewState::Browsing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IMG_A: &str = "https://cdn.ohouse.vn/looks/a.jpg";
    const IMG_B: &str = "https://cdn.ohouse.vn/looks/b.jpg";

    fn hotspot(id: &str, product_id: &str, image: &str) -> Hotspot {
        Hotspot {
            id: id.to_string(),
            look_id: "look-1".to_string(),
            product_id: product_id.to_string(),
            x_position: 25.0,
            y_position: 75.0,
            target_image_url: image.to_string(),
        }
    }

    fn product(id: &str) -> Product {
        Product {
            id: id.to_string(),
            name: "Sofa Oslo".to_string(),
            price: 12_900_000,
            original_price: Some(15_900_000),
            image_url: None,
            slug: "sofa-oslo".to_string(),
            category_id: Some("phong-khach".to_string()),
        }
    }

    #[test]
    fn test_active_hotspots_partition_by_image() {
        let all = vec![
            hotspot("h1", "p1", IMG_A),
            hotspot("h2", "p1", IMG_B),
            hotspot("h3", "p2", IMG_A),
            hotspot("h4", "p3", "https://cdn.ohouse.vn/removed.jpg"),
        ];

        let on_a: Vec<&str> = active_hotspots(&all, IMG_A)
            .iter()
            .map(|h| h.id.as_str())
            .collect();
        let on_b: Vec<&str> = active_hotspots(&all, IMG_B)
            .iter()
            .map(|h| h.id.as_str())
            .collect();

        assert_eq!(on_a, vec!["h1", "h3"]);
        assert_eq!(on_b, vec!["h2"]);
        assert!(!on_a.contains(&"h4") && !on_b.contains(&"h4"));
    }

    #[test]
    fn test_marker_centers_on_percentages() {
        let marker = Marker::new(&hotspot("h1", "p1", IMG_A), None);
        assert_eq!(marker.placement.left_percent, 25.0);
        assert_eq!(marker.placement.top_percent, 75.0);
        assert_eq!(
            marker.style,
            "left: 25%; top: 75%; transform: translate(-50%, -50%);"
        );
    }

    #[test]
    fn test_build_markers_tolerates_missing_product() {
        let all = vec![hotspot("h1", "p1", IMG_A), hotspot("h2", "gone", IMG_A)];
        let products = HashMap::from([("p1".to_string(), product("p1"))]);

        let markers = build_markers(&all, IMG_A, &products);
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].product.as_ref().unwrap().slug, "sofa-oslo");
        assert!(markers[1].product.is_none());
    }

    #[test]
    fn test_view_state_transitions() {
        let products = HashMap::from([("p1".to_string(), product("p1"))]);
        let markers = build_markers(
            &[hotspot("h1", "p1", IMG_A), hotspot("h2", "gone", IMG_A)],
            IMG_A,
            &products,
        );

        let state = ViewState::Browsing.activate(&markers[1]);
        assert_eq!(state, ViewState::Browsing);

        let state = state.activate(&markers[0]);
        assert!(matches!(
            &state,
            ViewState::Previewing { hotspot_id, .. } if hotspot_id == "h1"
        ));

        assert_eq!(state.dismiss(), ViewState::Browsing);
    }
}
