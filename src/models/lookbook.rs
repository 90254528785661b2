//! Lookbook ("shop the look") model.

use serde::{Deserialize, Serialize};

use super::{Facet, Hotspot, HotspotDraft};

/// A curated scene: one primary image, optional gallery images, and the
/// product hotspots placed on them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lookbook {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Slug of the category this look is grouped under
    pub category_id: String,
    pub image_url: String,
    pub gallery_urls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub is_active: bool,
    pub display_order: i64,
    pub updated_at: String,
    /// Incremented on every save; checked when a save carries `expectedVersion`
    #[serde(default)]
    pub version: i64,
    #[serde(default)]
    pub hotspots: Vec<Hotspot>,
}

impl Lookbook {
    /// Images hotspots may be anchored to, primary first.
    pub fn images(&self) -> Vec<String> {
        lookbook_images(&self.image_url, &self.gallery_urls)
    }

    /// Whether `url` is one of this lookbook's images.
    pub fn has_image(&self, url: &str) -> bool {
        self.images().iter().any(|image| image == url)
    }

    /// The lookbook's value for a multi-select facet.
    pub fn facet_value(&self, facet: Facet) -> Option<&str> {
        match facet {
            Facet::Style => self.style.as_deref(),
            Facet::Material => self.material.as_deref(),
            Facet::Color => self.color.as_deref(),
        }
    }
}

/// Ordered, de-duplicated image list of a lookbook. Blank entries are dropped.
pub fn lookbook_images(image_url: &str, gallery_urls: &[String]) -> Vec<String> {
    let mut images: Vec<String> = Vec::with_capacity(gallery_urls.len() + 1);
    for url in std::iter::once(image_url).chain(gallery_urls.iter().map(String::as_str)) {
        let url = url.trim();
        if !url.is_empty() && !images.iter().any(|existing| existing == url) {
            images.push(url.to_string());
        }
    }
    images
}

/// Request body for creating or saving a lookbook.
///
/// A save replaces every field and the complete hotspot set.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveLookbookRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub category_id: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub gallery_urls: Vec<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Defaults to the end of the list for new lookbooks, unchanged for saves
    #[serde(default)]
    pub display_order: Option<i64>,
    #[serde(default)]
    pub hotspots: Vec<HotspotDraft>,
    /// Expected version for optimistic concurrency control
    #[serde(default)]
    pub expected_version: Option<i64>,
}

fn default_active() -> bool {
    true
}

impl SaveLookbookRequest {
    pub fn images(&self) -> Vec<String> {
        lookbook_images(&self.image_url, &self.gallery_urls)
    }
}

/// Request body for reordering lookbooks; `display_order` becomes the index.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderLookbooksRequest {
    pub ids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_images_keep_primary_first_and_drop_duplicates() {
        let gallery = vec![
            "https://cdn.ohouse.vn/b.jpg".to_string(),
            "".to_string(),
            "https://cdn.ohouse.vn/a.jpg".to_string(),
            "https://cdn.ohouse.vn/c.jpg".to_string(),
        ];
        let images = lookbook_images("https://cdn.ohouse.vn/a.jpg", &gallery);
        assert_eq!(
            images,
            vec![
                "https://cdn.ohouse.vn/a.jpg",
                "https://cdn.ohouse.vn/b.jpg",
                "https://cdn.ohouse.vn/c.jpg",
            ]
        );
    }

    #[test]
    fn test_images_without_primary() {
        assert!(lookbook_images("  ", &[]).is_empty());
    }
}
