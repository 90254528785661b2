//! In-memory hotspot editor.
//!
//! Holds the hotspot set of one lookbook while an operator works on it.
//! Nothing here touches the store; the caller persists [`HotspotEditor::into_hotspots`]
//! with a single save.

use super::check_facet_value;
use crate::errors::AppError;
use crate::models::{
    AddOutcome, Axis, Facet, HotspotDraft, SaveLookbookRequest, POSITION_MAX, POSITION_MIN,
};

/// Editing session over one lookbook's images and hotspots.
#[derive(Debug, Clone)]
pub struct HotspotEditor {
    images: Vec<String>,
    active_image: Option<String>,
    hotspots: Vec<HotspotDraft>,
}

impl HotspotEditor {
    /// Start an empty session over `images`.
    pub fn new(images: Vec<String>) -> Self {
        Self::with_hotspots(images, Vec::new())
    }

    /// Resume a session from previously saved hotspots.
    pub fn with_hotspots(images: Vec<String>, hotspots: Vec<HotspotDraft>) -> Self {
        Self {
            images,
            active_image: None,
            hotspots,
        }
    }

    /// Rebuild a session from a full form submission.
    ///
    /// Every draft is replayed through the same operations an operator would
    /// use, so unknown images are rejected, duplicates collapse onto the
    /// first occurrence and positions are clamped.
    pub fn replay(images: Vec<String>, drafts: &[HotspotDraft]) -> Result<Self, AppError> {
        let mut editor = Self::new(images);
        for draft in drafts {
            editor.select_active_image(&draft.target_image_url)?;
            if editor.add_hotspot(&draft.product_id)? == AddOutcome::AlreadyTagged {
                tracing::debug!(
                    product_id = %draft.product_id,
                    image = %draft.target_image_url,
                    "Dropping duplicate hotspot"
                );
                continue;
            }
            let (product, image) = (&draft.product_id, &draft.target_image_url);
            editor.update_position(product, image, Axis::X, draft.x_position)?;
            editor.update_position(product, image, Axis::Y, draft.y_position)?;
        }
        Ok(editor)
    }

    pub fn active_image(&self) -> Option<&str> {
        self.active_image.as_deref()
    }

    pub fn hotspots(&self) -> &[HotspotDraft] {
        &self.hotspots
    }

    pub fn into_hotspots(self) -> Vec<HotspotDraft> {
        self.hotspots
    }

    /// Choose the image that subsequent placements target.
    pub fn select_active_image(&mut self, url: &str) -> Result<(), AppError> {
        if !self.images.iter().any(|image| image == url) {
            return Err(AppError::Validation(format!(
                "Image {} does not belong to this lookbook",
                url
            )));
        }
        self.active_image = Some(url.to_string());
        Ok(())
    }

    /// Tag `product_id` at the center of the active image.
    ///
    /// Fails without touching the hotspot list when no image is active.
    /// Tagging a product twice on the same image is a no-op.
    pub fn add_hotspot(&mut self, product_id: &str) -> Result<AddOutcome, AppError> {
        let Some(image) = self.active_image.as_deref() else {
            return Err(AppError::Validation(
                "Select an image before tagging a product".to_string(),
            ));
        };
        if product_id.trim().is_empty() {
            return Err(AppError::Validation("Product is required".to_string()));
        }

        if self.hotspots.iter().any(|h| h.is_keyed(product_id, image)) {
            return Ok(AddOutcome::AlreadyTagged);
        }

        self.hotspots.push(HotspotDraft::centered(product_id, image));
        Ok(AddOutcome::Added)
    }

    /// Remove the hotspot keyed by `(product_id, target_image_url)`.
    ///
    /// Returns whether anything was removed.
    pub fn remove_hotspot(&mut self, product_id: &str, target_image_url: &str) -> bool {
        let before = self.hotspots.len();
        self.hotspots
            .retain(|h| !h.is_keyed(product_id, target_image_url));
        self.hotspots.len() != before
    }

    /// Move one hotspot along `axis`. The value is clamped to [0, 100].
    ///
    /// Returns whether a hotspot matched the key.
    pub fn update_position(
        &mut self,
        product_id: &str,
        target_image_url: &str,
        axis: Axis,
        value: f64,
    ) -> Result<bool, AppError> {
        if !value.is_finite() {
            return Err(AppError::Validation(format!(
                "Position must be a number, got {}",
                value
            )));
        }
        let value = value.clamp(POSITION_MIN, POSITION_MAX);

        let Some(hotspot) = self
            .hotspots
            .iter_mut()
            .find(|h| h.is_keyed(product_id, target_image_url))
        else {
            return Ok(false);
        };
        match axis {
            Axis::X => hotspot.x_position = value,
            Axis::Y => hotspot.y_position = value,
        }
        Ok(true)
    }
}

/// Check the fields a lookbook cannot be saved without.
pub fn validate_lookbook(request: &SaveLookbookRequest) -> Result<(), AppError> {
    if request.image_url.trim().is_empty() {
        return Err(AppError::Validation(
            "A primary image is required".to_string(),
        ));
    }
    if request.category_id.trim().is_empty() {
        return Err(AppError::Validation("A category is required".to_string()));
    }
    let facets = [
        (Facet::Style, &request.style),
        (Facet::Material, &request.material),
        (Facet::Color, &request.color),
    ];
    for (facet, value) in facets {
        if let Some(value) = value {
            check_facet_value(facet, value)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const IMG_A: &str = "https://cdn.ohouse.vn/looks/a.jpg";
    const IMG_B: &str = "https://cdn.ohouse.vn/looks/b.jpg";

    fn editor() -> HotspotEditor {
        HotspotEditor::new(vec![IMG_A.to_string(), IMG_B.to_string()])
    }

    fn keys(editor: &HotspotEditor) -> Vec<(&str, &str)> {
        editor
            .hotspots()
            .iter()
            .map(|h| (h.product_id.as_str(), h.target_image_url.as_str()))
            .collect()
    }

    #[test]
    fn test_add_without_active_image_is_rejected() {
        let mut editor = editor();
        let err = editor.add_hotspot("sofa-1").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(editor.hotspots().is_empty());
    }

    #[test]
    fn test_select_unknown_image_keeps_previous_selection() {
        let mut editor = editor();
        editor.select_active_image(IMG_A).unwrap();
        assert!(editor
            .select_active_image("https://elsewhere/x.jpg")
            .is_err());
        assert_eq!(editor.active_image(), Some(IMG_A));
    }

    #[test]
    fn test_add_places_hotspot_at_center_of_active_image() {
        let mut editor = editor();
        editor.select_active_image(IMG_B).unwrap();
        assert_eq!(editor.add_hotspot("sofa-1").unwrap(), AddOutcome::Added);

        let hotspot = &editor.hotspots()[0];
        assert_eq!(hotspot.target_image_url, IMG_B);
        assert_eq!(hotspot.x_position, 50.0);
        assert_eq!(hotspot.y_position, 50.0);
    }

    #[test]
    fn test_duplicate_add_is_suppressed() {
        let mut editor = editor();
        editor.select_active_image(IMG_A).unwrap();
        editor.add_hotspot("sofa-1").unwrap();
        assert_eq!(
            editor.add_hotspot("sofa-1").unwrap(),
            AddOutcome::AlreadyTagged
        );
        assert_eq!(editor.hotspots().len(), 1);

        // Same product on another image is a different hotspot.
        editor.select_active_image(IMG_B).unwrap();
        assert_eq!(editor.add_hotspot("sofa-1").unwrap(), AddOutcome::Added);
        assert_eq!(editor.hotspots().len(), 2);
    }

    #[test]
    fn test_select_does_not_touch_hotspots() {
        let mut editor = editor();
        editor.select_active_image(IMG_A).unwrap();
        editor.add_hotspot("sofa-1").unwrap();
        let before = editor.hotspots().to_vec();
        editor.select_active_image(IMG_B).unwrap();
        assert_eq!(editor.hotspots(), before.as_slice());
    }

    #[test]
    fn test_remove_uses_compound_key() {
        let mut editor = editor();
        editor.select_active_image(IMG_A).unwrap();
        editor.add_hotspot("p1").unwrap();
        editor.select_active_image(IMG_B).unwrap();
        editor.add_hotspot("p1").unwrap();
        editor.select_active_image(IMG_A).unwrap();
        editor.add_hotspot("p2").unwrap();

        assert!(editor.remove_hotspot("p1", IMG_A));
        assert_eq!(keys(&editor), vec![("p1", IMG_B), ("p2", IMG_A)]);
        assert!(!editor.remove_hotspot("p1", IMG_A));
    }

    #[test]
    fn test_remove_after_reordering() {
        let drafts = vec![
            HotspotDraft::centered("p2", IMG_A),
            HotspotDraft::centered("p1", IMG_B),
            HotspotDraft::centered("p1", IMG_A),
        ];
        let mut editor =
            HotspotEditor::with_hotspots(vec![IMG_A.to_string(), IMG_B.to_string()], drafts);

        assert!(editor.remove_hotspot("p1", IMG_A));
        assert_eq!(keys(&editor), vec![("p2", IMG_A), ("p1", IMG_B)]);
    }

    #[test]
    fn test_update_position_clamps_and_targets_one_hotspot() {
        let mut editor = editor();
        editor.select_active_image(IMG_A).unwrap();
        editor.add_hotspot("p1").unwrap();
        editor.add_hotspot("p2").unwrap();

        assert!(editor.update_position("p1", IMG_A, Axis::X, 130.0).unwrap());
        assert!(editor.update_position("p1", IMG_A, Axis::Y, -4.5).unwrap());
        assert!(!editor.update_position("p1", IMG_B, Axis::X, 10.0).unwrap());

        let p1 = &editor.hotspots()[0];
        assert_eq!((p1.x_position, p1.y_position), (100.0, 0.0));
        let p2 = &editor.hotspots()[1];
        assert_eq!((p2.x_position, p2.y_position), (50.0, 50.0));
    }

    #[test]
    fn test_positions_stay_in_range_after_many_updates() {
        let mut editor = editor();
        editor.select_active_image(IMG_A).unwrap();
        editor.add_hotspot("p1").unwrap();

        let values = [-1e9, 250.0, 33.3, -0.1, 100.01, 0.0, 1e12, 99.9];
        for (i, value) in values.iter().enumerate() {
            let axis = if i % 2 == 0 { Axis::X } else { Axis::Y };
            editor.update_position("p1", IMG_A, axis, *value).unwrap();
            for h in editor.hotspots() {
                assert!((0.0..=100.0).contains(&h.x_position));
                assert!((0.0..=100.0).contains(&h.y_position));
            }
        }
    }

    #[test]
    fn test_update_position_rejects_nan() {
        let mut editor = editor();
        editor.select_active_image(IMG_A).unwrap();
        editor.add_hotspot("p1").unwrap();
        assert!(editor
            .update_position("p1", IMG_A, Axis::X, f64::NAN)
            .is_err());
        assert_eq!(editor.hotspots()[0].x_position, 50.0);
    }

    #[test]
    fn test_replay_normalises_form_submission() {
        let drafts = vec![
            HotspotDraft {
                product_id: "p1".to_string(),
                x_position: 120.0,
                y_position: 40.0,
                target_image_url: IMG_A.to_string(),
            },
            HotspotDraft {
                product_id: "p1".to_string(),
                x_position: 10.0,
                y_position: 10.0,
                target_image_url: IMG_A.to_string(),
            },
        ];
        let editor =
            HotspotEditor::replay(vec![IMG_A.to_string(), IMG_B.to_string()], &drafts).unwrap();

        assert_eq!(editor.hotspots().len(), 1);
        assert_eq!(editor.hotspots()[0].x_position, 100.0);
        assert_eq!(editor.hotspots()[0].y_position, 40.0);
    }

    #[test]
    fn test_replay_rejects_foreign_image() {
        let drafts = vec![HotspotDraft::centered("p1", "https://elsewhere/x.jpg")];
        assert!(HotspotEditor::replay(vec![IMG_A.to_string()], &drafts).is_err());
    }

    #[test]
    fn test_validate_requires_image_and_category() {
        let mut request: SaveLookbookRequest = serde_json::from_value(serde_json::json!({
            "title": "Phòng khách Bắc Âu",
            "categoryId": "phong-khach",
            "imageUrl": IMG_A
        }))
        .unwrap();
        assert!(validate_lookbook(&request).is_ok());

        request.category_id = " ".to_string();
        assert!(validate_lookbook(&request).is_err());

        request.category_id = "phong-khach".to_string();
        request.image_url.clear();
        assert!(validate_lookbook(&request).is_err());
    }

    #[test]
    fn test_validate_rejects_comma_in_facet_value() {
        let mut request: SaveLookbookRequest = serde_json::from_value(serde_json::json!({
            "categoryId": "phong-khach",
            "imageUrl": IMG_A,
            "material": "Gỗ sồi, vải lanh"
        }))
        .unwrap();
        assert!(matches!(
            validate_lookbook(&request),
            Err(AppError::Validation(_))
        ));

        request.material = Some("Gỗ sồi".to_string());
        assert!(validate_lookbook(&request).is_ok());
    }
}
