//! Hotspot editing endpoints.
//!
//! Each request resumes an editor from the saved hotspots, applies one
//! operation and saves the resulting set as a whole.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::lookbook::HotspotEditor;
use crate::models::{
    AddHotspotRequest, AddOutcome, HotspotKeyQuery, Lookbook, UpdatePositionRequest,
};
use crate::AppState;

/// Lookbook state after a tagging request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagResult {
    pub outcome: AddOutcome,
    pub lookbook: Lookbook,
}

/// POST /api/admin/lookbooks/:id/hotspots - Tag a product on the chosen image.
pub async fn add_hotspot(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<AddHotspotRequest>,
) -> ApiResult<TagResult> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match tag_product(&state, &id, &request).await {
        Ok(result) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(result, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

async fn tag_product(
    state: &AppState,
    id: &str,
    request: &AddHotspotRequest,
) -> Result<TagResult, AppError> {
    let (lookbook, mut editor) = resume_editor(state, id).await?;

    if let Some(url) = &request.target_image_url {
        editor.select_active_image(url)?;
    }
    // Checked before the product lookup so a missing image is reported first.
    if editor.active_image().is_none() {
        return Err(AppError::Validation(
            "Select an image before tagging a product".to_string(),
        ));
    }
    if state.repo.get_product(&request.product_id).await?.is_none() {
        return Err(AppError::Validation(format!(
            "Product {} does not exist",
            request.product_id
        )));
    }

    let outcome = editor.add_hotspot(&request.product_id)?;
    if outcome == AddOutcome::AlreadyTagged {
        // Nothing is written, so the version is checked here instead of in the save.
        ensure_version(&lookbook, request.expected_version)?;
        return Ok(TagResult { outcome, lookbook });
    }

    let lookbook = state
        .repo
        .replace_hotspots(id, request.expected_version, editor.hotspots())
        .await?;
    Ok(TagResult { outcome, lookbook })
}

/// DELETE /api/admin/lookbooks/:id/hotspots - Remove the hotspot keyed by product and image.
pub async fn remove_hotspot(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(key): Query<HotspotKeyQuery>,
) -> ApiResult<Lookbook> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match untag_product(&state, &id, &key).await {
        Ok(lookbook) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(lookbook, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

async fn untag_product(
    state: &AppState,
    id: &str,
    key: &HotspotKeyQuery,
) -> Result<Lookbook, AppError> {
    let (_, mut editor) = resume_editor(state, id).await?;

    if !editor.remove_hotspot(&key.product_id, &key.target_image_url) {
        return Err(hotspot_not_found(&key.product_id, &key.target_image_url));
    }

    state
        .repo
        .replace_hotspots(id, key.expected_version, editor.hotspots())
        .await
}

/// PUT /api/admin/lookbooks/:id/hotspots/position - Move a hotspot along one axis.
pub async fn update_hotspot_position(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdatePositionRequest>,
) -> ApiResult<Lookbook> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match move_hotspot(&state, &id, &request).await {
        Ok(lookbook) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(lookbook, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

async fn move_hotspot(
    state: &AppState,
    id: &str,
    request: &UpdatePositionRequest,
) -> Result<Lookbook, AppError> {
    let (_, mut editor) = resume_editor(state, id).await?;

    let moved = editor.update_position(
        &request.product_id,
        &request.target_image_url,
        request.axis,
        request.value,
    )?;
    if !moved {
        return Err(hotspot_not_found(
            &request.product_id,
            &request.target_image_url,
        ));
    }

    state
        .repo
        .replace_hotspots(id, request.expected_version, editor.hotspots())
        .await
}

async fn resume_editor(state: &AppState, id: &str) -> Result<(Lookbook, HotspotEditor), AppError> {
    let lookbook = state
        .repo
        .get_lookbook(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Lookbook {} not found", id)))?;

    let drafts = lookbook.hotspots.iter().map(|h| h.to_draft()).collect();
    let editor = HotspotEditor::with_hotspots(lookbook.images(), drafts);
    Ok((lookbook, editor))
}

fn ensure_version(lookbook: &Lookbook, expected: Option<i64>) -> Result<(), AppError> {
    match expected {
        Some(expected) if expected != lookbook.version => Err(AppError::VersionMismatch {
            message: format!(
                "Version mismatch: expected {}, current {}",
                expected, lookbook.version
            ),
            current_version: lookbook.version,
        }),
        _ => Ok(()),
    }
}

fn hotspot_not_found(product_id: &str, target_image_url: &str) -> AppError {
    AppError::NotFound(format!(
        "No hotspot for product {} on {}",
        product_id, target_image_url
    ))
}
