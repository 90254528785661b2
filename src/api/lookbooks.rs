//! Lookbook API endpoints.
//!
//! Browse, detail and view routes serve the storefront. Create, save, delete
//! and reorder back the admin dialog.

use std::collections::HashSet;

use axum::{
    extract::{Path, Query, RawQuery, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::lookbook::{
    build_markers, validate_lookbook, FilterQuery, HotspotEditor, LookbookFilter, Marker,
    ViewState,
};
use crate::models::{
    lookbook_images, HotspotDraft, Lookbook, ReorderLookbooksRequest, SaveLookbookRequest,
};
use crate::AppState;

/// Filtered lookbook list with the canonical query for a shareable link.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowseResponse {
    pub lookbooks: Vec<Lookbook>,
    pub filter: LookbookFilter,
    pub query: String,
    pub total: usize,
}

/// Query parameters of the view route.
#[derive(Debug, Deserialize)]
pub struct ViewQuery {
    /// Image on screen; defaults to the primary image.
    #[serde(default)]
    pub image: Option<String>,
}

/// One lookbook image with the markers anchored to it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LookbookView {
    pub lookbook: Lookbook,
    pub images: Vec<String>,
    pub current_image_url: String,
    pub markers: Vec<Marker>,
    pub view: ViewState,
}

/// Result of activating a hotspot marker.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HotspotPreview {
    pub hotspot_id: String,
    pub view: ViewState,
}

/// GET /api/lookbooks - Browse active lookbooks by category, style, material and color.
pub async fn list_lookbooks(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> ApiResult<BrowseResponse> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let filter = FilterQuery::parse(raw.as_deref().unwrap_or_default()).to_filter();

    match state.repo.list_lookbooks(false).await {
        Ok(lookbooks) => {
            let lookbooks = filter.apply(lookbooks);
            let query = FilterQuery::from_filter(&filter).to_query_string();
            success(
                BrowseResponse {
                    total: lookbooks.len(),
                    lookbooks,
                    filter,
                    query,
                },
                revision_id,
            )
        }
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/lookbooks/:id - Get a single active lookbook.
pub async fn get_lookbook(
    State(state): State<AppState>,
    Path(slug_or_id): Path<String>,
) -> ApiResult<Lookbook> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match find_visible(&state, &slug_or_id, false).await {
        Ok(lookbook) => success(lookbook, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/admin/lookbooks - Every lookbook, inactive ones included, in display order.
pub async fn list_all_lookbooks(State(state): State<AppState>) -> ApiResult<Vec<Lookbook>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_lookbooks(true).await {
        Ok(lookbooks) => success(lookbooks, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/admin/lookbooks/:id - Load a lookbook into the editor, active or not.
pub async fn get_any_lookbook(
    State(state): State<AppState>,
    Path(slug_or_id): Path<String>,
) -> ApiResult<Lookbook> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match find_visible(&state, &slug_or_id, true).await {
        Ok(lookbook) => success(lookbook, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/lookbooks/:id/view - Markers for the image on screen.
pub async fn view_lookbook(
    State(state): State<AppState>,
    Path(slug_or_id): Path<String>,
    Query(params): Query<ViewQuery>,
) -> ApiResult<LookbookView> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match render_view(&state, &slug_or_id, params.image).await {
        Ok(view) => success(view, revision_id),
        Err(e) => error(e, revision_id),
    }
}

async fn render_view(
    state: &AppState,
    slug_or_id: &str,
    image: Option<String>,
) -> Result<LookbookView, AppError> {
    let lookbook = find_visible(state, slug_or_id, false).await?;

    let current_image_url = match image {
        Some(url) if lookbook.has_image(&url) => url,
        Some(url) => {
            return Err(AppError::Validation(format!(
                "Image {} does not belong to this lookbook",
                url
            )))
        }
        None => lookbook.image_url.clone(),
    };

    let product_ids: Vec<&str> = lookbook
        .hotspots
        .iter()
        .map(|h| h.product_id.as_str())
        .collect();
    let products = state.repo.products_by_ids(&product_ids).await?;
    let markers = build_markers(&lookbook.hotspots, &current_image_url, &products);

    Ok(LookbookView {
        images: lookbook.images(),
        current_image_url,
        markers,
        view: ViewState::Browsing,
        lookbook,
    })
}

/// GET /api/lookbooks/:id/hotspots/:hotspot_id/preview - Activate a marker.
pub async fn preview_hotspot(
    State(state): State<AppState>,
    Path((id, hotspot_id)): Path<(String, String)>,
) -> ApiResult<HotspotPreview> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match activate_marker(&state, &id, &hotspot_id).await {
        Ok(preview) => success(preview, revision_id),
        Err(e) => error(e, revision_id),
    }
}

async fn activate_marker(
    state: &AppState,
    id: &str,
    hotspot_id: &str,
) -> Result<HotspotPreview, AppError> {
    let lookbook = find_visible(state, id, false).await?;
    let hotspot = lookbook
        .hotspots
        .iter()
        .find(|h| h.id == hotspot_id)
        .ok_or_else(|| AppError::NotFound(format!("Hotspot {} not found", hotspot_id)))?;

    let product = state.repo.get_product(&hotspot.product_id).await?;
    if product.is_none() {
        tracing::debug!(
            hotspot_id = %hotspot.id,
            product_id = %hotspot.product_id,
            "Hotspot points at a missing product"
        );
    }
    let marker = Marker::new(hotspot, product.as_ref());

    Ok(HotspotPreview {
        hotspot_id: hotspot.id.clone(),
        view: ViewState::default().activate(&marker),
    })
}

async fn find_visible(
    state: &AppState,
    slug_or_id: &str,
    include_inactive: bool,
) -> Result<Lookbook, AppError> {
    state
        .repo
        .find_lookbook(slug_or_id)
        .await?
        .filter(|l| include_inactive || l.is_active)
        .ok_or_else(|| AppError::NotFound(format!("Lookbook {} not found", slug_or_id)))
}

/// Validate a form submission and normalise its images and hotspots.
fn prepare_save(
    mut request: SaveLookbookRequest,
) -> Result<(SaveLookbookRequest, Vec<HotspotDraft>), AppError> {
    validate_lookbook(&request)?;

    request.image_url = request.image_url.trim().to_string();
    request.gallery_urls = lookbook_images(&request.image_url, &request.gallery_urls)
        .into_iter()
        .skip(1)
        .collect();

    let editor = HotspotEditor::replay(request.images(), &request.hotspots)?;
    Ok((request, editor.into_hotspots()))
}

/// POST /api/admin/lookbooks - Create a lookbook with its hotspots.
pub async fn create_lookbook(
    State(state): State<AppState>,
    Json(request): Json<SaveLookbookRequest>,
) -> ApiResult<Lookbook> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let (request, hotspots) = match prepare_save(request) {
        Ok(prepared) => prepared,
        Err(e) => return error(e, revision_id),
    };

    match state.repo.create_lookbook(&request, &hotspots).await {
        Ok(lookbook) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(lookbook, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/admin/lookbooks/:id - Save a lookbook, replacing its hotspot set.
pub async fn save_lookbook(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<SaveLookbookRequest>,
) -> ApiResult<Lookbook> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let (request, hotspots) = match prepare_save(request) {
        Ok(prepared) => prepared,
        Err(e) => return error(e, revision_id),
    };

    match state.repo.save_lookbook(&id, &request, &hotspots).await {
        Ok(lookbook) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(lookbook, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/admin/lookbooks/:id - Delete a lookbook and its hotspots.
pub async fn delete_lookbook(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.delete_lookbook(&id).await {
        Ok(()) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success((), new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/admin/lookbooks/order - Persist a drag-and-drop ordering.
pub async fn reorder_lookbooks(
    State(state): State<AppState>,
    Json(request): Json<ReorderLookbooksRequest>,
) -> ApiResult<Vec<Lookbook>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if request.ids.is_empty() {
        return error(
            AppError::Validation("No lookbooks to reorder".to_string()),
            revision_id,
        );
    }
    let mut seen = HashSet::new();
    if let Some(duplicate) = request.ids.iter().find(|id| !seen.insert(id.as_str())) {
        return error(
            AppError::Validation(format!("Lookbook {} listed twice", duplicate)),
            revision_id,
        );
    }

    if let Err(e) = state.repo.reorder_lookbooks(&request.ids).await {
        return error(e, revision_id);
    }

    let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
    match state.repo.list_lookbooks(true).await {
        Ok(lookbooks) => success(lookbooks, new_revision),
        Err(e) => error(e, new_revision),
    }
}
