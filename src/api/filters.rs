//! Facet vocabulary endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::lookbook::check_facet_value;
use crate::models::{CreateFilterTermRequest, FilterVocabulary, LookbookFilterTerm};
use crate::AppState;

/// GET /api/lookbook-filters - Facet values grouped by facet.
pub async fn list_filter_vocabulary(
    State(state): State<AppState>,
) -> ApiResult<FilterVocabulary> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_filter_terms().await {
        Ok(terms) => success(FilterVocabulary::from_terms(&terms), revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/admin/lookbook-filters - Raw facet rows, for the admin editor.
pub async fn list_filter_terms(State(state): State<AppState>) -> ApiResult<Vec<LookbookFilterTerm>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_filter_terms().await {
        Ok(terms) => success(terms, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/admin/lookbook-filters - Add a facet value.
pub async fn create_filter_term(
    State(state): State<AppState>,
    Json(request): Json<CreateFilterTermRequest>,
) -> ApiResult<LookbookFilterTerm> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if request.value.trim().is_empty() {
        return error(
            AppError::Validation("Filter value is required".to_string()),
            revision_id,
        );
    }

    if let Err(e) = check_facet_value(request.facet, &request.value) {
        return error(e, revision_id);
    }

    match state.repo.create_filter_term(&request).await {
        Ok(term) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(term, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/admin/lookbook-filters/:id - Remove a facet value.
pub async fn delete_filter_term(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.delete_filter_term(&id).await {
        Ok(()) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success((), new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}
