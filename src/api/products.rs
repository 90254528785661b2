//! Product API endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::models::{CreateProductRequest, Product};
use crate::AppState;

/// Product search query parameters.
#[derive(Debug, Deserialize)]
pub struct ProductSearchQuery {
    /// Search query string.
    pub q: String,
    /// Maximum number of results (default: 20).
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    20
}

/// Maximum number of search results allowed.
const MAX_SEARCH_LIMIT: usize = 50;

/// Single search result item.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSearchItem {
    pub product: Product,
    pub score: f32,
}

/// GET /api/products - List all products.
pub async fn list_products(State(state): State<AppState>) -> ApiResult<Vec<Product>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_products().await {
        Ok(products) => success(products, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/products/:id - Get a single product.
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Product> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.get_product(&id).await {
        Ok(Some(product)) => success(product, revision_id),
        Ok(None) => error(
            AppError::NotFound(format!("Product {} not found", id)),
            revision_id,
        ),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/products/search - Find products to tag in the hotspot editor.
pub async fn search_products(
    State(state): State<AppState>,
    Query(params): Query<ProductSearchQuery>,
) -> ApiResult<Vec<ProductSearchItem>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let limit = params.limit.clamp(1, MAX_SEARCH_LIMIT);

    let hits = match state.search.search(&params.q, limit) {
        Ok(hits) => hits,
        Err(e) => return error(e, revision_id),
    };

    let ids: Vec<&str> = hits.iter().map(|h| h.product_id.as_str()).collect();
    let mut products = match state.repo.products_by_ids(&ids).await {
        Ok(products) => products,
        Err(e) => return error(e, revision_id),
    };

    // Keep the index's ranking; skip hits whose product was deleted meanwhile.
    let results = hits
        .into_iter()
        .filter_map(|hit| {
            products
                .remove(&hit.product_id)
                .map(|product| ProductSearchItem {
                    product,
                    score: hit.score,
                })
        })
        .collect();

    success(results, revision_id)
}

/// POST /api/admin/products - Create a new product.
pub async fn create_product(
    State(state): State<AppState>,
    Json(request): Json<CreateProductRequest>,
) -> ApiResult<Product> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    // Validate required fields
    if request.name.trim().is_empty() {
        return error(
            AppError::Validation("Product name is required".to_string()),
            revision_id,
        );
    }
    if request.slug.trim().is_empty() {
        return error(
            AppError::Validation("Product slug is required".to_string()),
            revision_id,
        );
    }
    if request.price < 0 || request.original_price.is_some_and(|p| p < 0) {
        return error(
            AppError::Validation("Prices cannot be negative".to_string()),
            revision_id,
        );
    }

    match state.repo.create_product(&request).await {
        Ok(product) => {
            if let Err(e) = state.search.index_product(&product).await {
                tracing::warn!("Failed to index product: {}", e);
            }

            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(product, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/admin/products/:id - Delete a product.
///
/// Hotspots tagging the product stay in place; storefront markers for them
/// render without a product and do nothing when activated.
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.delete_product(&id).await {
        Ok(()) => {
            if let Err(e) = state.search.remove_product(&id).await {
                tracing::warn!("Failed to remove product from index: {}", e);
            }

            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success((), new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}
