//! OHOUSE lookbook backend.
//!
//! Lookbooks ("shop the look" scenes), the product hotspots placed on their
//! images, and the facet filters of the storefront browse view. SQLite is
//! the store; Tantivy indexes products for the editor's product picker.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod lookbook;
pub mod models;
pub mod search;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use db::Repository;
use search::SearchIndex;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub search: Arc<SearchIndex>,
    pub config: Arc<Config>,
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let psk = state.config.api_psk.clone();

    // Storefront routes (public, read-only)
    let storefront_routes = Router::new()
        .route("/revision", get(api::get_revision))
        .route("/lookbooks", get(api::list_lookbooks))
        .route("/lookbooks/{id}", get(api::get_lookbook))
        .route("/lookbooks/{id}/view", get(api::view_lookbook))
        .route(
            "/lookbooks/{id}/hotspots/{hotspot_id}/preview",
            get(api::preview_hotspot),
        )
        .route("/lookbook-filters", get(api::list_filter_vocabulary))
        .route("/products", get(api::list_products))
        .route("/products/search", get(api::search_products))
        .route("/products/{id}", get(api::get_product));

    // Admin routes (dialog editor and catalog maintenance)
    let admin_routes = Router::new()
        .route(
            "/lookbooks",
            get(api::list_all_lookbooks).post(api::create_lookbook),
        )
        .route("/lookbooks/order", put(api::reorder_lookbooks))
        .route(
            "/lookbooks/{id}",
            get(api::get_any_lookbook)
                .put(api::save_lookbook)
                .delete(api::delete_lookbook),
        )
        .route(
            "/lookbooks/{id}/hotspots",
            post(api::add_hotspot).delete(api::remove_hotspot),
        )
        .route(
            "/lookbooks/{id}/hotspots/position",
            put(api::update_hotspot_position),
        )
        .route(
            "/lookbook-filters",
            get(api::list_filter_terms).post(api::create_filter_term),
        )
        .route("/lookbook-filters/{id}", delete(api::delete_filter_term))
        .route("/products", post(api::create_product))
        .route("/products/{id}", delete(api::delete_product))
        // Apply PSK auth middleware
        .layer(middleware::from_fn(move |req, next| {
            auth::require_admin_key(psk.clone(), req, next)
        }));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", storefront_routes)
        .nest("/api/admin", admin_routes)
        .merge(health_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
