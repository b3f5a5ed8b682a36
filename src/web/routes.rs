use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use super::assets;
use super::handlers;
use super::state::AppState;

// Spreadsheet uploads can exceed axum's default body limit
const UPLOAD_BODY_LIMIT: usize = 32 * 1024 * 1024;

// UI Routes - web interface
pub fn ui_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(assets::index_handler))
        .route("/static/{*path}", get(assets::static_handler))
}

// API Routes - one route per user action
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new().nest(
        "/api",
        Router::new()
            // Backend selection and credential entry
            .route("/backend", post(handlers::api::select_backend))
            // Spreadsheet upload
            .route(
                "/upload",
                post(handlers::api::upload_file).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
            )
            // SQL generation
            .route("/generate", post(handlers::api::generate))
            // History and export
            .route("/history", get(handlers::api::history))
            .route("/export", get(handlers::api::export))
            // System status
            .route("/status", get(handlers::api::system_status)),
    )
}
