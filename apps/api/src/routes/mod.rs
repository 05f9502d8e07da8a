pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::pipeline::handlers;
use crate::state::AppState;
use crate::ui;

pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // JSON API
        .route("/api/v1/analyze", post(handlers::handle_analyze))
        .route("/api/v1/cover-letter", post(handlers::handle_cover_letter))
        .route("/api/v1/render", post(handlers::handle_render))
        // Page UI
        .route("/", get(ui::handle_index))
        .route("/ui/generate", post(ui::handle_generate))
        .route("/ui/download", post(ui::handle_download))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}
