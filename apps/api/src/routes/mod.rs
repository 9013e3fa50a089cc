pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::generation::handlers as generation;
use crate::render::handlers as render;
use crate::selection::handlers as selection;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Resume API
        .route("/api/v1/resumes/analyze", post(generation::handle_analyze))
        .route("/api/v1/resumes/generate", post(generation::handle_generate))
        .route("/api/v1/resumes/pdf/:file_name", get(render::handle_get_pdf))
        // Cover letter API
        .route(
            "/api/v1/cover-letters/generate",
            post(generation::handle_generate_cover_letter),
        )
        // Embedding cache
        .route(
            "/api/v1/embeddings/cache",
            get(selection::handle_cache_stats).delete(selection::handle_clear_cache),
        )
        // Render API
        .route("/api/v1/render/status", get(render::handle_render_status))
        .with_state(state)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
