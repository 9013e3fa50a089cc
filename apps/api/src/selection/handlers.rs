//! Axum route handlers for the embedding cache.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CacheStatsResponse {
    pub size: usize,
}

/// GET /api/v1/embeddings/cache
pub async fn handle_cache_stats(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    Json(CacheStatsResponse {
        size: state.scorer.cache_len(),
    })
}

/// DELETE /api/v1/embeddings/cache
///
/// Drops every cached block embedding; the next ranking recomputes them.
pub async fn handle_clear_cache(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    state.scorer.clear_cache();
    Json(CacheStatsResponse { size: 0 })
}
