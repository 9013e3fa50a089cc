//! Axum route handlers for compiled artifacts and compiler availability.

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::render::artifacts::load_artifact;
use crate::render::compiler::CompilerStatus;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RenderStatusResponse {
    pub compilers: Vec<CompilerStatus>,
    /// True when at least one compiler answered; otherwise only minimal PDFs are produced.
    pub latex_available: bool,
}

/// GET /api/v1/resumes/pdf/:file_name
///
/// Streams a previously generated PDF inline.
pub async fn handle_get_pdf(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> Result<Response, AppError> {
    let bytes = load_artifact(state.compiler.output_dir(), &file_name).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{file_name}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// GET /api/v1/render/status
pub async fn handle_render_status(State(state): State<AppState>) -> Json<RenderStatusResponse> {
    let compilers = state.compiler.compiler_status().await;
    let latex_available = compilers.iter().any(|c| c.available);
    Json(RenderStatusResponse {
        compilers,
        latex_available,
    })
}
