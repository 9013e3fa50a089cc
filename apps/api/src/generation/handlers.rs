//! Axum route handlers for the Resume API.

use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::generation::cover_letter::{generate_cover_letter, CoverLetterRequest};
use crate::generation::generator::{
    analyze, generate_resume, AnalyzeRequest, AnalyzeResponse, GenerateRequest, GenerateResponse,
};
use crate::state::AppState;

/// POST /api/v1/resumes/analyze
///
/// Ranks the submitted experiences and projects against a job description,
/// reports which blocks would be kept with a match score and recommendations,
/// and returns the LaTeX. Nothing is compiled.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let result = analyze(&state.scorer, &state.renderer, state.config.limits, request).await?;
    Ok(Json(result))
}

/// POST /api/v1/resumes/generate
///
/// Full pipeline: rank → select → render LaTeX → compile. Always yields an
/// artifact unless the render environment itself is broken.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    let response = generate_resume(
        &state.scorer,
        &state.renderer,
        &state.compiler,
        state.config.limits,
        request,
    )
    .await?;
    Ok(Json(response))
}

/// POST /api/v1/cover-letters/generate
pub async fn handle_generate_cover_letter(
    State(state): State<AppState>,
    Json(request): Json<CoverLetterRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    let response = generate_cover_letter(&state.cover_letter, &state.compiler, request).await?;
    Ok(Json(response))
}
