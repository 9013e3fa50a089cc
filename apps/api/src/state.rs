use std::sync::Arc;

use crate::config::Config;
use crate::render::compiler::DocumentCompiler;
use crate::render::cover_letter::CoverLetterRenderer;
use crate::render::template::TemplateRenderer;
use crate::selection::semantic::SemanticScorer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Owns the embedding cache; shared by every request.
    pub scorer: Arc<SemanticScorer>,
    pub renderer: Arc<TemplateRenderer>,
    pub cover_letter: Arc<CoverLetterRenderer>,
    pub compiler: Arc<DocumentCompiler>,
}
