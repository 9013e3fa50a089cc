//! Resume Generation — orchestrates the tailoring pipeline.
//!
//! Flow: rank blocks against the job description → truncate to section limits →
//!       render LaTeX from the template → compile to a PDF artifact.
//!
//! Ranking is skipped when no job description is supplied; the content is then
//! rendered as given.
//!
//! `analyze` stops short of compiling: it returns the selection, a match
//! assessment and the LaTeX that `generate_resume` would compile.

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::analysis::{analyze_match, JobAnalysis};
use crate::models::resume::{
    Certification, EducationEntry, PersonalInfo, ResumeBlock, ResumeContent, SkillCategory,
};
use crate::render::artifacts::ArtifactSource;
use crate::render::compiler::DocumentCompiler;
use crate::render::template::TemplateRenderer;
use crate::selection::selector::{select_content, SelectionLimits, SelectionResult};
use crate::selection::semantic::SemanticScorer;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    pub job_description: String,
    #[serde(default)]
    pub experiences: Vec<ResumeBlock>,
    #[serde(default)]
    pub projects: Vec<ResumeBlock>,
    #[serde(default)]
    pub skills: Vec<SkillCategory>,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub certifications: Vec<Certification>,
    /// Rendered as "Unknown" when absent.
    #[serde(default)]
    pub personal_info: Option<PersonalInfo>,
    #[serde(default)]
    pub target_company: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeResponse {
    #[serde(flatten)]
    pub selection: SelectionResult,
    pub analysis: JobAnalysis,
    pub latex: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub job_description: Option<String>,
    pub personal_info: PersonalInfo,
    #[serde(default)]
    pub target_company: Option<String>,
    #[serde(default)]
    pub content: ResumeContent,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateResponse {
    pub job_id: Uuid,
    pub latex: String,
    pub pdf_url: String,
    pub file_name: String,
    pub source: ArtifactSource,
    /// Present when the content was ranked against a job description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excluded: Option<Vec<(String, String)>>,
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Ranks and truncates candidate blocks, scores the match and renders the
/// LaTeX without compiling it.
pub async fn analyze(
    scorer: &SemanticScorer,
    renderer: &TemplateRenderer,
    limits: SelectionLimits,
    request: AnalyzeRequest,
) -> Result<AnalyzeResponse, AppError> {
    let description = non_blank(Some(&request.job_description))
        .ok_or_else(|| AppError::Validation("job_description cannot be empty".to_string()))?;

    let selection = select_content(
        scorer,
        &request.experiences,
        &request.projects,
        description,
        limits,
    )
    .await;
    let analysis = analyze_match(
        description,
        &selection.experiences,
        &selection.projects,
        &request.skills,
    );
    info!(
        match_score = analysis.match_score,
        skills = analysis.skills.len(),
        missing = analysis.missing_skills.len(),
        used_embeddings = selection.used_embeddings,
        "Analyzed job description"
    );

    let personal = request.personal_info.unwrap_or_else(|| PersonalInfo {
        name: "Unknown".to_string(),
        ..Default::default()
    });
    let content = ResumeContent {
        experiences: selection.experiences.clone(),
        projects: selection.projects.clone(),
        skills: request.skills,
        education: request.education,
        certifications: request.certifications,
    };
    let latex = renderer.render(&content, &personal, request.target_company.as_deref());

    Ok(AnalyzeResponse {
        selection,
        analysis,
        latex,
    })
}

/// Runs the full pipeline and returns the rendered source plus artifact reference.
pub async fn generate_resume(
    scorer: &SemanticScorer,
    renderer: &TemplateRenderer,
    compiler: &DocumentCompiler,
    limits: SelectionLimits,
    request: GenerateRequest,
) -> Result<GenerateResponse, AppError> {
    let candidate_name = request.personal_info.name.trim();
    if candidate_name.is_empty() {
        return Err(AppError::Validation(
            "personal_info.name cannot be empty".to_string(),
        ));
    }

    let job_id = Uuid::new_v4();
    let mut content = request.content;
    let mut excluded = None;

    if let Some(description) = non_blank(request.job_description.as_ref()) {
        let selection = select_content(
            scorer,
            &content.experiences,
            &content.projects,
            description,
            limits,
        )
        .await;
        info!(
            %job_id,
            experiences = selection.experiences.len(),
            projects = selection.projects.len(),
            excluded = selection.excluded.len(),
            used_embeddings = selection.used_embeddings,
            "Selected content for job description"
        );
        content.experiences = selection.experiences;
        content.projects = selection.projects;
        excluded = Some(selection.excluded);
    }

    let latex = renderer.render(
        &content,
        &request.personal_info,
        request.target_company.as_deref(),
    );
    let artifact = compiler.compile(&latex, candidate_name).await?;
    info!(
        %job_id,
        path = %artifact.path.display(),
        source = %artifact.generator,
        "Resume generated"
    );

    Ok(GenerateResponse {
        job_id,
        latex,
        pdf_url: artifact.public_url,
        file_name: artifact.file_name,
        source: artifact.generator,
        excluded,
    })
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
