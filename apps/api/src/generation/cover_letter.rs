//! Cover letter generation — validates the letter, renders it and compiles it
//! through the same compiler chain as résumés.

use chrono::Local;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::generator::GenerateResponse;
use crate::models::resume::PersonalInfo;
use crate::render::compiler::DocumentCompiler;
use crate::render::cover_letter::{CoverLetter, CoverLetterRenderer};

#[derive(Debug, Clone, Deserialize)]
pub struct CoverLetterRequest {
    pub personal_info: PersonalInfo,
    #[serde(flatten)]
    pub letter: CoverLetter,
}

pub async fn generate_cover_letter(
    renderer: &CoverLetterRenderer,
    compiler: &DocumentCompiler,
    request: CoverLetterRequest,
) -> Result<GenerateResponse, AppError> {
    let candidate_name = request.personal_info.name.trim();
    let letter = &request.letter;
    let required = [
        ("personal_info.name", candidate_name),
        ("company_name", letter.company_name.trim()),
        ("opening_paragraph", letter.opening_paragraph.trim()),
        ("closing_paragraph", letter.closing_paragraph.trim()),
    ];
    if let Some((field, _)) = required.iter().find(|(_, value)| value.is_empty()) {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }

    let job_id = Uuid::new_v4();
    let latex = renderer.render(letter, &request.personal_info, Local::now().date_naive());

    let title = format!("{candidate_name} - Cover Letter");
    let label = format!("{candidate_name}_{}_CoverLetter", letter.company_name.trim());
    let artifact = compiler.compile_document(&latex, &title, &label).await?;
    info!(
        %job_id,
        company = %letter.company_name.trim(),
        path = %artifact.path.display(),
        source = %artifact.generator,
        "Cover letter generated"
    );

    Ok(GenerateResponse {
        job_id,
        latex,
        pdf_url: artifact.public_url,
        file_name: artifact.file_name,
        source: artifact.generator,
        excluded: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::render::artifacts::ArtifactSource;
    use crate::render::compiler::tests::{render_config, Behavior, FakeRunner};

    const TEMPLATE: &str = "{{CANDIDATE_NAME}}\n{{SALUTATION}}\n{{OPENING_PARAGRAPH}}\n{{CLOSING_PARAGRAPH}}";

    fn request() -> CoverLetterRequest {
        CoverLetterRequest {
            personal_info: PersonalInfo {
                name: "Ada Lovelace".into(),
                ..Default::default()
            },
            letter: CoverLetter {
                company_name: "Initech".into(),
                opening_paragraph: "I would like to join Initech.".into(),
                closing_paragraph: "Thank you for your time.".into(),
                ..Default::default()
            },
        }
    }

    fn setup(behaviors: &[(&str, Behavior)]) -> (tempfile::TempDir, CoverLetterRenderer, DocumentCompiler) {
        let root = tempfile::tempdir().unwrap();
        let compiler = DocumentCompiler::new(
            &render_config(root.path()),
            Arc::new(FakeRunner::new(behaviors)),
        );
        (root, CoverLetterRenderer::from_source(TEMPLATE).unwrap(), compiler)
    }

    #[tokio::test]
    async fn test_cover_letter_compiles_with_company_label() {
        let (_root, renderer, compiler) = setup(&[("pdflatex", Behavior::Succeed)]);
        let response = generate_cover_letter(&renderer, &compiler, request())
            .await
            .unwrap();

        assert!(response.latex.starts_with("Ada Lovelace\nDear Hiring Manager,\n"));
        assert!(response.file_name.starts_with("Ada_Lovelace_Initech_CoverLetter_"));
        assert_eq!(response.source, ArtifactSource::Compiler("pdflatex".into()));
        assert!(response.excluded.is_none());
    }

    #[tokio::test]
    async fn test_cover_letter_falls_back_to_minimal_pdf() {
        let (root, renderer, compiler) = setup(&[]);
        let response = generate_cover_letter(&renderer, &compiler, request())
            .await
            .unwrap();
        assert_eq!(response.source, ArtifactSource::Fallback);
        let bytes = std::fs::read(root.path().join("out").join(&response.file_name)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_cover_letter_requires_fields() {
        let (_root, renderer, compiler) = setup(&[]);

        let mut missing_company = request();
        missing_company.letter.company_name = "  ".into();
        let err = generate_cover_letter(&renderer, &compiler, missing_company)
            .await
            .unwrap_err();
        assert!(matches!(&err, AppError::Validation(m) if m.contains("company_name")));

        let mut missing_closing = request();
        missing_closing.letter.closing_paragraph = String::new();
        let err = generate_cover_letter(&renderer, &compiler, missing_closing)
            .await
            .unwrap_err();
        assert!(matches!(&err, AppError::Validation(m) if m.contains("closing_paragraph")));
    }
}
