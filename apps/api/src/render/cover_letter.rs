//! Cover letter renderer — fills the cover-letter asset from candidate details,
//! the recipient block and caller-supplied paragraphs.

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::models::resume::PersonalInfo;
use crate::render::escape::{escape_latex, escape_url};
use crate::render::template::{non_empty, read_template, substitute, token};
use crate::render::RenderError;

pub const COVER_LETTER_PLACEHOLDERS: &[&str] = &[
    "CANDIDATE_NAME",
    "CANDIDATE_EMAIL",
    "CANDIDATE_PHONE",
    "CANDIDATE_LOCATION",
    "CANDIDATE_LINKEDIN",
    "CANDIDATE_PORTFOLIO",
    "LETTER_DATE",
    "RECIPIENT_BLOCK",
    "SALUTATION",
    "SUBJECT_LINE",
    "OPENING_PARAGRAPH",
    "BODY_PARAGRAPHS",
    "CLOSING_PARAGRAPH",
];

const DEFAULT_HIRING_MANAGER: &str = "Hiring Manager";

/// Letter content. Paragraph text is plain prose; it is escaped on render.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoverLetter {
    pub company_name: String,
    #[serde(default)]
    pub company_address: Option<String>,
    #[serde(default)]
    pub company_city_state_zip: Option<String>,
    /// Blank or absent addresses the letter to "Hiring Manager".
    #[serde(default)]
    pub hiring_manager: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
    pub opening_paragraph: String,
    #[serde(default)]
    pub body_paragraphs: Vec<String>,
    pub closing_paragraph: String,
}

impl CoverLetter {
    pub fn hiring_manager(&self) -> &str {
        self.hiring_manager
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_HIRING_MANAGER)
    }
}

#[derive(Debug, Clone)]
pub struct CoverLetterRenderer {
    source: String,
}

impl CoverLetterRenderer {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RenderError> {
        let path = path.as_ref();
        let renderer = Self::from_source(read_template(path)?)?;
        info!(path = %path.display(), "Loaded cover letter template");
        Ok(renderer)
    }

    pub fn from_source(source: impl Into<String>) -> Result<Self, RenderError> {
        let source = non_empty(source.into())?;
        let missing: Vec<&str> = COVER_LETTER_PLACEHOLDERS
            .iter()
            .copied()
            .filter(|name| !source.contains(&token(name)))
            .collect();
        if !missing.is_empty() {
            debug!(?missing, "Cover letter template omits placeholders");
        }
        Ok(Self { source })
    }

    pub fn render(&self, letter: &CoverLetter, personal: &PersonalInfo, date: NaiveDate) -> String {
        let manager = escape_latex(letter.hiring_manager());
        let subject = letter
            .job_title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| format!("\\textbf{{Re: {}}}", escape_latex(t)))
            .unwrap_or_default();

        let values = [
            ("CANDIDATE_NAME", escape_latex(personal.name.trim())),
            ("CANDIDATE_EMAIL", escape_url(&personal.email)),
            ("CANDIDATE_PHONE", escape_latex(personal.phone.trim())),
            ("CANDIDATE_LOCATION", escape_latex(personal.location.trim())),
            ("CANDIDATE_LINKEDIN", escape_url(&personal.linkedin)),
            ("CANDIDATE_PORTFOLIO", escape_url(&personal.portfolio)),
            ("LETTER_DATE", letter_date(date)),
            ("RECIPIENT_BLOCK", recipient_block(letter)),
            ("SALUTATION", format!("Dear {manager},")),
            ("SUBJECT_LINE", subject),
            ("OPENING_PARAGRAPH", paragraph(&letter.opening_paragraph)),
            ("BODY_PARAGRAPHS", body_paragraphs(&letter.body_paragraphs)),
            ("CLOSING_PARAGRAPH", paragraph(&letter.closing_paragraph)),
        ];

        substitute(&self.source, &values)
    }
}

/// "January 2, 2025"
pub fn letter_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Recipient lines joined with `\\`, skipping blank ones so no empty line is
/// ever terminated.
fn recipient_block(letter: &CoverLetter) -> String {
    [
        Some(letter.hiring_manager()),
        Some(letter.company_name.as_str()),
        letter.company_address.as_deref(),
        letter.company_city_state_zip.as_deref(),
    ]
    .into_iter()
    .flatten()
    .map(str::trim)
    .filter(|line| !line.is_empty())
    .map(escape_latex)
    .collect::<Vec<_>>()
    .join(" \\\\\n")
}

fn paragraph(text: &str) -> String {
    escape_latex(text.trim())
}

fn body_paragraphs(paragraphs: &[String]) -> String {
    paragraphs
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(escape_latex)
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINI: &str = "{{CANDIDATE_NAME}}|{{LETTER_DATE}}\n{{RECIPIENT_BLOCK}}\n{{SUBJECT_LINE}}\n\
        {{SALUTATION}}\n{{OPENING_PARAGRAPH}}\n\n{{BODY_PARAGRAPHS}}\n\n{{CLOSING_PARAGRAPH}}";

    fn letter() -> CoverLetter {
        CoverLetter {
            company_name: "Initech & Co".into(),
            company_address: Some("4120 Freidrich Ln".into()),
            company_city_state_zip: Some("  ".into()),
            hiring_manager: None,
            job_title: Some("Backend Engineer".into()),
            opening_paragraph: "I am applying for 100% of the role.".into(),
            body_paragraphs: vec!["First.".into(), " ".into(), "Second_one.".into()],
            closing_paragraph: "Thank you.".into(),
        }
    }

    fn personal() -> PersonalInfo {
        PersonalInfo {
            name: "Ada Lovelace".into(),
            ..Default::default()
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 2).unwrap()
    }

    #[test]
    fn test_letter_date_format() {
        assert_eq!(letter_date(date()), "January 2, 2025");
        assert_eq!(
            letter_date(NaiveDate::from_ymd_opt(2024, 11, 30).unwrap()),
            "November 30, 2024"
        );
    }

    #[test]
    fn test_render_fills_letter() {
        let renderer = CoverLetterRenderer::from_source(MINI).unwrap();
        let latex = renderer.render(&letter(), &personal(), date());

        assert!(latex.starts_with("Ada Lovelace|January 2, 2025\n"));
        assert!(latex.contains("Hiring Manager \\\\\nInitech \\& Co \\\\\n4120 Freidrich Ln\n"));
        assert!(latex.contains("\\textbf{Re: Backend Engineer}"));
        assert!(latex.contains("Dear Hiring Manager,"));
        assert!(latex.contains("I am applying for 100\\% of the role."));
        assert!(latex.contains("First.\n\nSecond\\_one."));
        assert!(latex.ends_with("Thank you."));
        for name in COVER_LETTER_PLACEHOLDERS {
            assert!(!latex.contains(&token(name)), "{name} left in output");
        }
    }

    #[test]
    fn test_named_manager_and_no_subject() {
        let renderer = CoverLetterRenderer::from_source(MINI).unwrap();
        let mut letter = letter();
        letter.hiring_manager = Some(" Bill Lumbergh ".into());
        letter.job_title = None;
        let latex = renderer.render(&letter, &personal(), date());
        assert!(latex.contains("Dear Bill Lumbergh,"));
        assert!(latex.contains("\nBill Lumbergh \\\\\nInitech"));
        assert!(!latex.contains("Re:"));
    }

    #[test]
    fn test_empty_template_rejected() {
        assert!(matches!(
            CoverLetterRenderer::from_source(""),
            Err(RenderError::Template(_))
        ));
    }

    #[test]
    fn test_load_bundled_template_has_all_placeholders() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/templates/cover_letter_template.tex");
        let renderer = CoverLetterRenderer::load(path).unwrap();
        for name in COVER_LETTER_PLACEHOLDERS {
            assert!(renderer.source.contains(&token(name)), "{name} missing");
        }
    }
}
