//! Template renderer — substitutes named `{{PLACEHOLDER}}` tokens in the résumé
//! asset with escaped personal fields and generated sections.

use std::path::Path;

use tracing::{debug, info};

use crate::models::resume::{PersonalInfo, ResumeContent};
use crate::render::escape::{escape_latex, escape_url};
use crate::render::sections::{
    certification_section, education_section, experience_section, project_section,
    skills_section,
};
use crate::render::RenderError;

pub const PLACEHOLDERS: &[&str] = &[
    "CANDIDATE_NAME",
    "CANDIDATE_EMAIL",
    "CANDIDATE_PHONE",
    "CANDIDATE_LOCATION",
    "CANDIDATE_LINKEDIN",
    "CANDIDATE_PORTFOLIO",
    "TARGET_COMPANY",
    "EXPERIENCE_SECTION",
    "PROJECTS_SECTION",
    "SKILLS_SECTION",
    "EDUCATION_SECTION",
    "CERTIFICATIONS_SECTION",
];

/// Holds the template asset in memory; rendering performs no I/O.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    source: String,
}

impl TemplateRenderer {
    /// Reads the template once. A missing or unreadable asset is a configuration
    /// error that names the path.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RenderError> {
        let path = path.as_ref();
        let renderer = Self::from_source(read_template(path)?)?;
        info!(path = %path.display(), "Loaded resume template");
        Ok(renderer)
    }

    pub fn from_source(source: impl Into<String>) -> Result<Self, RenderError> {
        let source = non_empty(source.into())?;
        let missing: Vec<&str> = PLACEHOLDERS
            .iter()
            .copied()
            .filter(|name| !source.contains(&token(name)))
            .collect();
        if !missing.is_empty() {
            // Optional sections may legitimately be left out of a custom asset.
            debug!(?missing, "Template omits placeholders");
        }
        Ok(Self { source })
    }

    pub fn render(
        &self,
        content: &ResumeContent,
        personal: &PersonalInfo,
        target_company: Option<&str>,
    ) -> String {
        let values = [
            ("CANDIDATE_NAME", escape_latex(personal.name.trim())),
            ("CANDIDATE_EMAIL", escape_url(&personal.email)),
            ("CANDIDATE_PHONE", escape_latex(personal.phone.trim())),
            ("CANDIDATE_LOCATION", escape_latex(personal.location.trim())),
            ("CANDIDATE_LINKEDIN", escape_url(&personal.linkedin)),
            ("CANDIDATE_PORTFOLIO", escape_url(&personal.portfolio)),
            (
                "TARGET_COMPANY",
                escape_latex(target_company.map(str::trim).unwrap_or_default()),
            ),
            ("EXPERIENCE_SECTION", experience_section(&content.experiences)),
            ("PROJECTS_SECTION", project_section(&content.projects)),
            ("SKILLS_SECTION", skills_section(&content.skills)),
            ("EDUCATION_SECTION", education_section(&content.education)),
            (
                "CERTIFICATIONS_SECTION",
                certification_section(&content.certifications),
            ),
        ];

        substitute(&self.source, &values)
    }
}

pub(crate) fn read_template(path: &Path) -> Result<String, RenderError> {
    std::fs::read_to_string(path).map_err(|e| {
        RenderError::Template(format!("cannot read template {}: {e}", path.display()))
    })
}

pub(crate) fn non_empty(source: String) -> Result<String, RenderError> {
    if source.trim().is_empty() {
        return Err(RenderError::Template("template is empty".into()));
    }
    Ok(source)
}

pub(crate) fn token(name: &str) -> String {
    format!("{{{{{name}}}}}")
}

/// Single left-to-right pass so substituted text is never scanned for tokens
/// again. Unknown `{{...}}` sequences are copied through.
pub(crate) fn substitute(source: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(source.len() * 2);
    let mut rest = source;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let replaced = after.find("}}").and_then(|end| {
            let name = &after[..end];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (value, end))
        });
        match replaced {
            Some((value, end)) => {
                out.push_str(value);
                rest = &after[end + 2..];
            }
            None => {
                // Advance one brace so "{{{NAME}}}" still finds its token.
                out.push('{');
                rest = &rest[start + 1..];
            }
        }
    }
    out.push_str(rest);
    out
}
