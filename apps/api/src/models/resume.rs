use serde::{Deserialize, Deserializer, Serialize};

/// Priority assigned to blocks whose source record carries none.
pub const DEFAULT_PRIORITY: u8 = 5;

/// One candidate unit of résumé content (an experience or a project).
///
/// Blocks are read-only inputs to the pipeline: the scorer and renderer copy or
/// select them but never mutate them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeBlock {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub date_range: Option<String>,
    /// Free-form technology string shown next to project titles.
    #[serde(default)]
    pub technologies: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub lines: Vec<String>,
    /// Multi-project work experience. When non-empty, renderers use these
    /// lines instead of `lines`.
    #[serde(default)]
    pub projects: Vec<SubProject>,
    #[serde(default = "default_priority", deserialize_with = "priority_or_default")]
    pub priority: u8,
}

/// A project nested inside a work experience block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubProject {
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub lines: Vec<String>,
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillCategory {
    pub category: String,
    #[serde(default)]
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    #[serde(default)]
    pub id: String,
    pub institution: String,
    #[serde(default)]
    pub location: Option<String>,
    pub degree: String,
    #[serde(default)]
    pub date_range: Option<String>,
    #[serde(default)]
    pub gpa: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certification {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

/// Contact fields printed in the document header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub linkedin: String,
    #[serde(default)]
    pub portfolio: String,
}

/// Everything the template renderer needs besides the personal header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeContent {
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
}

impl ResumeBlock {
    /// Creates a block with only the required fields set.
    #[cfg(test)]
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            company: None,
            location: None,
            date_range: None,
            technologies: None,
            link: None,
            tags: Vec::new(),
            lines: Vec::new(),
            projects: Vec::new(),
            priority: DEFAULT_PRIORITY,
        }
    }

    pub fn has_sub_projects(&self) -> bool {
        !self.projects.is_empty()
    }
}

fn default_priority() -> u8 {
    DEFAULT_PRIORITY
}

/// Absent or null priorities fall back to `DEFAULT_PRIORITY`; present values are kept.
fn priority_or_default<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u8>::deserialize(deserializer)?.unwrap_or(DEFAULT_PRIORITY))
}
