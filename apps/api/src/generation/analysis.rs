//! Job analysis — a deterministic assessment of how well the selected content
//! covers a job description.
//!
//! The skill list is the description's keyword set. Scoring:
//! 0.4 when any experience was selected, 0.3 when any project was selected,
//! plus 0.3 scaled by the share of skills found in the selected blocks' tags,
//! capped at 1.0.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::resume::{ResumeBlock, SkillCategory};
use crate::selection::keywords::extract_keywords;

const EXPERIENCE_WEIGHT: f64 = 0.4;
const PROJECT_WEIGHT: f64 = 0.3;
const SKILL_WEIGHT: f64 = 0.3;

const LOW_MATCH: f64 = 0.5;
const GOOD_MATCH: f64 = 0.7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobAnalysis {
    /// Skills and keywords drawn from the job description, sorted.
    pub skills: Vec<String>,
    /// Description skills absent from the candidate's skills section.
    pub suggested_skills: Vec<String>,
    /// Description skills not covered by any selected block's tags.
    pub missing_skills: Vec<String>,
    pub recommendations: String,
    pub match_score: f64,
}

/// Sorted keyword list for a description.
pub fn job_skills(description: &str) -> Vec<String> {
    let mut skills: Vec<String> = extract_keywords(description).into_iter().collect();
    skills.sort();
    skills
}

pub fn analyze_match(
    description: &str,
    experiences: &[ResumeBlock],
    projects: &[ResumeBlock],
    existing_skills: &[SkillCategory],
) -> JobAnalysis {
    let skills = job_skills(description);
    JobAnalysis {
        suggested_skills: suggested_skills(&skills, existing_skills),
        missing_skills: missing_skills(&skills, experiences, projects),
        recommendations: recommendations(&skills, experiences, projects),
        match_score: match_score(experiences, projects, &skills),
        skills,
    }
}

pub fn match_score(experiences: &[ResumeBlock], projects: &[ResumeBlock], skills: &[String]) -> f64 {
    let experience_score = if experiences.is_empty() { 0.0 } else { EXPERIENCE_WEIGHT };
    let project_score = if projects.is_empty() { 0.0 } else { PROJECT_WEIGHT };

    let skill_score = if skills.is_empty() {
        0.0
    } else {
        let tags = block_tags(experiences, projects);
        let matched = skills.iter().filter(|s| tags_cover(&tags, s)).count();
        matched as f64 / skills.len() as f64 * SKILL_WEIGHT
    };

    (experience_score + project_score + skill_score).min(1.0)
}

/// Skills that no selected block's tags contain (case-insensitive substring).
pub fn missing_skills(
    skills: &[String],
    experiences: &[ResumeBlock],
    projects: &[ResumeBlock],
) -> Vec<String> {
    let tags = block_tags(experiences, projects);
    skills
        .iter()
        .filter(|s| !tags_cover(&tags, s))
        .cloned()
        .collect()
}

/// Skills the candidate does not list anywhere in their skills section.
pub fn suggested_skills(skills: &[String], existing: &[SkillCategory]) -> Vec<String> {
    let known: HashSet<String> = existing
        .iter()
        .flat_map(|c| c.skills.iter())
        .map(|s| s.trim().to_lowercase())
        .collect();
    skills
        .iter()
        .filter(|s| !known.contains(&s.to_lowercase()))
        .cloned()
        .collect()
}

pub fn recommendations(
    skills: &[String],
    experiences: &[ResumeBlock],
    projects: &[ResumeBlock],
) -> String {
    let mut text = String::new();

    let missing = missing_skills(skills, experiences, projects);
    if !missing.is_empty() {
        text.push_str("Consider highlighting or adding experience with: ");
        text.push_str(&missing.join(", "));
        text.push_str("\n\n");
    }
    if experiences.is_empty() {
        text.push_str(
            "No relevant work experience found. Consider adding more diverse experience \
             or highlighting transferable skills.\n\n",
        );
    }
    if projects.is_empty() {
        text.push_str(
            "No relevant projects found. Consider adding projects that demonstrate the \
             required skills.\n\n",
        );
    }

    let score = match_score(experiences, projects, skills);
    text.push_str(if score < LOW_MATCH {
        "Overall match is low. Consider tailoring your resume more specifically to this role."
    } else if score < GOOD_MATCH {
        "Moderate match. Consider emphasizing relevant experience and skills."
    } else {
        "Good match! Your experience aligns well with the job requirements."
    });
    text
}

fn block_tags(experiences: &[ResumeBlock], projects: &[ResumeBlock]) -> Vec<String> {
    experiences
        .iter()
        .chain(projects)
        .flat_map(|b| b.tags.iter())
        .map(|t| t.to_lowercase())
        .collect()
}

fn tags_cover(tags: &[String], skill: &str) -> bool {
    let skill = skill.to_lowercase();
    tags.iter().any(|t| t.contains(&skill))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
