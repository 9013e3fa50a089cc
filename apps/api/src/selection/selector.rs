//! Block Selector — truncates ranked blocks to the configured section limits.
//!
//! Downstream renderers only need the structured blocks, so scores are
//! dropped here. Exclusions are reported for transparency.

use serde::{Deserialize, Serialize};

use crate::models::resume::ResumeBlock;
use crate::selection::semantic::{ScoreProvenance, ScoredBlock, SemanticScorer};

/// Per-section truncation counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionLimits {
    pub max_experiences: usize,
    pub max_projects: usize,
}

impl Default for SelectionLimits {
    fn default() -> Self {
        Self {
            max_experiences: 3,
            max_projects: 3,
        }
    }
}

/// Outcome of ranking and truncating experiences and projects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionResult {
    pub experiences: Vec<ResumeBlock>,
    pub projects: Vec<ResumeBlock>,
    pub excluded: Vec<(String, String)>, // (block_id, reason)
    /// False when any selected block was scored by keyword fallback.
    pub used_embeddings: bool,
}

/// Returns the first `max_count` blocks of a ranked list, scores discarded.
pub fn select_top(ranked: Vec<ScoredBlock>, max_count: usize) -> Vec<ResumeBlock> {
    ranked
        .into_iter()
        .take(max_count)
        .map(|scored| scored.block)
        .collect()
}

/// Ranks both sections against the description and applies the limits.
pub async fn select_content(
    scorer: &SemanticScorer,
    experiences: &[ResumeBlock],
    projects: &[ResumeBlock],
    description: &str,
    limits: SelectionLimits,
) -> SelectionResult {
    let ranked_experiences = scorer.rank(experiences, description).await;
    let ranked_projects = scorer.rank(projects, description).await;

    let used_embeddings = ranked_experiences
        .iter()
        .chain(ranked_projects.iter())
        .all(|s| s.provenance == ScoreProvenance::Embedding);

    let mut excluded = excluded_beyond(&ranked_experiences, limits.max_experiences, "experience");
    excluded.extend(excluded_beyond(&ranked_projects, limits.max_projects, "project"));

    SelectionResult {
        experiences: select_top(ranked_experiences, limits.max_experiences),
        projects: select_top(ranked_projects, limits.max_projects),
        excluded,
        used_embeddings,
    }
}

fn excluded_beyond(ranked: &[ScoredBlock], limit: usize, section: &str) -> Vec<(String, String)> {
    ranked
        .iter()
        .skip(limit)
        .map(|scored| {
            (
                scored.block.id.clone(),
                format!(
                    "Section limit reached ({limit} max for {section}, score {:.3})",
                    scored.score
                ),
            )
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
