//! Keyword Scorer — lexical overlap between a block and a job description.
//!
//! Used as the default ranking signal when embeddings are unavailable and as the
//! per-block fallback when a single embedding call fails. Scores are unbounded
//! accumulations, not probabilities.

use std::collections::HashSet;

use crate::models::resume::{ResumeBlock, SubProject};

const EXACT_MATCH_WEIGHT: f64 = 1.0;
const PARTIAL_MATCH_WEIGHT: f64 = 0.5;
const MIN_KEYWORD_LEN: usize = 3;

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "is", "are", "was", "were", "be", "been", "being", "have", "has", "had", "do", "does", "did",
    "will", "would", "could", "should", "may", "might", "must", "can", "this", "that", "these",
    "those", "i", "you", "he", "she", "it", "we", "they", "me", "him", "her", "us", "them", "my",
    "your", "his", "its", "our", "their",
];

/// Extracts the query keyword set from free text.
///
/// Lowercases, replaces every non-alphanumeric character with a space, splits on
/// whitespace, and drops short tokens and stop words.
pub fn extract_keywords(text: &str) -> HashSet<String> {
    let normalized: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    normalized
        .split_whitespace()
        .filter(|word| word.len() >= MIN_KEYWORD_LEN)
        .filter(|word| !is_stop_word(word))
        .map(str::to_string)
        .collect()
}

/// Scores a block against a precomputed keyword set.
///
/// The block's own tags and lines are scored once; every sub-project adds its
/// own score over its tags and lines.
pub fn keyword_score(block: &ResumeBlock, keywords: &HashSet<String>) -> f64 {
    if keywords.is_empty() {
        return 0.0;
    }

    let own_tokens = token_set(&block.tags, &block.lines);
    let projects_score: f64 = block
        .projects
        .iter()
        .map(|project| sub_project_score(project, keywords))
        .sum();

    projects_score + overlap_score(&own_tokens, keywords)
}

/// Convenience wrapper that extracts keywords from raw description text first.
#[cfg(test)]
pub fn keyword_score_text(block: &ResumeBlock, description: &str) -> f64 {
    keyword_score(block, &extract_keywords(description))
}

fn sub_project_score(project: &SubProject, keywords: &HashSet<String>) -> f64 {
    overlap_score(&token_set(&project.tags, &project.lines), keywords)
}

/// Tags are kept whole (lowercased); lines contribute their whitespace-split words.
fn token_set(tags: &[String], lines: &[String]) -> HashSet<String> {
    let mut tokens: HashSet<String> = tags
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();

    for line in lines {
        tokens.extend(line.to_lowercase().split_whitespace().map(str::to_string));
    }

    tokens
}

fn overlap_score(tokens: &HashSet<String>, keywords: &HashSet<String>) -> f64 {
    let mut score = 0.0;
    for keyword in keywords {
        let keyword = keyword.to_lowercase();
        if tokens.contains(&keyword) {
            score += EXACT_MATCH_WEIGHT;
        }
        let partial_hits = tokens
            .iter()
            .filter(|token| token.contains(keyword.as_str()) || keyword.contains(token.as_str()))
            .count();
        score += PARTIAL_MATCH_WEIGHT * partial_hits as f64;
    }
    score
}

fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
