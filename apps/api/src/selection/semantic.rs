//! Semantic Scorer — ranks résumé blocks against a job description.
//!
//! Embedding similarity is the primary signal. Keyword overlap takes over for
//! the whole request when the description cannot be embedded, and for a single
//! block when only that block's embedding fails.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::embedding_client::Embedder;
use crate::models::resume::ResumeBlock;
use crate::selection::cache::EmbeddingCache;
use crate::selection::keywords::{extract_keywords, keyword_score};
use crate::selection::similarity::{optional_cosine_similarity, EmbeddingVector};

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Where a block's score came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreProvenance {
    Embedding,
    Keyword,
}

/// A block paired with its ranking score. Only lives for the duration of a rank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredBlock {
    pub block: ResumeBlock,
    pub score: f64,
    pub provenance: ScoreProvenance,
}

// ────────────────────────────────────────────────────────────────────────────
// Scorer
// ────────────────────────────────────────────────────────────────────────────

pub struct SemanticScorer {
    embedder: Arc<dyn Embedder>,
    cache: EmbeddingCache,
}

impl SemanticScorer {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            cache: EmbeddingCache::new(),
        }
    }

    /// Scores every block and returns them sorted by descending score.
    ///
    /// Ties keep their input order. Never fails: every embedding error is
    /// absorbed by the keyword fallback.
    pub async fn rank(&self, blocks: &[ResumeBlock], description: &str) -> Vec<ScoredBlock> {
        let description_embedding = match self.embedder.embed(description).await {
            Ok(vector) => vector,
            Err(e) => {
                warn!(
                    "Job description embedding failed, keyword scoring {} blocks: {e}",
                    blocks.len()
                );
                return rank_by_keywords(blocks, description);
            }
        };

        let keywords = extract_keywords(description);
        let mut scored = Vec::with_capacity(blocks.len());

        for block in blocks {
            let scored_block = match self.block_embedding(block).await {
                Some(vector) => ScoredBlock {
                    block: block.clone(),
                    score: similarity_score(&description_embedding, &vector),
                    provenance: ScoreProvenance::Embedding,
                },
                None => ScoredBlock {
                    block: block.clone(),
                    score: keyword_score(block, &keywords),
                    provenance: ScoreProvenance::Keyword,
                },
            };
            scored.push(scored_block);
        }

        sort_descending(&mut scored);

        let keyword_fallbacks = scored
            .iter()
            .filter(|s| s.provenance == ScoreProvenance::Keyword)
            .count();
        info!(
            "Ranked {} blocks ({} via keyword fallback)",
            scored.len(),
            keyword_fallbacks
        );

        scored
    }

    /// Looks up or computes the embedding for a block. Failures are not cached.
    async fn block_embedding(&self, block: &ResumeBlock) -> Option<EmbeddingVector> {
        let text = block_text(block);
        let key = EmbeddingCache::key_for(&block.id, &text);

        if let Some(vector) = self.cache.get(&key) {
            debug!("Embedding cache hit for block {}", block.id);
            return Some(vector);
        }

        match self.embedder.embed(&text).await {
            Ok(vector) => {
                self.cache.insert(key, vector.clone());
                Some(vector)
            }
            Err(e) => {
                warn!("Embedding failed for block {}, using keywords: {e}", block.id);
                None
            }
        }
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&self) {
        if self.cache.is_empty() {
            debug!("Embedding cache already empty");
            return;
        }
        let cleared = self.cache.len();
        self.cache.clear();
        info!(cleared, "Embedding cache cleared");
    }
}

/// Text embedded for a block: title, company, technologies, tags, lines, and
/// every sub-project's tags and lines, space-joined and trimmed.
pub fn block_text(block: &ResumeBlock) -> String {
    let mut parts: Vec<&str> = vec![block.title.as_str()];
    parts.extend(block.company.as_deref());
    parts.extend(block.technologies.as_deref());
    parts.extend(block.tags.iter().map(String::as_str));
    parts.extend(block.lines.iter().map(String::as_str));
    for project in &block.projects {
        parts.extend(project.tags.iter().map(String::as_str));
        parts.extend(project.lines.iter().map(String::as_str));
    }

    parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Keyword-only ranking used when the description itself cannot be embedded.
pub fn rank_by_keywords(blocks: &[ResumeBlock], description: &str) -> Vec<ScoredBlock> {
    let keywords = extract_keywords(description);
    let mut scored: Vec<ScoredBlock> = blocks
        .iter()
        .map(|block| ScoredBlock {
            block: block.clone(),
            score: keyword_score(block, &keywords),
            provenance: ScoreProvenance::Keyword,
        })
        .collect();
    sort_descending(&mut scored);
    scored
}

/// Cosine similarity floored at zero so every score is non-negative.
fn similarity_score(description: &[f32], block: &[f32]) -> f64 {
    optional_cosine_similarity(Some(description), Some(block)).max(0.0)
}

/// Stable descending sort: equal scores keep their relative input order.
fn sort_descending(scored: &mut [ScoredBlock]) {
    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
