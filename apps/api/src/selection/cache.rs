//! Embedding cache keyed by block identity plus a fingerprint of the text that
//! was embedded, so edited blocks recompute instead of reusing stale vectors.

use std::collections::HashMap;

use parking_lot::RwLock;
use sha2::{Digest, Sha256};

use crate::selection::similarity::EmbeddingVector;

/// Hex characters of the SHA-256 digest kept in the key.
const FINGERPRINT_LEN: usize = 16;

/// Process-lifetime, unbounded map from `"{block_id}_{fingerprint}"` to vector.
///
/// Safe for concurrent readers and writers. Two tasks racing on the same key
/// both compute the vector and the last write wins, which is harmless.
#[derive(Debug, Default)]
pub struct EmbeddingCache {
    entries: RwLock<HashMap<String, EmbeddingVector>>,
}

impl EmbeddingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the cache key for a block id and the text derived from it.
    pub fn key_for(block_id: &str, block_text: &str) -> String {
        let digest = Sha256::digest(block_text.as_bytes());
        let fingerprint = hex::encode(digest);
        format!("{block_id}_{}", &fingerprint[..FINGERPRINT_LEN])
    }

    pub fn get(&self, key: &str) -> Option<EmbeddingVector> {
        self.entries.read().get(key).cloned()
    }

    pub fn insert(&self, key: String, vector: EmbeddingVector) {
        self.entries.write().insert(key, vector);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}
