//! Cosine similarity over embedding vectors. Never panics; every degenerate
//! input collapses to a score of 0.0 so ranking always completes.

/// Fixed-length embedding vector as returned by the provider.
pub type EmbeddingVector = Vec<f32>;

/// Dot product over the product of Euclidean norms.
///
/// Returns 0.0 when either vector is empty, the lengths differ, either norm is
/// zero, or the result is not finite.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let mut dot = 0.0_f64;
    let mut norm_a = 0.0_f64;
    let mut norm_b = 0.0_f64;

    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let similarity = dot / (norm_a.sqrt() * norm_b.sqrt());
    if similarity.is_finite() {
        similarity
    } else {
        0.0
    }
}

/// Same as [`cosine_similarity`] but tolerates missing vectors.
pub fn optional_cosine_similarity(a: Option<&[f32]>, b: Option<&[f32]>) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) => cosine_similarity(a, b),
        _ => 0.0,
    }
}
