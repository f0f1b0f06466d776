//! Similarity computation for embeddings.
//!
//! Ranking is an exact linear scan: O(n·d) per query. That is fine for
//! thousands of vectors and the intended scaling limit; there is no
//! approximate structure behind it.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::error::{EmbeddingError, Result};

/// Euclidean norm of a vector. Zero for an empty or all-zero vector.
/// Accumulates in `f64`; tiny and huge components stay representable.
pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter()
        .map(|x| f64::from(*x) * f64::from(*x))
        .sum::<f64>()
        .sqrt() as f32
}

fn dot_f64(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| f64::from(*x) * f64::from(*y))
        .sum()
}

/// Compute the dot product between two embeddings.
pub fn dot_product(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(EmbeddingError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    Ok(dot_f64(a, b) as f32)
}

/// Compute the cosine similarity between two embeddings.
///
/// Returns a value between -1.0 and 1.0, where:
/// - 1.0 means identical direction
/// - 0.0 means orthogonal vectors
/// - -1.0 means opposite vectors
///
/// A zero vector has no direction; its similarity to anything is 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(EmbeddingError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    Ok(cosine_with_norms(dot_f64(a, b), l2_norm(a), l2_norm(b)))
}

/// Cosine similarity from a dot product and precomputed norms.
pub fn cosine_with_norms(dot: f64, norm_a: f32, norm_b: f32) -> f32 {
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (f64::from(norm_a) * f64::from(norm_b))) as f32
}

/// A ranked candidate: its position in the scanned collection and its score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    /// Position of the candidate in the input sequence.
    pub position: usize,

    /// Cosine similarity to the query.
    pub score: f32,
}

/// Rank candidates by cosine similarity to `query`, best first.
///
/// Each candidate is a vector paired with its precomputed norm. Candidates
/// with a zero norm are skipped. Equal scores keep their input order. At most
/// `k` candidates are returned.
pub fn rank_top_k<'a, I>(query: &[f32], query_norm: f32, candidates: I, k: usize) -> Vec<RankedCandidate>
where
    I: IntoIterator<Item = (&'a [f32], f32)>,
{
    if k == 0 || query_norm == 0.0 {
        return Vec::new();
    }

    let mut scored: Vec<RankedCandidate> = candidates
        .into_iter()
        .enumerate()
        .filter(|(_, (vector, norm))| *norm != 0.0 && vector.len() == query.len())
        .map(|(position, (vector, norm))| {
            let dot = dot_f64(query, vector);
            RankedCandidate {
                position,
                score: cosine_with_norms(dot, query_norm, norm),
            }
        })
        .collect();

    // `sort_by_key` is stable, so ties keep their scan order.
    scored.sort_by_key(|candidate| std::cmp::Reverse(OrderedFloat(candidate.score)));
    scored.truncate(k);
    scored
}
