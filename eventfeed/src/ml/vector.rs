//! Pure vector helpers: L2 normalization, zero detection and cosine similarity.
//!
//! Norms and dot products are accumulated in `f64` so that a normalized
//! 384-dim vector has a norm within `1e-6` of one.

use super::EMBEDDING_DIM;

/// L2 norm of a vector
pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter()
        .map(|&x| f64::from(x) * f64::from(x))
        .sum::<f64>()
        .sqrt() as f32
}

/// Whether the vector is the "no embedding" sentinel
pub fn is_zero(v: &[f32]) -> bool {
    v.iter().all(|&x| x == 0.0)
}

/// Normalize a vector to unit length.
///
/// A vector whose norm is exactly zero is returned unchanged.
pub fn normalize(v: &[f32]) -> Vec<f32> {
    let norm = v
        .iter()
        .map(|&x| f64::from(x) * f64::from(x))
        .sum::<f64>()
        .sqrt();

    if norm == 0.0 {
        return v.to_vec();
    }

    v.iter().map(|&x| (f64::from(x) / norm) as f32).collect()
}

/// Normalize an optional vector; absence becomes the all-zero vector.
pub fn normalize_or_zero(v: Option<&[f32]>) -> Vec<f32> {
    match v {
        Some(v) => normalize(v),
        None => vec![0.0; EMBEDDING_DIM],
    }
}

/// Cosine similarity (`1 - cosine_distance`).
///
/// Mismatched lengths and zero vectors yield `0.0`.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a.sqrt() * norm_b.sqrt())) as f32
}

/// Weighted blend `alpha * a + (1 - alpha) * b`.
///
/// Both inputs must have the same length; the shorter one bounds the result.
pub fn blend(a: &[f32], b: &[f32], alpha: f32) -> Vec<f32> {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| alpha * x + (1.0 - alpha) * y)
        .collect()
}
