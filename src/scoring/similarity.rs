use crate::constants::NORM_EPSILON;

use super::error::ScoringError;

/// Cosine similarity of two vectors, clamped to `[-1, 1]`.
///
/// Norms are floored at a small epsilon, so a zero vector scores `0.0` against
/// anything instead of dividing by zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, ScoringError> {
    if a.len() != b.len() {
        return Err(ScoringError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let (dot, norm_a, norm_b) = a
        .iter()
        .zip(b)
        .fold((0.0f32, 0.0f32, 0.0f32), |(dot, na, nb), (x, y)| {
            (dot + x * y, na + x * x, nb + y * y)
        });

    let denom = norm_a.sqrt().max(NORM_EPSILON) * norm_b.sqrt().max(NORM_EPSILON);
    Ok((dot / denom).clamp(-1.0, 1.0))
}
