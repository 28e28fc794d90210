use thiserror::Error;

use crate::embedding::EmbeddingError;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("embedding dimensions differ: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    #[error("scoring computation failed: {reason}")]
    ComputationFailed { reason: String },
}

impl ScoringError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        ScoringError::InvalidInput {
            reason: reason.into(),
        }
    }
}
