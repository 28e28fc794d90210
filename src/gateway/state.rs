use std::sync::Arc;

use crate::scoring::SimilarityScorer;

#[derive(Clone)]
pub struct HandlerState {
    pub scorer: Arc<SimilarityScorer>,
}

impl HandlerState {
    pub fn new(scorer: Arc<SimilarityScorer>) -> Self {
        Self { scorer }
    }

    pub fn model_id(&self) -> &str {
        self.scorer.model_id()
    }
}
