use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::embedding::{
    EmbedderConfig, EmbeddingCache, EmbeddingError, ModelSource, SentenceEmbedder,
};

use super::error::ScoringError;
use super::grading::{self, BestMatch};
use super::similarity::cosine_similarity;

/// Model id reported when running the stub embedder.
pub const STUB_MODEL_ID: &str = "stub";

/// Anything that can score a submitted answer against one reference answer.
pub trait AnswerScorer {
    fn similarity(&self, answer: &str, correct_answer: &str) -> Result<f32, ScoringError>;
}

/// Embeds both texts and compares them with cosine similarity.
pub struct SimilarityScorer {
    embedder: SentenceEmbedder,
    cache: EmbeddingCache,
    model_id: String,
}

impl std::fmt::Debug for SimilarityScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimilarityScorer")
            .field("model_id", &self.model_id)
            .field("embedder", &self.embedder)
            .field("cache", &self.cache)
            .finish()
    }
}

impl SimilarityScorer {
    pub fn new(embedder: SentenceEmbedder, cache: EmbeddingCache, model_id: impl Into<String>) -> Self {
        Self {
            embedder,
            cache,
            model_id: model_id.into(),
        }
    }

    /// Stub-backed scorer with a small cache.
    pub fn stub() -> Result<Self, ScoringError> {
        let embedder = SentenceEmbedder::load(EmbedderConfig::stub())?;
        Ok(Self::new(
            embedder,
            EmbeddingCache::with_capacity(256),
            STUB_MODEL_ID,
        ))
    }

    /// Builds a scorer from service configuration, downloading the model if needed.
    pub async fn from_config(config: &Config) -> Result<Self, ScoringError> {
        let cache = EmbeddingCache::with_capacity(config.embedding_cache_capacity);

        if config.stub {
            let embedder = SentenceEmbedder::load(
                EmbedderConfig::stub().with_max_seq_len(config.max_seq_len),
            )?;
            return Ok(Self::new(embedder, cache, STUB_MODEL_ID));
        }

        let source = ModelSource::parse(&config.model, &config.revision);
        let model_dir = source.resolve(config.cache_dir.as_deref()).await?;
        let embedder_config = EmbedderConfig::new(model_dir).with_max_seq_len(config.max_seq_len);

        let embedder = tokio::task::spawn_blocking(move || SentenceEmbedder::load(embedder_config))
            .await
            .map_err(|e| EmbeddingError::ModelLoadFailed {
                reason: format!("model loading task failed: {e}"),
            })??;

        info!(
            model = %source.id(),
            embedding_dim = embedder.embedding_dim(),
            cache_enabled = cache.is_enabled(),
            "Similarity scorer ready"
        );

        Ok(Self::new(embedder, cache, source.id()))
    }

    /// Embeds `text`, consulting the cache first.
    pub fn embed(&self, text: &str) -> Result<Arc<[f32]>, ScoringError> {
        Ok(self
            .cache
            .get_or_try_insert(text, || self.embedder.embed(text))?)
    }

    /// Cosine similarity between an answer and a reference answer.
    ///
    /// Non-finite results are reported as `0.0`.
    pub fn score(&self, answer: &str, correct_answer: &str) -> Result<f32, ScoringError> {
        let answer_embedding = self.embed(answer)?;
        let reference_embedding = self.embed(correct_answer)?;

        let similarity = cosine_similarity(&answer_embedding, &reference_embedding)?;
        if !similarity.is_finite() {
            warn!(similarity, "Non-finite similarity, reporting 0.0");
            return Ok(0.0);
        }

        debug!(
            answer_len = answer.len(),
            reference_len = correct_answer.len(),
            similarity,
            "Scored answer"
        );

        Ok(similarity)
    }

    /// Best-scoring reference among `correct_answers`.
    pub fn best_match(
        &self,
        answer: &str,
        correct_answers: &[String],
    ) -> Result<BestMatch, ScoringError> {
        grading::best_match(self, answer, correct_answers)
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn embedder(&self) -> &SentenceEmbedder {
        &self.embedder
    }

    pub fn cache(&self) -> &EmbeddingCache {
        &self.cache
    }

    pub fn is_stub(&self) -> bool {
        self.embedder.is_stub()
    }
}

impl AnswerScorer for SimilarityScorer {
    fn similarity(&self, answer: &str, correct_answer: &str) -> Result<f32, ScoringError> {
        self.score(answer, correct_answer)
    }
}

impl<T: AnswerScorer + ?Sized> AnswerScorer for Arc<T> {
    fn similarity(&self, answer: &str, correct_answer: &str) -> Result<f32, ScoringError> {
        (**self).similarity(answer, correct_answer)
    }
}
