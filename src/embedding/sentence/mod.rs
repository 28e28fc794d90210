//! Sentence embedder (BERT / XLM-RoBERTa + tokenizer).
//!
//! Use [`EmbedderConfig::stub`] for tests without model files.

/// Sentence embedder configuration.
pub mod config;

#[cfg(test)]
mod tests;

pub use config::{EmbedderConfig, SENTENCE_MAX_SEQ_LEN};

use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use crate::constants::STUB_EMBEDDING_DIM;
use crate::embedding::device::{device_label, select_device};
use crate::embedding::encoder::{Encoder, ModelKind};
use crate::embedding::error::EmbeddingError;
use crate::embedding::pooling::{Pooling, l2_normalize};
use crate::embedding::utils::load_tokenizer;

enum EmbedderBackend {
    Model {
        encoder: Encoder,
        tokenizer: Tokenizer,
        kind: ModelKind,
        pooling: Pooling,
        device: Device,
    },
    Stub,
}

/// Turns text into L2-normalized sentence embeddings.
pub struct SentenceEmbedder {
    backend: EmbedderBackend,
    config: EmbedderConfig,
    embedding_dim: usize,
}

impl std::fmt::Debug for SentenceEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentenceEmbedder")
            .field(
                "backend",
                &match &self.backend {
                    EmbedderBackend::Model {
                        kind,
                        pooling,
                        device,
                        ..
                    } => format!("Model({kind:?}, {pooling:?}, {device:?})"),
                    EmbedderBackend::Stub => "Stub".to_string(),
                },
            )
            .field("embedding_dim", &self.embedding_dim)
            .field("max_seq_len", &self.config.max_seq_len)
            .finish()
    }
}

impl SentenceEmbedder {
    /// Loads the embedder from a config (stub mode is supported).
    pub fn load(config: EmbedderConfig) -> Result<Self, EmbeddingError> {
        config.validate()?;

        if config.testing_stub {
            warn!("Sentence embedder running in STUB mode (testing only)");
            return Ok(Self {
                backend: EmbedderBackend::Stub,
                config,
                embedding_dim: STUB_EMBEDDING_DIM,
            });
        }

        let device = select_device();
        debug!(?device, "Selected compute device for sentence embedder");

        let tokenizer = load_tokenizer(&config.model_dir, config.max_seq_len)?;
        let (encoder, kind, hidden_size) = Encoder::load(&config.model_dir, &device)?;

        let pooling = match config.pooling {
            Some(pooling) => pooling,
            None => Pooling::from_model_dir(&config.model_dir)?
                .unwrap_or_else(|| Pooling::default_for(kind)),
        };

        info!(
            model_dir = %config.model_dir.display(),
            kind = ?kind,
            pooling = ?pooling,
            embedding_dim = hidden_size,
            max_seq_len = config.max_seq_len,
            device = device_label(&device),
            "Sentence embedder loaded"
        );

        Ok(Self {
            backend: EmbedderBackend::Model {
                encoder,
                tokenizer,
                kind,
                pooling,
                device,
            },
            config,
            embedding_dim: hidden_size,
        })
    }

    /// Generates an embedding for a single string.
    ///
    /// The empty string yields a zero vector, which scores `0.0` against anything.
    /// Whitespace-only text is embedded like any other input.
    pub fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.is_empty() {
            return Ok(vec![0.0; self.embedding_dim]);
        }

        match &self.backend {
            EmbedderBackend::Model {
                encoder,
                tokenizer,
                pooling,
                device,
                ..
            } => self.embed_with_model(text, encoder, tokenizer, *pooling, device),
            EmbedderBackend::Stub => Ok(self.embed_stub(text)),
        }
    }

    /// Generates embeddings for a batch of strings.
    pub fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        // Sequential: single-text encoding avoids padding entirely.
        texts.iter().map(|text| self.embed(text)).collect()
    }

    fn embed_with_model(
        &self,
        text: &str,
        encoder: &Encoder,
        tokenizer: &Tokenizer,
        pooling: Pooling,
        device: &Device,
    ) -> Result<Vec<f32>, EmbeddingError> {
        let encoding =
            tokenizer
                .encode(text, true)
                .map_err(|e| EmbeddingError::TokenizationFailed {
                    reason: e.to_string(),
                })?;

        let token_ids = encoding.get_ids();
        if token_ids.is_empty() {
            return Ok(vec![0.0; self.embedding_dim]);
        }

        debug!(
            text_len = text.len(),
            token_count = token_ids.len(),
            "Generating embedding (transformer forward pass)"
        );

        // [1, seq_len]
        let input_ids = Tensor::new(token_ids, device)?.unsqueeze(0)?;
        let attention_mask = Tensor::new(encoding.get_attention_mask(), device)?.unsqueeze(0)?;
        let token_type_ids = input_ids.zeros_like()?;

        let hidden_states = encoder
            .forward(&input_ids, &token_type_ids, &attention_mask)
            .map_err(|e| EmbeddingError::InferenceFailed {
                reason: format!("transformer forward pass failed: {e}"),
            })?;

        let pooled = pooling.apply(&hidden_states, &attention_mask)?;
        let embedding = l2_normalize(&pooled)?.squeeze(0)?.to_vec1::<f32>()?;

        if embedding.len() != self.embedding_dim {
            return Err(EmbeddingError::InferenceFailed {
                reason: format!(
                    "unexpected embedding dims: got {}, expected {}",
                    embedding.len(),
                    self.embedding_dim
                ),
            });
        }

        Ok(embedding)
    }

    fn embed_stub(&self, text: &str) -> Vec<f32> {
        debug!(text_len = text.len(), "Generating stub embedding");

        let digest = blake3::hash(text.as_bytes());
        let mut seed = [0u8; 8];
        seed.copy_from_slice(&digest.as_bytes()[..8]);
        let mut state = u64::from_le_bytes(seed);

        let mut embedding: Vec<f32> = (0..self.embedding_dim)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
                ((state >> 32) as f32 / u32::MAX as f32) * 2.0 - 1.0
            })
            .collect();

        let norm = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut embedding {
                *x /= norm;
            }
        }

        embedding
    }

    /// Returns the output embedding dimension.
    pub fn embedding_dim(&self) -> usize {
        self.embedding_dim
    }

    /// Returns `true` if running in stub mode.
    pub fn is_stub(&self) -> bool {
        matches!(self.backend, EmbedderBackend::Stub)
    }

    /// Name of the compute device (`"stub"` in stub mode).
    pub fn device_name(&self) -> &'static str {
        match &self.backend {
            EmbedderBackend::Model { device, .. } => device_label(device),
            EmbedderBackend::Stub => "stub",
        }
    }

    /// Pooling mode in use (`None` in stub mode).
    pub fn pooling(&self) -> Option<Pooling> {
        match &self.backend {
            EmbedderBackend::Model { pooling, .. } => Some(*pooling),
            EmbedderBackend::Stub => None,
        }
    }

    /// Returns the embedder configuration.
    pub fn config(&self) -> &EmbedderConfig {
        &self.config
    }
}
