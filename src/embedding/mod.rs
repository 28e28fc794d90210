//! Embedding + model utilities.
//!
//! - [`source`] locates checkpoints (local directory or Hugging Face Hub).
//! - [`sentence`] turns text into normalized sentence embeddings.
//! - [`cache`] keeps embeddings of frequently scored texts in memory.

/// Embedding cache keyed by text hash.
pub mod cache;
/// Device selection (CPU / Metal / CUDA).
pub mod device;
/// BERT / XLM-RoBERTa backbones.
pub mod encoder;
mod error;
/// CLS / mean pooling and normalization.
pub mod pooling;
/// Sentence embedder.
pub mod sentence;
/// Model location and download.
pub mod source;
/// Tokenizer loading helpers.
pub mod utils;

pub use cache::EmbeddingCache;
pub use encoder::ModelKind;
pub use error::EmbeddingError;
pub use pooling::Pooling;
pub use sentence::{EmbedderConfig, SENTENCE_MAX_SEQ_LEN, SentenceEmbedder};
pub use source::ModelSource;
