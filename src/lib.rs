//! quizsim library crate (used by the binary and integration tests).
//!
//! Scores how close a submitted quiz answer is to a reference answer by comparing
//! sentence embeddings with cosine similarity.
//!
//! # Public API Surface
//!
//! ## Core Types
//! - [`Config`], [`ConfigError`] - Service configuration
//! - [`SimilarityScorer`], [`AnswerScorer`] - Answer scoring
//! - [`grade`], [`QuizEvaluation`] - Quiz grading over multiple answers
//!
//! ## Embedding
//! - [`SentenceEmbedder`], [`EmbedderConfig`] - Embedding generation
//! - [`ModelSource`] - Local or Hugging Face Hub checkpoints
//! - [`EmbeddingCache`] - In-memory embedding cache
//!
//! ## Surfaces
//! - [`gateway`] - HTTP endpoints
//! - [`stdio`] - Line-oriented loop over stdin/stdout
//!
//! A deterministic stub embedder ([`EmbedderConfig::stub`]) stands in for a real
//! model in tests and local development.

pub mod config;
pub mod constants;
pub mod embedding;
pub mod gateway;
pub mod scoring;
pub mod stdio;

pub use config::{Config, ConfigError};
pub use embedding::{
    EmbedderConfig, EmbeddingCache, EmbeddingError, ModelKind, ModelSource, Pooling,
    SentenceEmbedder,
};
pub use gateway::{HandlerState, create_router_with_state};
pub use scoring::{
    AnswerScorer, AnswerSubmission, GradedAnswer, QuizEvaluation, ScoringError, SimilarityScorer,
    cosine_similarity, grade,
};
pub use stdio::{LoopStats, run_loop};
