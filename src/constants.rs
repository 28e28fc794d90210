//! Cross-cutting, shared constants.
//!
//! Defaults mirror the deployment the service replaced: the HTTP surface listened on
//! port 7000 and scored with the Korean BGE-M3 fine-tune.

/// Hugging Face repo used when `QUIZSIM_MODEL` is not set.
pub const DEFAULT_MODEL_ID: &str = "upskyy/bge-m3-korean";

/// Hub revision used when `QUIZSIM_MODEL_REVISION` is not set.
pub const DEFAULT_MODEL_REVISION: &str = "main";

pub const DEFAULT_PORT: u16 = 7000;

/// Upper bound on tokens fed to the encoder (longer inputs are truncated).
pub const DEFAULT_MAX_SEQ_LEN: usize = 512;

/// Number of embeddings kept in the in-memory cache.
pub const DEFAULT_EMBEDDING_CACHE_CAPACITY: u64 = 4096;

/// Dimension of stub embeddings (matches all-MiniLM-L6-v2).
pub const STUB_EMBEDDING_DIM: usize = 384;

/// Guards against division by zero when normalizing vectors.
pub const NORM_EPSILON: f32 = 1e-8;

pub const QUIZSIM_STATUS_HEADER: &str = "X-Quizsim-Status";
pub const QUIZSIM_STATUS_HEALTHY: &str = "healthy";
pub const QUIZSIM_STATUS_READY: &str = "ready";
pub const QUIZSIM_STATUS_INVALID_REQUEST: &str = "invalid_request";
pub const QUIZSIM_STATUS_SCORING_ERROR: &str = "scoring_error";
pub const QUIZSIM_STATUS_INTERNAL_ERROR: &str = "internal_error";

/// Reference answer reported when a question has no correct answers on record.
pub const MISSING_REFERENCE: &str = "N/A";
