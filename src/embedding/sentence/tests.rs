use super::*;
use std::path::PathBuf;

fn stub_embedder() -> SentenceEmbedder {
    SentenceEmbedder::load(EmbedderConfig::stub()).expect("stub embedder should load")
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[test]
fn test_config_default() {
    let config = EmbedderConfig::default();
    assert_eq!(config.max_seq_len, SENTENCE_MAX_SEQ_LEN);
    assert!(config.pooling.is_none());
    assert!(!config.testing_stub);
}

#[test]
fn test_config_builders() {
    let config = EmbedderConfig::new("/models/minilm")
        .with_max_seq_len(128)
        .with_pooling(Pooling::Mean);

    assert_eq!(config.model_dir, PathBuf::from("/models/minilm"));
    assert_eq!(config.max_seq_len, 128);
    assert_eq!(config.pooling, Some(Pooling::Mean));
}

#[test]
fn test_config_validate_requires_model_dir() {
    let err = EmbedderConfig::default().validate().unwrap_err();
    assert!(matches!(err, EmbeddingError::InvalidConfig { .. }));

    let err = EmbedderConfig::new("/nonexistent/quizsim/model")
        .validate()
        .unwrap_err();
    assert!(matches!(err, EmbeddingError::ModelNotFound { .. }));
}

#[test]
fn test_config_validate_zero_seq_len() {
    let err = EmbedderConfig::stub()
        .with_max_seq_len(0)
        .validate()
        .unwrap_err();
    assert!(matches!(err, EmbeddingError::InvalidConfig { .. }));
}

#[test]
fn test_load_empty_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let err = SentenceEmbedder::load(EmbedderConfig::new(dir.path())).unwrap_err();
    assert!(matches!(err, EmbeddingError::ModelNotFound { .. }));
}

#[test]
fn test_stub_properties() {
    let embedder = stub_embedder();
    assert!(embedder.is_stub());
    assert_eq!(embedder.embedding_dim(), STUB_EMBEDDING_DIM);
    assert_eq!(embedder.device_name(), "stub");
    assert!(embedder.pooling().is_none());
}

#[test]
fn test_stub_is_deterministic() {
    let embedder = stub_embedder();
    let a = embedder.embed("The mitochondria is the powerhouse of the cell").unwrap();
    let b = embedder.embed("The mitochondria is the powerhouse of the cell").unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_stub_is_unit_length() {
    let embedder = stub_embedder();
    let v = embedder.embed("광합성은 빛 에너지를 화학 에너지로 바꾸는 과정이다").unwrap();
    assert_eq!(v.len(), STUB_EMBEDDING_DIM);
    assert!((dot(&v, &v) - 1.0).abs() < 1e-4);
}

#[test]
fn test_stub_distinguishes_texts() {
    let embedder = stub_embedder();
    let a = embedder.embed("photosynthesis").unwrap();
    let b = embedder.embed("respiration").unwrap();
    assert_ne!(a, b);
    assert!(dot(&a, &b) < 0.5);
}

#[test]
fn test_empty_text_is_zero_vector() {
    let embedder = stub_embedder();
    let v = embedder.embed("").unwrap();
    assert_eq!(v.len(), STUB_EMBEDDING_DIM);
    assert!(v.iter().all(|x| *x == 0.0));
}

#[test]
fn test_whitespace_text_is_embedded() {
    let embedder = stub_embedder();
    for text in ["   ", "\n\t"] {
        let v = embedder.embed(text).unwrap();
        assert_eq!(v.len(), STUB_EMBEDDING_DIM);
        assert!((dot(&v, &v) - 1.0).abs() < 1e-4, "{text:?} should be a unit vector");
    }
    assert_ne!(embedder.embed("   ").unwrap(), embedder.embed("\n\t").unwrap());
}

#[test]
fn test_embed_batch_matches_single() {
    let embedder = stub_embedder();
    let batch = embedder.embed_batch(&["one", "two"]).unwrap();
    assert_eq!(batch.len(), 2);
    assert_eq!(batch[0], embedder.embed("one").unwrap());
    assert_eq!(batch[1], embedder.embed("two").unwrap());
    assert!(embedder.embed_batch(&[]).unwrap().is_empty());
}
