//! Token-to-sentence pooling.
//!
//! sentence-transformers checkpoints ship a `1_Pooling/config.json` describing how
//! token states collapse into one vector. Only the two modes used by the supported
//! checkpoints are implemented: CLS (BGE-M3) and attention-masked mean (MiniLM).

use std::path::Path;

use candle_core::{DType, IndexOp, Result, Tensor};
use serde::Deserialize;
use tracing::debug;

use super::encoder::ModelKind;
use super::error::EmbeddingError;

/// Relative path of the pooling config inside a sentence-transformers checkpoint.
pub const POOLING_CONFIG_PATH: &str = "1_Pooling/config.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pooling {
    /// Hidden state of the first token.
    Cls,
    /// Mean over non-padding tokens.
    Mean,
}

#[derive(Debug, Default, Deserialize)]
struct PoolingConfigFile {
    #[serde(default)]
    pooling_mode_cls_token: bool,
    #[serde(default)]
    pooling_mode_mean_tokens: bool,
}

impl Pooling {
    /// Conventional pooling for an architecture when no pooling config is shipped.
    pub fn default_for(kind: ModelKind) -> Self {
        match kind {
            ModelKind::XlmRoberta => Pooling::Cls,
            ModelKind::Bert => Pooling::Mean,
        }
    }

    /// Reads `1_Pooling/config.json` under `model_dir`, if present.
    pub fn from_model_dir(model_dir: &Path) -> std::result::Result<Option<Self>, EmbeddingError> {
        let path = model_dir.join(POOLING_CONFIG_PATH);
        if !path.is_file() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)?;
        Self::from_config_json(&content).map(Some)
    }

    /// Parses the body of a sentence-transformers pooling config.
    pub fn from_config_json(content: &str) -> std::result::Result<Self, EmbeddingError> {
        let file: PoolingConfigFile =
            serde_json::from_str(content).map_err(|e| EmbeddingError::InvalidConfig {
                reason: format!("malformed pooling config: {e}"),
            })?;

        match (file.pooling_mode_cls_token, file.pooling_mode_mean_tokens) {
            (true, false) => Ok(Pooling::Cls),
            (false, true) => Ok(Pooling::Mean),
            (cls, mean) => Err(EmbeddingError::InvalidConfig {
                reason: format!(
                    "unsupported pooling combination (cls={cls}, mean={mean}); exactly one of cls or mean is supported"
                ),
            }),
        }
    }

    /// Collapses `[batch, seq, hidden]` states into `[batch, hidden]`.
    pub fn apply(&self, hidden_states: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
        debug!(pooling = ?self, "Pooling token states");
        match self {
            Pooling::Cls => cls_pooling(hidden_states),
            Pooling::Mean => mean_pooling(hidden_states, attention_mask),
        }
    }
}

pub fn cls_pooling(hidden_states: &Tensor) -> Result<Tensor> {
    hidden_states.i((.., 0, ..))
}

/// Averages token states, ignoring positions where `attention_mask` is zero.
pub fn mean_pooling(hidden_states: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    let mask = attention_mask.to_dtype(DType::F32)?.unsqueeze(2)?;
    let summed = hidden_states.broadcast_mul(&mask)?.sum(1)?;
    let counts = mask.sum(1)?.clamp(1e-9, f64::MAX)?;
    summed.broadcast_div(&counts)
}

/// L2-normalizes each row of a `[batch, hidden]` tensor.
pub fn l2_normalize(embeddings: &Tensor) -> Result<Tensor> {
    let norm = embeddings
        .sqr()?
        .sum_keepdim(1)?
        .sqrt()?
        .clamp(1e-12, f64::MAX)?;
    embeddings.broadcast_div(&norm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::Device;

    fn hidden() -> Tensor {
        // [1, 3, 2]
        Tensor::new(&[[[1.0f32, 2.0], [3.0, 4.0], [100.0, 100.0]]], &Device::Cpu).unwrap()
    }

    #[test]
    fn test_cls_pooling_takes_first_token() {
        let pooled = cls_pooling(&hidden()).unwrap();
        assert_eq!(pooled.to_vec2::<f32>().unwrap(), vec![vec![1.0, 2.0]]);
    }

    #[test]
    fn test_mean_pooling_skips_padding() {
        let mask = Tensor::new(&[[1u32, 1, 0]], &Device::Cpu).unwrap();
        let pooled = mean_pooling(&hidden(), &mask).unwrap();
        assert_eq!(pooled.to_vec2::<f32>().unwrap(), vec![vec![2.0, 3.0]]);
    }

    #[test]
    fn test_mean_pooling_all_masked_is_zero() {
        let mask = Tensor::new(&[[0u32, 0, 0]], &Device::Cpu).unwrap();
        let pooled = mean_pooling(&hidden(), &mask).unwrap();
        assert_eq!(pooled.to_vec2::<f32>().unwrap(), vec![vec![0.0, 0.0]]);
    }

    #[test]
    fn test_l2_normalize_unit_length() {
        let t = Tensor::new(&[[3.0f32, 4.0]], &Device::Cpu).unwrap();
        let n = l2_normalize(&t).unwrap().to_vec2::<f32>().unwrap();
        assert!((n[0][0] - 0.6).abs() < 1e-6);
        assert!((n[0][1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_l2_normalize_zero_row_stays_zero() {
        let t = Tensor::new(&[[0.0f32, 0.0]], &Device::Cpu).unwrap();
        let n = l2_normalize(&t).unwrap().to_vec2::<f32>().unwrap();
        assert_eq!(n, vec![vec![0.0, 0.0]]);
    }

    #[test]
    fn test_pooling_config_parsing() {
        let cls = r#"{"word_embedding_dimension": 1024, "pooling_mode_cls_token": true, "pooling_mode_mean_tokens": false}"#;
        assert_eq!(Pooling::from_config_json(cls).unwrap(), Pooling::Cls);

        let mean = r#"{"pooling_mode_mean_tokens": true}"#;
        assert_eq!(Pooling::from_config_json(mean).unwrap(), Pooling::Mean);

        let both = r#"{"pooling_mode_cls_token": true, "pooling_mode_mean_tokens": true}"#;
        assert!(Pooling::from_config_json(both).is_err());

        assert!(Pooling::from_config_json("not json").is_err());
    }

    #[test]
    fn test_pooling_from_model_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Pooling::from_model_dir(dir.path()).unwrap(), None);

        std::fs::create_dir_all(dir.path().join("1_Pooling")).unwrap();
        std::fs::write(
            dir.path().join(POOLING_CONFIG_PATH),
            r#"{"pooling_mode_cls_token": true}"#,
        )
        .unwrap();
        assert_eq!(
            Pooling::from_model_dir(dir.path()).unwrap(),
            Some(Pooling::Cls)
        );
    }

    #[test]
    fn test_default_pooling_per_architecture() {
        assert_eq!(Pooling::default_for(ModelKind::XlmRoberta), Pooling::Cls);
        assert_eq!(Pooling::default_for(ModelKind::Bert), Pooling::Mean);
    }
}
