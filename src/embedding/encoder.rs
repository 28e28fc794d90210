//! Transformer backbones for sentence embedding.
//!
//! The backbone is picked from `config.json`'s `model_type`. Checkpoints exported
//! from task heads keep the encoder under a `bert.` / `roberta.` prefix; both
//! layouts load.

use std::path::Path;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{self, BertModel};
use candle_transformers::models::xlm_roberta::{self, XLMRobertaModel};
use serde::Deserialize;
use tracing::info;

use super::error::EmbeddingError;

pub const CONFIG_FILE: &str = "config.json";
pub const WEIGHTS_FILE: &str = "model.safetensors";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    Bert,
    XlmRoberta,
}

impl ModelKind {
    pub fn from_model_type(model_type: &str) -> Result<Self, EmbeddingError> {
        match model_type {
            "bert" => Ok(ModelKind::Bert),
            "xlm-roberta" | "xlm_roberta" => Ok(ModelKind::XlmRoberta),
            other => Err(EmbeddingError::UnsupportedModel {
                model_type: other.to_string(),
            }),
        }
    }
}

#[derive(Deserialize)]
struct ModelTypeProbe {
    #[serde(default)]
    model_type: Option<String>,
}

/// Reads `model_type` from a raw `config.json`. A missing field is treated as BERT.
pub fn detect_model_kind(config_json: &str) -> Result<ModelKind, EmbeddingError> {
    let probe: ModelTypeProbe =
        serde_json::from_str(config_json).map_err(|e| EmbeddingError::InvalidConfig {
            reason: format!("malformed {CONFIG_FILE}: {e}"),
        })?;

    match probe.model_type.as_deref() {
        Some(model_type) => ModelKind::from_model_type(model_type),
        None => Ok(ModelKind::Bert),
    }
}

pub enum Encoder {
    Bert(BertModel),
    XlmRoberta(XLMRobertaModel),
}

impl Encoder {
    /// Loads `config.json` + `model.safetensors` from `model_dir`.
    ///
    /// Returns the encoder, its architecture and its hidden size.
    pub fn load(
        model_dir: &Path,
        device: &Device,
    ) -> Result<(Self, ModelKind, usize), EmbeddingError> {
        let config_path = model_dir.join(CONFIG_FILE);
        let weights_path = model_dir.join(WEIGHTS_FILE);

        for path in [&config_path, &weights_path] {
            if !path.is_file() {
                return Err(EmbeddingError::ModelNotFound { path: path.clone() });
            }
        }

        let config_json = std::fs::read_to_string(&config_path)?;
        let kind = detect_model_kind(&config_json)?;

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, device).map_err(
                |e| EmbeddingError::ModelLoadFailed {
                    reason: format!("failed to map weights: {e}"),
                },
            )?
        };

        let (encoder, hidden_size) = match kind {
            ModelKind::Bert => {
                let config: bert::Config = parse_config(&config_json)?;
                let vb = if vb.contains_tensor("bert.embeddings.word_embeddings.weight") {
                    vb.pp("bert")
                } else {
                    vb
                };
                let model = BertModel::load(vb, &config).map_err(load_failed)?;
                (Encoder::Bert(model), config.hidden_size)
            }
            ModelKind::XlmRoberta => {
                let config: xlm_roberta::Config = parse_config(&config_json)?;
                let vb = if vb.contains_tensor("roberta.embeddings.word_embeddings.weight") {
                    vb.pp("roberta")
                } else {
                    vb
                };
                let model = XLMRobertaModel::new(&config, vb).map_err(load_failed)?;
                (Encoder::XlmRoberta(model), config.hidden_size)
            }
        };

        info!(
            model_dir = %model_dir.display(),
            kind = ?kind,
            hidden_size,
            "Encoder weights loaded"
        );

        Ok((encoder, kind, hidden_size))
    }

    /// Runs the encoder and returns `[batch, seq, hidden]` token states.
    pub fn forward(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: &Tensor,
    ) -> candle_core::Result<Tensor> {
        match self {
            Encoder::Bert(model) => model.forward(input_ids, token_type_ids, Some(attention_mask)),
            Encoder::XlmRoberta(model) => {
                model.forward(input_ids, attention_mask, token_type_ids, None, None, None)
            }
        }
    }
}

fn parse_config<T: serde::de::DeserializeOwned>(config_json: &str) -> Result<T, EmbeddingError> {
    serde_json::from_str(config_json).map_err(|e| EmbeddingError::InvalidConfig {
        reason: format!("failed to parse {CONFIG_FILE}: {e}"),
    })
}

fn load_failed(e: candle_core::Error) -> EmbeddingError {
    EmbeddingError::ModelLoadFailed {
        reason: e.to_string(),
    }
}
