use std::path::Path;

use tokenizers::{Tokenizer, TruncationParams};

use super::error::EmbeddingError;

pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// Loads `tokenizer.json` from a checkpoint directory.
///
/// Inputs longer than `max_len` tokens are truncated and padding is disabled:
/// texts are encoded one at a time, so every position is a real token.
pub fn load_tokenizer(model_dir: &Path, max_len: usize) -> Result<Tokenizer, EmbeddingError> {
    let path = model_dir.join(TOKENIZER_FILE);
    if !path.is_file() {
        return Err(EmbeddingError::ModelNotFound { path });
    }

    let mut tokenizer =
        Tokenizer::from_file(&path).map_err(|e| EmbeddingError::TokenizationFailed {
            reason: format!("failed to load {}: {e}", path.display()),
        })?;

    let truncation = TruncationParams {
        max_length: max_len,
        ..Default::default()
    };

    tokenizer
        .with_truncation(Some(truncation))
        .map_err(|e| EmbeddingError::TokenizationFailed {
            reason: format!("failed to configure truncation: {e}"),
        })?;
    tokenizer.with_padding(None);

    Ok(tokenizer)
}
