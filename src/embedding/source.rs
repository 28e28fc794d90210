//! Model location: a local checkpoint directory or a Hugging Face Hub repo.
//!
//! Hub checkpoints are fetched file by file into the hf-hub cache. All files of one
//! revision land in the same snapshot directory, so a resolved source is always a
//! plain directory with the same layout as a local checkpoint.

use std::path::{Path, PathBuf};

use hf_hub::api::tokio::{ApiBuilder, ApiError, ApiRepo};
use hf_hub::{Repo, RepoType};
use tracing::{debug, info};

use super::encoder::{CONFIG_FILE, WEIGHTS_FILE};
use super::error::EmbeddingError;
use super::pooling::POOLING_CONFIG_PATH;
use super::utils::TOKENIZER_FILE;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    Local(PathBuf),
    Hub { repo_id: String, revision: String },
}

impl ModelSource {
    /// Interprets `model` as a local directory when it exists, otherwise as a repo id.
    pub fn parse(model: &str, revision: &str) -> Self {
        let path = Path::new(model);
        if path.exists() {
            ModelSource::Local(path.to_path_buf())
        } else {
            ModelSource::Hub {
                repo_id: model.to_string(),
                revision: revision.to_string(),
            }
        }
    }

    /// Human-readable identifier (repo id or directory).
    pub fn id(&self) -> String {
        match self {
            ModelSource::Local(path) => path.display().to_string(),
            ModelSource::Hub { repo_id, .. } => repo_id.clone(),
        }
    }

    /// Returns a local directory containing the checkpoint, downloading if needed.
    pub async fn resolve(&self, cache_dir: Option<&Path>) -> Result<PathBuf, EmbeddingError> {
        match self {
            ModelSource::Local(path) => {
                if !path.is_dir() {
                    return Err(EmbeddingError::ModelNotFound { path: path.clone() });
                }
                Ok(path.clone())
            }
            ModelSource::Hub { repo_id, revision } => {
                download_checkpoint(repo_id, revision, cache_dir).await
            }
        }
    }
}

async fn download_checkpoint(
    repo_id: &str,
    revision: &str,
    cache_dir: Option<&Path>,
) -> Result<PathBuf, EmbeddingError> {
    let mut builder = ApiBuilder::new().with_progress(false);
    if let Some(dir) = cache_dir {
        std::fs::create_dir_all(dir)?;
        builder = builder.with_cache_dir(dir.to_path_buf());
    }

    let api = builder.build().map_err(|e| EmbeddingError::DownloadFailed {
        repo_id: repo_id.to_string(),
        file: String::new(),
        reason: e.to_string(),
    })?;

    let repo = api.repo(Repo::with_revision(
        repo_id.to_string(),
        RepoType::Model,
        revision.to_string(),
    ));

    info!(repo_id, revision, "Fetching model from Hugging Face Hub");

    let config_path = fetch(&repo, repo_id, CONFIG_FILE).await?;
    fetch(&repo, repo_id, TOKENIZER_FILE).await?;
    fetch(&repo, repo_id, WEIGHTS_FILE).await?;

    // Plain transformers checkpoints have no pooling config.
    debug!(repo_id, file = POOLING_CONFIG_PATH, "Fetching model file");
    match repo.get(POOLING_CONFIG_PATH).await {
        Ok(_) => {}
        Err(e) if is_not_found(&e) => {
            debug!("No pooling config in repo, using architecture default");
        }
        Err(e) => {
            return Err(EmbeddingError::DownloadFailed {
                repo_id: repo_id.to_string(),
                file: POOLING_CONFIG_PATH.to_string(),
                reason: e.to_string(),
            });
        }
    }

    let model_dir = config_path
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| EmbeddingError::ModelNotFound {
            path: config_path.clone(),
        })?;

    info!(repo_id, model_dir = %model_dir.display(), "Model files ready");
    Ok(model_dir)
}

async fn fetch(repo: &ApiRepo, repo_id: &str, file: &str) -> Result<PathBuf, EmbeddingError> {
    debug!(repo_id, file, "Fetching model file");
    repo.get(file)
        .await
        .map_err(|e| EmbeddingError::DownloadFailed {
            repo_id: repo_id.to_string(),
            file: file.to_string(),
            reason: e.to_string(),
        })
}

/// True only when the hub answered 404 for the requested file.
fn is_not_found(err: &ApiError) -> bool {
    match err {
        ApiError::RequestError(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
        _ => false,
    }
}
