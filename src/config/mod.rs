//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `QUIZSIM_*` environment variables.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;

use crate::constants::{
    DEFAULT_EMBEDDING_CACHE_CAPACITY, DEFAULT_MAX_SEQ_LEN, DEFAULT_MODEL_ID,
    DEFAULT_MODEL_REVISION, DEFAULT_PORT,
};

/// Service configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `QUIZSIM_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `7000`.
    pub port: u16,

    /// IP address to bind to. Default: `0.0.0.0`.
    pub bind_addr: IpAddr,

    /// Hugging Face repo id or local model directory. Default: `upskyy/bge-m3-korean`.
    pub model: String,

    /// Hub revision (branch, tag or commit). Ignored for local directories.
    pub revision: String,

    /// Download cache for hub models. `None` uses the hf-hub default.
    pub cache_dir: Option<PathBuf>,

    /// Max tokens per input. Default: `512`.
    pub max_seq_len: usize,

    /// Entries in the embedding cache; `0` disables caching.
    pub embedding_cache_capacity: u64,

    /// Use the deterministic stub embedder instead of a real model.
    pub stub: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED),
            model: DEFAULT_MODEL_ID.to_string(),
            revision: DEFAULT_MODEL_REVISION.to_string(),
            cache_dir: None,
            max_seq_len: DEFAULT_MAX_SEQ_LEN,
            embedding_cache_capacity: DEFAULT_EMBEDDING_CACHE_CAPACITY,
            stub: false,
        }
    }
}

impl Config {
    pub const ENV_PORT: &'static str = "QUIZSIM_PORT";
    pub const ENV_BIND_ADDR: &'static str = "QUIZSIM_BIND_ADDR";
    pub const ENV_MODEL: &'static str = "QUIZSIM_MODEL";
    pub const ENV_MODEL_REVISION: &'static str = "QUIZSIM_MODEL_REVISION";
    pub const ENV_CACHE_DIR: &'static str = "QUIZSIM_CACHE_DIR";
    pub const ENV_MAX_SEQ_LEN: &'static str = "QUIZSIM_MAX_SEQ_LEN";
    pub const ENV_EMBEDDING_CACHE: &'static str = "QUIZSIM_EMBEDDING_CACHE";
    pub const ENV_STUB: &'static str = "QUIZSIM_STUB";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let model = Self::parse_string_from_env(Self::ENV_MODEL, defaults.model);
        let revision = Self::parse_string_from_env(Self::ENV_MODEL_REVISION, defaults.revision);
        let cache_dir = Self::parse_optional_path_from_env(Self::ENV_CACHE_DIR);
        let max_seq_len =
            Self::parse_number_from_env(Self::ENV_MAX_SEQ_LEN, defaults.max_seq_len)?;
        let embedding_cache_capacity = Self::parse_number_from_env(
            Self::ENV_EMBEDDING_CACHE,
            defaults.embedding_cache_capacity,
        )?;
        let stub = Self::parse_bool_from_env(Self::ENV_STUB, defaults.stub)?;

        Ok(Self {
            port,
            bind_addr,
            model,
            revision,
            cache_dir,
            max_seq_len,
            embedding_cache_capacity,
            stub,
        })
    }

    /// Validates basic invariants (does not touch the network or create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort {
                value: self.port.to_string(),
            });
        }

        if self.max_seq_len == 0 {
            return Err(ConfigError::ZeroMaxSeqLen);
        }

        if self.stub {
            return Ok(());
        }

        if self.model.trim().is_empty() {
            return Err(ConfigError::EmptyModel);
        }

        let model_path = PathBuf::from(&self.model);
        if model_path.exists() && !model_path.is_dir() {
            return Err(ConfigError::NotADirectory { path: model_path });
        }

        if let Some(ref dir) = self.cache_dir
            && dir.exists()
            && !dir.is_dir()
        {
            return Err(ConfigError::NotADirectory { path: dir.clone() });
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        match self.bind_addr {
            IpAddr::V4(addr) => format!("{}:{}", addr, self.port),
            IpAddr::V6(addr) => format!("[{}]:{}", addr, self.port),
        }
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.trim().parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(default)
    }

    fn parse_number_from_env<T>(name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr<Err = std::num::ParseIntError>,
    {
        match env::var(name) {
            Ok(value) if !value.trim().is_empty() => {
                value
                    .trim()
                    .parse()
                    .map_err(|source| ConfigError::InvalidNumber {
                        name,
                        value,
                        source,
                    })
            }
            _ => Ok(default),
        }
    }

    fn parse_bool_from_env(name: &'static str, default: bool) -> Result<bool, ConfigError> {
        let Ok(value) = env::var(name) else {
            return Ok(default);
        };

        match value.trim().to_ascii_lowercase().as_str() {
            "" => Ok(default),
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidBool { name, value }),
        }
    }
}
