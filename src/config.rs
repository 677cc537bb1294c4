use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::embedder::EmbedderConfig;
use crate::error::ConfigError;

pub const DEFAULT_CONFIG_FILE: &str = "ragmill.toml";

/// All tunables, constructed once at startup and threaded through the
/// constructors of the chunker, ingestion engine and retriever.
///
/// Values come from an optional TOML file, with environment variables
/// taking precedence over both the file and the defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the source documents (markdown / plain text).
    pub knowledge_dir: PathBuf,
    /// Directory holding the persisted index and fingerprint map.
    pub index_dir: PathBuf,
    /// Maximum chunk length, in characters.
    pub chunk_size: usize,
    /// Trailing context shared between consecutive chunks, in characters.
    pub chunk_overlap: usize,
    /// Default number of passages returned per query.
    pub retrieval_k: usize,
    pub embedder: EmbedderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            knowledge_dir: PathBuf::from("knowledge"),
            index_dir: PathBuf::from("vector_store"),
            chunk_size: 800,
            chunk_overlap: 100,
            retrieval_k: 6,
            embedder: EmbedderConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration. An explicitly given file must exist; otherwise
    /// `ragmill.toml` in the working directory is used when present, falling
    /// back to defaults. Environment overrides apply last.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(default)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Invalid {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(v) = env::var("KNOWLEDGE_PATH") {
            self.knowledge_dir = PathBuf::from(v);
        }
        if let Ok(v) = env::var("VECTOR_STORE_PATH") {
            self.index_dir = PathBuf::from(v);
        }
        self.chunk_size = env_usize("CHUNK_SIZE", self.chunk_size)?;
        self.chunk_overlap = env_usize("CHUNK_OVERLAP", self.chunk_overlap)?;
        self.retrieval_k = env_usize("RETRIEVAL_K", self.retrieval_k)?;
        if let Ok(v) = env::var("EMBEDDING_PROVIDER") {
            self.embedder.provider = v;
        }
        if let Ok(v) = env::var("EMBEDDING_MODEL") {
            self.embedder.model = v;
        }
        if let Ok(v) = env::var("EMBEDDING_ENDPOINT") {
            self.embedder.endpoint = Some(v);
        }
        self.embedder.dimensions = env_usize("EMBEDDING_DIMENSIONS", self.embedder.dimensions)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(ConfigError::InvalidChunking {
                chunk_size: self.chunk_size,
                overlap: self.chunk_overlap,
            });
        }
        if self.embedder.dimensions == 0 {
            return Err(ConfigError::ZeroDimensions);
        }
        Ok(())
    }

    /// Serialized vector index location.
    pub fn index_file(&self) -> PathBuf {
        self.index_dir.join("index.json")
    }

    /// Per-file fingerprint map location, kept alongside the index.
    pub fn fingerprint_file(&self) -> PathBuf {
        self.index_dir.join("file_metadata.json")
    }
}

fn env_usize(var: &str, fallback: usize) -> Result<usize, ConfigError> {
    match env::var(var) {
        Ok(value) => value.parse().map_err(|_| ConfigError::InvalidEnv {
            var: var.to_string(),
            value,
        }),
        Err(_) => Ok(fallback),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.chunk_size, 800);
        assert_eq!(config.chunk_overlap, 100);
        assert_eq!(config.retrieval_k, 6);
        assert_eq!(config.index_file(), PathBuf::from("vector_store/index.json"));
        assert_eq!(
            config.fingerprint_file(),
            PathBuf::from("vector_store/file_metadata.json")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overlap_must_be_smaller_than_chunk_size() {
        let config = Config {
            chunk_size: 100,
            chunk_overlap: 100,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidChunking { .. })
        ));
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let config = Config {
            chunk_size: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroChunkSize)));
    }

    #[test]
    fn test_from_file_partial_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ragmill.toml");
        std::fs::write(
            &path,
            "chunk_size = 512\n\n[embedder]\nprovider = \"mock\"\ndimensions = 64\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.chunk_size, 512);
        assert_eq!(config.chunk_overlap, 100); // default survives
        assert_eq!(config.embedder.provider, "mock");
        assert_eq!(config.embedder.dimensions, 64);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = Config::from_file(Path::new("/nonexistent/ragmill.toml"));
        assert!(matches!(result, Err(ConfigError::Unreadable { .. })));
    }
}
