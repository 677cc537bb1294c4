mod mock;
mod ollama;
mod openai;

pub use mock::MockEmbedder;
pub use ollama::OllamaEmbedder;
pub use openai::OpenAiEmbedder;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// External embedding-model boundary: text in, fixed-length vector out.
///
/// Failures are fatal to the batch being processed, never globally fatal —
/// callers skip the affected file and continue.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
    fn dimensions(&self) -> usize;
    async fn health_check(&self) -> Result<()>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedderConfig {
    /// `ollama`, `openai`, or `mock`.
    pub provider: String,
    pub model: String,
    pub endpoint: Option<String>,
    pub dimensions: usize,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: "nomic-embed-text".to_string(),
            endpoint: None,
            dimensions: 768,
        }
    }
}

pub fn create_embedder(config: &EmbedderConfig) -> Result<Box<dyn Embedder>> {
    match config.provider.as_str() {
        "ollama" => {
            let endpoint = config
                .endpoint
                .clone()
                .unwrap_or_else(|| "http://localhost:11434".to_string());
            Ok(Box::new(OllamaEmbedder::new(
                &endpoint,
                &config.model,
                config.dimensions,
            )?))
        }
        "openai" => {
            let api_key = std::env::var("OPENAI_API_KEY")
                .context("OPENAI_API_KEY must be set for the openai embedding provider")?;
            Ok(Box::new(OpenAiEmbedder::new(
                api_key,
                &config.model,
                config.dimensions,
            )?))
        }
        "mock" => Ok(Box::new(MockEmbedder::new(config.dimensions))),
        other => bail!("unknown embedding provider: {other}"),
    }
}
