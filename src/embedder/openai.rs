use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::Embedder;

const EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";

/// Embeds through the OpenAI embeddings API
/// (e.g. `text-embedding-3-small`, 1536 dimensions).
pub struct OpenAiEmbedder {
    model: String,
    dimensions: usize,
    client: Client,
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl OpenAiEmbedder {
    pub fn new(api_key: String, model: &str, dimensions: usize) -> Result<Self> {
        let auth = format!("Bearer {}", api_key.trim());
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth).context("invalid OpenAI API key")?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .default_headers(headers)
            .build()
            .context("failed to build OpenAI HTTP client")?;

        Ok(Self {
            model: model.to_string(),
            dimensions,
            client,
        })
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        if results.is_empty() {
            return Err(anyhow!("OpenAI returned no embedding"));
        }
        Ok(results.swap_remove(0))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let body = EmbeddingsRequest {
            model: &self.model,
            input: texts,
        };

        let response = self
            .client
            .post(EMBEDDINGS_URL)
            .json(&body)
            .send()
            .await
            .context("failed to call OpenAI embeddings")?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(anyhow!("OpenAI returned {status}: {text}"));
        }

        let parsed: EmbeddingsResponse = response
            .json()
            .await
            .context("failed to parse OpenAI embeddings response")?;

        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn health_check(&self) -> Result<()> {
        let response = self
            .client
            .get("https://api.openai.com/v1/models")
            .send()
            .await
            .context("cannot reach the OpenAI API")?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "OpenAI health check failed: {} (check OPENAI_API_KEY)",
                response.status()
            ));
        }

        Ok(())
    }
}
