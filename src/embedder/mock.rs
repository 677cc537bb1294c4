use anyhow::Result;
use async_trait::async_trait;
use sha2::{Digest, Sha256};

use super::Embedder;

/// Deterministic bag-of-words embedder for tests and offline runs.
///
/// Each token is hashed into a fixed bucket, so texts sharing vocabulary
/// get a positive cosine similarity while unrelated texts score near zero.
/// No network, no randomness: the same text always yields the same vector.
pub struct MockEmbedder {
    dimensions: usize,
}

impl MockEmbedder {
    pub fn new(dimensions: usize) -> Self {
        assert!(dimensions > 0, "dimensions must be greater than zero");
        Self { dimensions }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        for token in text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            vector[token_bucket(token, self.dimensions)] += 1.0;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }

        vector
    }
}

fn token_bucket(token: &str, dimensions: usize) -> usize {
    let digest = Sha256::digest(token.as_bytes());
    let mut acc = [0u8; 8];
    acc.copy_from_slice(&digest[..8]);
    (u64::from_be_bytes(acc) % dimensions as u64) as usize
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_text(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::cosine_similarity;

    #[tokio::test]
    async fn test_embedding_is_deterministic() {
        let embedder = MockEmbedder::new(64);
        let a = embedder.embed("zebra migration corridors").await.unwrap();
        let b = embedder.embed("zebra migration corridors").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[tokio::test]
    async fn test_identical_text_scores_one() {
        let embedder = MockEmbedder::new(64);
        let v = embedder.embed("some shared vocabulary here").await.unwrap();
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_shared_vocabulary_scores_positive() {
        let embedder = MockEmbedder::new(64);
        let a = embedder.embed("zebra stripes").await.unwrap();
        let b = embedder.embed("zebra herds on the plains").await.unwrap();
        assert!(cosine_similarity(&a, &b) > 0.0);
    }

    #[tokio::test]
    async fn test_empty_text_yields_zero_vector() {
        let embedder = MockEmbedder::new(8);
        let v = embedder.embed("").await.unwrap();
        assert!(v.iter().all(|&x| x == 0.0));
    }

    #[tokio::test]
    async fn test_batch_matches_single() {
        let embedder = MockEmbedder::new(16);
        let single = embedder.embed("hello world").await.unwrap();
        let batch = embedder
            .embed_batch(&["hello world".to_string()])
            .await
            .unwrap();
        assert_eq!(batch, vec![single]);
    }
}
