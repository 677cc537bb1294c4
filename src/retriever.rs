//! Query-time retrieval: embed a question, return the top-k passages with
//! source attribution. Read-only against a loaded index; safe to call
//! concurrently. A serving process does not observe on-disk index updates
//! until it calls [`Retriever::reload`].

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;

use crate::config::Config;
use crate::embedder::Embedder;
use crate::error::RetrieveError;
use crate::index::{FlatIndex, VectorIndex};

#[derive(Debug, Clone, Serialize)]
pub struct Passage {
    pub text: String,
    pub source_path: String,
    pub score: f32,
}

/// Ranked passages plus deduplicated source attribution. Every retrieved
/// chunk keeps its text; only the `sources` list collapses duplicates,
/// preserving first-seen order.
#[derive(Debug, Clone, Serialize)]
pub struct Retrieval {
    pub passages: Vec<Passage>,
    pub sources: Vec<String>,
}

pub struct Retriever {
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn Embedder>,
}

impl Retriever {
    /// Load the persisted index for serving. A missing index is surfaced
    /// as [`RetrieveError::IndexNotBuilt`], never as empty results.
    pub async fn open(config: &Config, embedder: Arc<dyn Embedder>) -> Result<Self, RetrieveError> {
        let index_file = config.index_file();
        let index = FlatIndex::new(index_file.clone(), embedder.dimensions());
        if !index.exists() {
            return Err(RetrieveError::IndexNotBuilt(index_file));
        }
        index.load().await?;
        Ok(Self {
            index: Arc::new(index),
            embedder,
        })
    }

    /// Wrap an already-loaded index.
    pub fn with_index(index: Arc<dyn VectorIndex>, embedder: Arc<dyn Embedder>) -> Self {
        Self { index, embedder }
    }

    /// Re-read the on-disk index, picking up writes from a concurrent
    /// ingestion process.
    pub async fn reload(&self) -> Result<(), RetrieveError> {
        self.index.load().await?;
        Ok(())
    }

    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Retrieval, RetrieveError> {
        let query_vector = self
            .embedder
            .embed(query)
            .await
            .map_err(RetrieveError::Embedding)?;

        let hits = self.index.search(&query_vector, k).await?;

        let mut passages = Vec::with_capacity(hits.len());
        let mut sources = Vec::new();
        let mut seen = HashSet::new();

        for hit in hits {
            let source_path = hit.record.metadata.source_path;
            if seen.insert(source_path.clone()) {
                sources.push(source_path.clone());
            }
            passages.push(Passage {
                text: hit.record.text,
                source_path,
                score: hit.score,
            });
        }

        Ok(Retrieval { passages, sources })
    }
}
