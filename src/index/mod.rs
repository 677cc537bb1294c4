mod flat;
mod types;

pub use flat::FlatIndex;
pub use types::{EmbeddingRecord, IndexStats, RecordMetadata, SearchHit};

use async_trait::async_trait;

use crate::error::IndexError;

/// Durable collection of embedding records with nearest-neighbor search.
///
/// Mutated only by the ingestion engine; loaded read-only for serving. A
/// loaded index answers `search` identically to the one that was saved.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Appends records after validating every vector against the index
    /// dimension. A mismatched record aborts its whole batch; nothing from
    /// the batch is inserted.
    async fn add_records(&self, records: Vec<EmbeddingRecord>) -> Result<(), IndexError>;

    /// Top-`k` records by cosine similarity, descending; ties keep
    /// insertion order. Fewer than `k` records returns all of them.
    async fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>, IndexError>;

    async fn all_records(&self) -> Result<Vec<EmbeddingRecord>, IndexError>;

    /// All-or-nothing save of the current in-memory state.
    async fn persist(&self) -> Result<(), IndexError>;

    /// Replaces in-memory state with the on-disk state. A missing file is
    /// the first-run state, not an error.
    async fn load(&self) -> Result<(), IndexError>;

    /// Drops all in-memory records. Callers persist to make it durable.
    async fn clear(&self) -> Result<(), IndexError>;

    async fn stats(&self) -> Result<IndexStats, IndexError>;

    /// Whether the backend can remove a single document's vectors without
    /// a full-corpus rebuild. Callers needing deletion when this is false
    /// must trigger the rebuild path.
    fn supports_incremental_delete(&self) -> bool;

    /// Whether a persisted index exists on disk.
    fn exists(&self) -> bool;
}

/// Cosine similarity in [-1, 1]. Mismatched lengths, empty input, and
/// zero-magnitude vectors all score 0.0 rather than erroring, so a
/// degenerate record simply never ranks.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|y| y * y).sum::<f32>().sqrt();

    let denom = norm_a * norm_b;
    if denom == 0.0 {
        0.0
    } else {
        dot / denom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn test_cosine_is_scale_invariant() {
        let a = vec![1.0, 2.0, 2.0];
        let scaled = vec![2.5, 5.0, 5.0];
        assert!((cosine_similarity(&a, &scaled) - 1.0).abs() < EPS);
    }

    #[test]
    fn test_cosine_known_angle() {
        // (3,4)·(4,3) = 24, both norms 5, so cos = 24/25.
        let a = vec![3.0, 4.0];
        let b = vec![4.0, 3.0];
        assert!((cosine_similarity(&a, &b) - 0.96).abs() < EPS);
    }

    #[test]
    fn test_cosine_perpendicular_and_opposed() {
        let a = vec![2.0, 2.0];
        assert!(cosine_similarity(&a, &[2.0, -2.0]).abs() < EPS);
        assert!((cosine_similarity(&a, &[-1.0, -1.0]) + 1.0).abs() < EPS);
    }

    #[test]
    fn test_cosine_degenerate_inputs_score_zero() {
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }
}
