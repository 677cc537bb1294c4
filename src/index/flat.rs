use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::IndexError;

use super::{cosine_similarity, EmbeddingRecord, IndexStats, SearchHit, VectorIndex};

#[derive(Debug, Serialize, Deserialize)]
struct IndexData {
    dimension: usize,
    /// Insertion order is load-bearing: it breaks score ties and must
    /// round-trip exactly through persist/load.
    records: Vec<EmbeddingRecord>,
}

/// Flat in-memory index with exhaustive cosine search, persisted as a
/// single JSON file written atomically.
///
/// Point deletion is intentionally unsupported, mirroring the contract of
/// ANN backends that can only rebuild: `supports_incremental_delete` is
/// `false` and callers compact through the full-rebuild path.
pub struct FlatIndex {
    path: PathBuf,
    data: RwLock<IndexData>,
}

impl FlatIndex {
    pub fn new(path: PathBuf, dimension: usize) -> Self {
        Self {
            path,
            data: RwLock::new(IndexData {
                dimension,
                records: Vec::new(),
            }),
        }
    }

    fn atomic_write(&self, data: &IndexData) -> Result<(), IndexError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = self.path.with_extension("tmp");
        let json = serde_json::to_vec(data)?;
        fs::write(&temp_path, json)?;
        fs::rename(temp_path, &self.path)?;

        Ok(())
    }
}

#[async_trait]
impl VectorIndex for FlatIndex {
    async fn add_records(&self, records: Vec<EmbeddingRecord>) -> Result<(), IndexError> {
        let mut data = self.data.write().map_err(|_| IndexError::Poisoned)?;

        // Validate the whole batch before inserting anything.
        for record in &records {
            if record.vector.is_empty() {
                return Err(IndexError::EmptyVector {
                    document_id: record.metadata.document_id.clone(),
                });
            }
            if record.vector.len() != data.dimension {
                return Err(IndexError::DimensionMismatch {
                    document_id: record.metadata.document_id.clone(),
                    expected: data.dimension,
                    got: record.vector.len(),
                });
            }
        }

        data.records.extend(records);
        Ok(())
    }

    async fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>, IndexError> {
        let data = self.data.read().map_err(|_| IndexError::Poisoned)?;

        if query.len() != data.dimension {
            return Err(IndexError::QueryDimensionMismatch {
                expected: data.dimension,
                got: query.len(),
            });
        }

        let mut hits: Vec<SearchHit> = data
            .records
            .iter()
            .map(|record| SearchHit::new(record.clone(), cosine_similarity(query, &record.vector)))
            .collect();

        // Stable sort: equal scores keep insertion order.
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(k);

        Ok(hits)
    }

    async fn all_records(&self) -> Result<Vec<EmbeddingRecord>, IndexError> {
        let data = self.data.read().map_err(|_| IndexError::Poisoned)?;
        Ok(data.records.clone())
    }

    async fn persist(&self) -> Result<(), IndexError> {
        let data = self.data.read().map_err(|_| IndexError::Poisoned)?;
        self.atomic_write(&data)
    }

    async fn load(&self) -> Result<(), IndexError> {
        if !self.path.exists() {
            return Ok(());
        }

        let content = fs::read(&self.path)?;
        let loaded: IndexData = serde_json::from_slice(&content)?;

        let mut data = self.data.write().map_err(|_| IndexError::Poisoned)?;
        if loaded.dimension != data.dimension {
            return Err(IndexError::DimensionConflict {
                stored: loaded.dimension,
                configured: data.dimension,
            });
        }
        *data = loaded;

        Ok(())
    }

    async fn clear(&self) -> Result<(), IndexError> {
        let mut data = self.data.write().map_err(|_| IndexError::Poisoned)?;
        data.records.clear();
        Ok(())
    }

    async fn stats(&self) -> Result<IndexStats, IndexError> {
        let data = self.data.read().map_err(|_| IndexError::Poisoned)?;

        let (index_size_bytes, last_updated) = if self.path.exists() {
            let meta = fs::metadata(&self.path)?;
            let modified = meta.modified().ok().map(DateTime::<Utc>::from);
            (meta.len(), modified)
        } else {
            (0, None)
        };

        Ok(IndexStats {
            total_records: data.records.len(),
            dimension: data.dimension,
            index_size_bytes,
            last_updated,
        })
    }

    fn supports_incremental_delete(&self) -> bool {
        false
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::RecordMetadata;

    fn record(id: &str, vector: Vec<f32>) -> EmbeddingRecord {
        EmbeddingRecord {
            vector,
            text: format!("text for {id}"),
            metadata: RecordMetadata {
                source_path: "a.md".to_string(),
                chunk_index: 0,
                total_chunks: 1,
                document_id: id.to_string(),
            },
        }
    }

    fn temp_index(dimension: usize) -> (tempfile::TempDir, FlatIndex) {
        let dir = tempfile::tempdir().unwrap();
        let index = FlatIndex::new(dir.path().join("index.json"), dimension);
        (dir, index)
    }

    #[tokio::test]
    async fn test_search_ranks_by_cosine() {
        let (_dir, index) = temp_index(3);
        index
            .add_records(vec![
                record("far", vec![0.0, 1.0, 0.0]),
                record("near", vec![1.0, 0.1, 0.0]),
                record("exact", vec![1.0, 0.0, 0.0]),
            ])
            .await
            .unwrap();

        let hits = index.search(&[1.0, 0.0, 0.0], 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].record.metadata.document_id, "exact");
        assert_eq!(hits[1].record.metadata.document_id, "near");
    }

    #[tokio::test]
    async fn test_ties_keep_insertion_order() {
        let (_dir, index) = temp_index(2);
        index
            .add_records(vec![
                record("first", vec![1.0, 0.0]),
                record("second", vec![2.0, 0.0]), // same direction, same cosine
            ])
            .await
            .unwrap();

        let hits = index.search(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(hits[0].record.metadata.document_id, "first");
        assert_eq!(hits[1].record.metadata.document_id, "second");
    }

    #[tokio::test]
    async fn test_k_larger_than_corpus_returns_all() {
        let (_dir, index) = temp_index(2);
        index
            .add_records(vec![record("only", vec![1.0, 0.0])])
            .await
            .unwrap();

        let hits = index.search(&[0.0, 1.0], 10).await.unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_aborts_whole_batch() {
        let (_dir, index) = temp_index(3);
        let result = index
            .add_records(vec![
                record("good", vec![1.0, 0.0, 0.0]),
                record("bad", vec![1.0, 0.0]),
            ])
            .await;

        assert!(matches!(
            result,
            Err(IndexError::DimensionMismatch { ref document_id, expected: 3, got: 2 })
                if document_id == "bad"
        ));
        // Nothing from the batch was inserted.
        assert!(index.all_records().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_vector_rejected() {
        let (_dir, index) = temp_index(3);
        let result = index.add_records(vec![record("empty", vec![])]).await;
        assert!(matches!(result, Err(IndexError::EmptyVector { .. })));
    }

    #[tokio::test]
    async fn test_query_dimension_mismatch_is_an_error() {
        let (_dir, index) = temp_index(3);
        let result = index.search(&[1.0, 0.0], 5).await;
        assert!(matches!(
            result,
            Err(IndexError::QueryDimensionMismatch {
                expected: 3,
                got: 2
            })
        ));
    }

    #[tokio::test]
    async fn test_persist_load_round_trips_search() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");

        let index = FlatIndex::new(path.clone(), 2);
        index
            .add_records(vec![
                record("a", vec![1.0, 0.0]),
                record("b", vec![0.6, 0.8]),
                record("c", vec![0.0, 1.0]),
            ])
            .await
            .unwrap();
        index.persist().await.unwrap();

        let reloaded = FlatIndex::new(path, 2);
        reloaded.load().await.unwrap();

        let query = [0.7, 0.3];
        let before = index.search(&query, 3).await.unwrap();
        let after = reloaded.search(&query, 3).await.unwrap();

        assert_eq!(before.len(), after.len());
        for (x, y) in before.iter().zip(after.iter()) {
            assert_eq!(x.record.metadata.document_id, y.record.metadata.document_id);
            assert_eq!(x.score, y.score);
        }
    }

    #[tokio::test]
    async fn test_load_missing_file_is_first_run() {
        let (_dir, index) = temp_index(2);
        index.load().await.unwrap();
        assert!(index.all_records().await.unwrap().is_empty());
        assert!(!index.exists());
    }

    #[tokio::test]
    async fn test_load_rejects_dimension_conflict() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");

        let index = FlatIndex::new(path.clone(), 2);
        index
            .add_records(vec![record("a", vec![1.0, 0.0])])
            .await
            .unwrap();
        index.persist().await.unwrap();

        let mismatched = FlatIndex::new(path, 4);
        assert!(matches!(
            mismatched.load().await,
            Err(IndexError::DimensionConflict {
                stored: 2,
                configured: 4
            })
        ));
    }

    #[tokio::test]
    async fn test_stats_reflect_contents() {
        let (_dir, index) = temp_index(2);
        index
            .add_records(vec![record("a", vec![1.0, 0.0])])
            .await
            .unwrap();
        index.persist().await.unwrap();

        let stats = index.stats().await.unwrap();
        assert_eq!(stats.total_records, 1);
        assert_eq!(stats.dimension, 2);
        assert!(stats.index_size_bytes > 0);
        assert!(stats.last_updated.is_some());
    }
}
