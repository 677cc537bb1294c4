use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a stored chunk came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMetadata {
    /// Source file path, verbatim as scanned.
    pub source_path: String,
    /// Ordinal position of the chunk within its document.
    pub chunk_index: usize,
    /// Total chunks the document produced in the same pass.
    pub total_chunks: usize,
    /// `<file_name>::<chunk_index>`; unique among live records of a
    /// freshly built index.
    pub document_id: String,
}

/// The unit stored in the vector index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    pub vector: Vec<f32>,
    pub text: String,
    pub metadata: RecordMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub record: EmbeddingRecord,
    pub score: f32,
}

impl SearchHit {
    pub fn new(record: EmbeddingRecord, score: f32) -> Self {
        Self { record, score }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexStats {
    pub total_records: usize,
    pub dimension: usize,
    pub index_size_bytes: u64,
    pub last_updated: Option<DateTime<Utc>>,
}
