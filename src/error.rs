use std::path::PathBuf;
use thiserror::Error;

/// Fatal configuration problems. These abort a run before any write.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("knowledge directory not found: {0}")]
    MissingKnowledgeDir(PathBuf),

    #[error("chunk_size must be greater than zero")]
    ZeroChunkSize,

    #[error("chunk_overlap ({overlap}) must be smaller than chunk_size ({chunk_size})")]
    InvalidChunking { chunk_size: usize, overlap: usize },

    #[error("embedding dimensions must be greater than zero")]
    ZeroDimensions,

    #[error("failed to read config file {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value {value:?} for environment variable {var}")]
    InvalidEnv { var: String, value: String },
}

/// Vector index failures. Storage variants are fatal to the current
/// operation; dimension variants indicate a configuration mismatch
/// between ingestion and query time.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("embedding dimension mismatch for {document_id}: expected {expected}, got {got}")]
    DimensionMismatch {
        document_id: String,
        expected: usize,
        got: usize,
    },

    #[error("record {document_id} carries an empty vector")]
    EmptyVector { document_id: String },

    #[error("query dimension mismatch: index stores {expected}-d vectors, query is {got}-d")]
    QueryDimensionMismatch { expected: usize, got: usize },

    #[error("index on disk stores {stored}-d vectors but the embedder is configured for {configured}-d")]
    DimensionConflict { stored: usize, configured: usize },

    #[error("index storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("index file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("index lock poisoned")]
    Poisoned,
}

/// Fingerprint store failures. Always fatal to the current operation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("fingerprint store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("fingerprint store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Recoverable per-file failures. Logged and skipped during a batch run;
/// only escalated if no file succeeds at all.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("embedding failed for {path}: {source}")]
    Embed {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

/// Ingestion failures. `File` is the one recoverable variant; everything
/// else aborts the run.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    File(#[from] FileError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Fingerprints(#[from] StoreError),

    #[error("no documents could be processed; index left untouched")]
    NoDocumentsProcessed,
}

/// Retrieval failures, surfaced to the caller rather than masked as empty
/// results.
#[derive(Debug, Error)]
pub enum RetrieveError {
    #[error("no index found at {0}; run a full build first")]
    IndexNotBuilt(PathBuf),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error("query embedding failed: {0}")]
    Embedding(#[source] anyhow::Error),
}
