//! # ragmill — incremental knowledge ingestion & retrieval
//!
//! Turns a folder of markdown documents into a versioned, queryable vector
//! index, keeps that index consistent as source files change, and serves
//! the top-k relevant passages for a query.
//!
//! ## Architecture
//!
//! - **[`chunker`]** — markdown-aware splitting into overlapping chunks
//! - **[`fingerprint`]** — per-file content hashes for change detection
//! - **[`embedder`]** — text-to-vector providers (Ollama, OpenAI, mock)
//! - **[`index`]** — durable vector index with cosine nearest-neighbor search
//! - **[`ingest`]** — full builds and incremental add/update/remove passes
//! - **[`retriever`]** — top-k passage retrieval with source attribution
//!
//! Prompt formatting, the language-model call and any serving layer are
//! deliberately out of scope: retrieval hands back `{text, source_path}`
//! passages and stops there.
//!
//! Only one ingestion process may mutate a given index directory at a time;
//! retrieval is read-only and safe to run concurrently against a loaded
//! index.

pub mod chunker;
pub mod cli;
pub mod config;
pub mod embedder;
pub mod error;
pub mod fingerprint;
pub mod index;
pub mod ingest;
pub mod retriever;

pub use chunker::Chunker;
pub use config::Config;
pub use embedder::{create_embedder, Embedder, EmbedderConfig, MockEmbedder};
pub use error::{ConfigError, IndexError, IngestError, RetrieveError};
pub use fingerprint::{Fingerprint, FingerprintStore};
pub use index::{EmbeddingRecord, FlatIndex, IndexStats, SearchHit, VectorIndex};
pub use ingest::{BuildReport, EngineState, IngestionEngine, UpdateStats};
pub use retriever::{Passage, Retrieval, Retriever};
