//! Ingestion engine: full-corpus builds and incremental updates.
//!
//! One engine type covers both modes. A full build regenerates the index
//! and fingerprint map from scratch; an incremental pass diffs the
//! knowledge directory against stored fingerprints and applies
//! add/update/remove operations file by file, each committing its own
//! index save + fingerprint save pair. Per-file failures are logged and
//! skipped; configuration and storage failures abort the run.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::chunker::Chunker;
use crate::config::Config;
use crate::embedder::Embedder;
use crate::error::{ConfigError, FileError, IngestError};
use crate::fingerprint::FingerprintStore;
use crate::index::{EmbeddingRecord, IndexStats, RecordMetadata, VectorIndex};

const EMBED_BATCH_SIZE: usize = 32;
const KNOWLEDGE_EXTENSIONS: &[&str] = &["md", "markdown", "txt"];

pub struct IngestionEngine {
    config: Config,
    chunker: Chunker,
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    fingerprints: FingerprintStore,
}

/// Outcome of a full-corpus build.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub files_processed: usize,
    pub chunks_indexed: usize,
    pub files_failed: usize,
    pub errors: Vec<String>,
}

/// Per-run counts from an incremental pass.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct UpdateStats {
    pub added: usize,
    pub updated: usize,
    pub removed: usize,
    pub unchanged: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No index on disk yet.
    Empty,
    /// A persisted index exists and can serve queries.
    Ready,
}

#[derive(Debug)]
pub struct EngineStatus {
    pub state: EngineState,
    pub index: IndexStats,
    pub tracked_files: usize,
}

impl IngestionEngine {
    pub fn new(config: Config, embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>) -> Self {
        let chunker = Chunker::new(config.chunk_size, config.chunk_overlap);
        let fingerprints = FingerprintStore::new(config.fingerprint_file());
        Self {
            config,
            chunker,
            embedder,
            index,
            fingerprints,
        }
    }

    /// Enumerates knowledge files, sorted for deterministic processing.
    /// A missing knowledge directory is fatal before any write.
    pub fn knowledge_files(&self) -> Result<Vec<PathBuf>, IngestError> {
        let dir = &self.config.knowledge_dir;
        if !dir.is_dir() {
            return Err(ConfigError::MissingKnowledgeDir(dir.clone()).into());
        }

        let mut files: Vec<PathBuf> = WalkDir::new(dir)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| KNOWLEDGE_EXTENSIONS.contains(&ext))
                    .unwrap_or(false)
            })
            .collect();
        files.sort();
        Ok(files)
    }

    /// Rebuild everything: chunk and embed every document, write a fresh
    /// index and a fresh fingerprint map. Fails with nothing written when
    /// zero documents could be processed.
    pub async fn full_build(&self) -> Result<BuildReport, IngestError> {
        let files = self.knowledge_files()?;
        debug!(files = files.len(), "starting full build");

        let mut report = BuildReport::default();
        let mut all_records = Vec::new();
        let mut fresh = BTreeMap::new();

        for path in &files {
            let outcome = async {
                let fingerprint =
                    FingerprintStore::compute(path).map_err(|source| FileError::Read {
                        path: path.clone(),
                        source,
                    })?;
                let records = self.records_for_file(path).await?;
                Ok::<_, FileError>((fingerprint, records))
            }
            .await;

            match outcome {
                Ok((fingerprint, records)) => {
                    report.files_processed += 1;
                    report.chunks_indexed += records.len();
                    all_records.extend(records);
                    fresh.insert(fingerprint.path.clone(), fingerprint);
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping file");
                    report.files_failed += 1;
                    report.errors.push(format!("{}: {err}", path.display()));
                }
            }
        }

        if report.files_processed == 0 {
            return Err(IngestError::NoDocumentsProcessed);
        }

        self.index.clear().await?;
        self.index.add_records(all_records).await?;
        self.index.persist().await?;
        self.fingerprints.save(&fresh)?;

        debug!(
            files = report.files_processed,
            chunks = report.chunks_indexed,
            "full build complete"
        );
        Ok(report)
    }

    /// Diff the knowledge directory against stored fingerprints and apply
    /// the minimal set of add/update/remove operations.
    pub async fn incremental_update(&self) -> Result<UpdateStats, IngestError> {
        let files = self.knowledge_files()?;
        let stored = self.fingerprints.load()?;
        debug!(
            current = files.len(),
            tracked = stored.len(),
            "starting incremental update"
        );

        let mut stats = UpdateStats::default();

        for path in &files {
            let key = path.display().to_string();
            match stored.get(&key) {
                None => match self.add_knowledge_file(path).await {
                    Ok(_) => stats.added += 1,
                    Err(IngestError::File(err)) => {
                        warn!(path = %key, error = %err, "skipping file");
                        stats.errors.push(format!("{key}: {err}"));
                    }
                    Err(err) => return Err(err),
                },
                Some(known) => {
                    let current = match FingerprintStore::compute(path) {
                        Ok(fp) => fp,
                        Err(err) => {
                            warn!(path = %key, error = %err, "skipping file");
                            stats.errors.push(format!("{key}: {err}"));
                            continue;
                        }
                    };
                    if current.hash == known.hash {
                        stats.unchanged += 1;
                    } else {
                        match self.update_knowledge_file(path).await {
                            Ok(_) => stats.updated += 1,
                            Err(IngestError::File(err)) => {
                                warn!(path = %key, error = %err, "skipping file");
                                stats.errors.push(format!("{key}: {err}"));
                            }
                            Err(err) => return Err(err),
                        }
                    }
                }
            }
        }

        // Files that disappeared since the last run.
        let current_set: HashSet<String> =
            files.iter().map(|p| p.display().to_string()).collect();
        for gone in stored.keys().filter(|key| !current_set.contains(*key)) {
            self.remove_knowledge_file(Path::new(gone)).await?;
            stats.removed += 1;
        }

        debug!(
            added = stats.added,
            updated = stats.updated,
            removed = stats.removed,
            unchanged = stats.unchanged,
            "incremental update complete"
        );
        Ok(stats)
    }

    /// Add one file: chunk, embed, load-modify-save the index, then upsert
    /// the fingerprint. The index save always lands before the fingerprint
    /// save, so a crash leaves at most this file's work uncommitted and
    /// never a fingerprint without its records.
    pub async fn add_knowledge_file(&self, path: &Path) -> Result<usize, IngestError> {
        let fingerprint = FingerprintStore::compute(path).map_err(|source| FileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let records = self.records_for_file(path).await?;
        let count = records.len();

        if count > 0 {
            self.index.load().await?;
            self.index.add_records(records).await?;
            self.index.persist().await?;
        } else {
            debug!(path = %path.display(), "file produced no chunks");
        }

        let mut map = self.fingerprints.load()?;
        map.insert(fingerprint.path.clone(), fingerprint);
        self.fingerprints.save(&map)?;

        debug!(path = %path.display(), chunks = count, "file added");
        Ok(count)
    }

    /// Update one file: logically remove-then-add. The remove half is
    /// metadata-only (see `remove_knowledge_file`), so stale vectors for
    /// the previous content remain retrievable until a full rebuild. The
    /// add's fingerprint upsert replaces the old entry, so nothing is
    /// deleted up front; a failed add leaves the previous fingerprint in
    /// place and the file is still classified as changed on the next run.
    pub async fn update_knowledge_file(&self, path: &Path) -> Result<usize, IngestError> {
        if !self.index.supports_incremental_delete() {
            debug!(
                path = %path.display(),
                "index cannot delete vectors in place; stale records remain until the next full rebuild"
            );
        }
        self.add_knowledge_file(path).await
    }

    /// Remove one file's fingerprint entry. The index keeps its vectors:
    /// the backend cannot delete points in place, so compaction happens
    /// through the full-rebuild path.
    pub async fn remove_knowledge_file(&self, path: &Path) -> Result<(), IngestError> {
        if !self.index.supports_incremental_delete() {
            debug!(
                path = %path.display(),
                "index cannot delete vectors in place; stale records remain until the next full rebuild"
            );
        }

        let key = path.display().to_string();
        let mut map = self.fingerprints.load()?;
        if map.remove(&key).is_some() {
            self.fingerprints.save(&map)?;
            debug!(path = %key, "fingerprint removed");
        }
        Ok(())
    }

    pub async fn status(&self) -> Result<EngineStatus, IngestError> {
        let state = if self.index.exists() {
            self.index.load().await?;
            EngineState::Ready
        } else {
            EngineState::Empty
        };

        Ok(EngineStatus {
            state,
            index: self.index.stats().await?,
            tracked_files: self.fingerprints.load()?.len(),
        })
    }

    /// Read, chunk and embed one document, yielding index-ready records.
    async fn records_for_file(&self, path: &Path) -> Result<Vec<EmbeddingRecord>, FileError> {
        let content = fs::read_to_string(path).map_err(|source| FileError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let chunks = self.chunker.split(&content);
        let total_chunks = chunks.len();
        let source_path = path.display().to_string();
        let relative = path
            .strip_prefix(&self.config.knowledge_dir)
            .unwrap_or(path);

        let mut records = Vec::with_capacity(total_chunks);
        let mut chunk_index = 0;

        for batch in chunks.chunks(EMBED_BATCH_SIZE) {
            let vectors =
                self.embedder
                    .embed_batch(batch)
                    .await
                    .map_err(|source| FileError::Embed {
                        path: path.to_path_buf(),
                        source,
                    })?;

            for (text, vector) in batch.iter().zip(vectors.into_iter()) {
                records.push(EmbeddingRecord {
                    vector,
                    text: text.clone(),
                    metadata: RecordMetadata {
                        source_path: source_path.clone(),
                        chunk_index,
                        total_chunks,
                        document_id: document_id(relative, chunk_index),
                    },
                });
                chunk_index += 1;
            }
        }

        Ok(records)
    }
}

/// Deterministic record identity: `<relative_path>::<chunk_index>`.
///
/// The path is taken relative to the knowledge directory, so same-named
/// files in different subdirectories get distinct ids.
pub fn document_id(relative_path: &Path, chunk_index: usize) -> String {
    format!("{}::{chunk_index}", relative_path.display())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id_format() {
        assert_eq!(document_id(Path::new("faq.md"), 3), "faq.md::3");
    }

    #[test]
    fn test_document_id_keeps_subdirectories_distinct() {
        let docs = document_id(Path::new("docs/faq.md"), 0);
        let notes = document_id(Path::new("notes/faq.md"), 0);
        assert_eq!(docs, "docs/faq.md::0");
        assert_ne!(docs, notes);
    }
}
