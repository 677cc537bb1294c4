//! Per-file content fingerprints backing change detection.
//!
//! One fingerprint per known file, keyed by path, persisted as a single
//! JSON file alongside the vector index. A fingerprint exists exactly when
//! the file's chunks are present in the index (best effort — see the
//! deletion limitation on [`crate::index::VectorIndex`]).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::StoreError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fingerprint {
    pub path: String,
    pub size: u64,
    pub mtime: DateTime<Utc>,
    /// Content hash; changes on any byte change. Equality testing only.
    pub hash: String,
    pub last_processed: DateTime<Utc>,
}

pub struct FingerprintStore {
    path: PathBuf,
}

impl FingerprintStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// A missing store file is the first-run state, not an error.
    pub fn load(&self) -> Result<BTreeMap<String, Fingerprint>, StoreError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let bytes = fs::read(&self.path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Writes the complete mapping via temp file + rename, so a reader can
    /// never observe a half-written store.
    pub fn save(&self, map: &BTreeMap<String, Fingerprint>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, serde_json::to_vec_pretty(map)?)?;
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }

    /// Reads the full file bytes and captures size / mtime / now.
    pub fn compute(path: &Path) -> std::io::Result<Fingerprint> {
        let bytes = fs::read(path)?;
        let meta = fs::metadata(path)?;
        let mtime = meta
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        Ok(Fingerprint {
            path: path.display().to_string(),
            size: meta.len(),
            mtime,
            hash: hash_bytes(&bytes),
            last_processed: Utc::now(),
        })
    }
}

pub fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())[..16].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_store_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FingerprintStore::new(dir.path().join("file_metadata.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.md");
        fs::write(&file, "# Title\nsome content").unwrap();

        let store = FingerprintStore::new(dir.path().join("store").join("file_metadata.json"));
        let mut map = BTreeMap::new();
        let fp = FingerprintStore::compute(&file).unwrap();
        map.insert(fp.path.clone(), fp);

        store.save(&map).unwrap();
        assert_eq!(store.load().unwrap(), map);

        // No temp file left behind.
        assert!(!dir.path().join("store").join("file_metadata.tmp").exists());
    }

    #[test]
    fn test_compute_detects_any_byte_change() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.md");

        fs::write(&file, "original").unwrap();
        let before = FingerprintStore::compute(&file).unwrap();

        fs::write(&file, "originaX").unwrap();
        let after = FingerprintStore::compute(&file).unwrap();

        assert_ne!(before.hash, after.hash);
    }

    #[test]
    fn test_compute_stable_for_unchanged_content() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.md");
        fs::write(&file, "stable content").unwrap();

        let first = FingerprintStore::compute(&file).unwrap();
        let second = FingerprintStore::compute(&file).unwrap();
        assert_eq!(first.hash, second.hash);
        assert_eq!(first.size, second.size);
    }

    #[test]
    fn test_hash_bytes_shape() {
        let h = hash_bytes(b"hello");
        assert_eq!(h.len(), 16);
        assert_eq!(h, hash_bytes(b"hello"));
        assert_ne!(h, hash_bytes(b"world"));
    }
}
