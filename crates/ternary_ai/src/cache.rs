//! Durable embedding cache.
//!
//! Entries are content-addressed: the key is the SHA-256 of `path ‖ content`
//! rendered as hex, and each entry lives in its own `<key>.json` file under
//! the cache root. A stored entry is valid only while the file's mtime is
//! unchanged; stale or corrupt entries are deleted on detection. All cache
//! failures degrade to misses or no-ops, never errors.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, warn};

use ternary_core::TernaryConfig;

/// Serialized form of one cache entry.
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    embedding: Vec<f32>,
    /// Content hash, equal to the file-name stem.
    hash: String,
    /// Source file mtime in ms at the time of embedding.
    mtime: u64,
}

/// Content-addressed on-disk store of embedding vectors.
///
/// The cache tolerates concurrent writers: keys are content hashes, so two
/// writers racing on the same key write identical payloads and last-writer
/// wins. Writes go through a temp file and rename so readers never observe
/// a partial entry.
#[derive(Debug, Clone)]
pub struct EmbeddingCache {
    root: PathBuf,
}

impl EmbeddingCache {
    /// Cache rooted at an explicit directory.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Cache at the standard workspace location:
    /// `<workspace>/.ternary/embeddings-cache`
    pub fn for_workspace(workspace_root: &Path) -> Self {
        Self::new(TernaryConfig::embeddings_cache_dir(workspace_root))
    }

    /// The cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// SHA-256 hex digest of `path ‖ content`.
    pub fn cache_key(path: &str, content: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(path.as_bytes());
        hasher.update(content.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    /// Look up the embedding for `(path, content)` recorded at `mtime_ms`.
    ///
    /// Returns the vector iff a parseable entry exists whose stored mtime
    /// and hash both match; otherwise the entry (if any) is deleted
    /// best-effort and the lookup is a miss.
    pub fn get(&self, path: &str, content: &str, mtime_ms: u64) -> Option<Vec<f32>> {
        let key = Self::cache_key(path, content);
        let entry_path = self.entry_path(&key);

        let raw = std::fs::read_to_string(&entry_path).ok()?;
        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Corrupt cache entry {}: {e}", entry_path.display());
                let _ = std::fs::remove_file(&entry_path);
                return None;
            }
        };

        if entry.mtime != mtime_ms || entry.hash != key {
            debug!("Stale cache entry for {path}, deleting");
            let _ = std::fs::remove_file(&entry_path);
            return None;
        }

        Some(entry.embedding)
    }

    /// Store an embedding. Best-effort: failures are logged and swallowed.
    pub fn set(&self, path: &str, content: &str, mtime_ms: u64, embedding: &[f32]) {
        let key = Self::cache_key(path, content);
        if let Err(e) = self.write_entry(&key, mtime_ms, embedding) {
            warn!("Failed to write cache entry for {path}: {e}");
        }
    }

    fn write_entry(&self, key: &str, mtime_ms: u64, embedding: &[f32]) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.root)?;

        let entry = CacheEntry {
            embedding: embedding.to_vec(),
            hash: key.to_string(),
            mtime: mtime_ms,
        };
        let content = serde_json::to_string(&entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        // Temp-file-then-rename keeps the entry atomic under concurrent
        // writers and cancellation.
        let tmp_path = self.root.join(format!(".{key}.json.tmp"));
        std::fs::write(&tmp_path, content)?;
        std::fs::rename(&tmp_path, self.entry_path(key))?;
        Ok(())
    }

    /// Delete cache files older than `max_age` (by filesystem mtime).
    /// Errors are swallowed; returns the number of entries removed.
    pub fn cleanup(&self, max_age: Duration) -> usize {
        let Ok(entries) = std::fs::read_dir(&self.root) else {
            return 0;
        };
        let now = SystemTime::now();
        let mut removed = 0;

        for entry in entries.flatten() {
            let path = entry.path();
            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            let Ok(modified) = metadata.modified() else {
                continue;
            };
            let expired = now
                .duration_since(modified)
                .map(|age| age > max_age)
                .unwrap_or(false);
            if expired && std::fs::remove_file(&path).is_ok() {
                removed += 1;
            }
        }

        if removed > 0 {
            debug!("Evicted {removed} expired embedding cache entries");
        }
        removed
    }

    /// Number of entries currently on disk.
    pub fn entry_count(&self) -> usize {
        std::fs::read_dir(&self.root)
            .map(|entries| entries.flatten().count())
            .unwrap_or(0)
    }
}
