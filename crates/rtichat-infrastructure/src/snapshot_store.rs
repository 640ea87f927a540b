//! File-backed snapshot store implementation.
//!
//! Persists the full session snapshot as a single JSON blob. Both
//! operations honor the [`SnapshotStore`] contract: `save` never propagates
//! failures to the caller, and `load` falls back to the empty sentinel when
//! the stored data is missing or unreadable.

use crate::paths::RtichatPaths;
use anyhow::{Context, Result};
use async_trait::async_trait;
use rtichat_core::cache::{Snapshot, SnapshotStore};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Snapshot store writing a single JSON blob to disk.
///
/// Writes go through a temp file followed by a rename, so a crash mid-write
/// leaves the previous snapshot intact rather than a truncated blob.
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    /// Creates a store writing to the given file path.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Creates a store at the default location (`~/.config/rtichat/snapshot.json`).
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration directory cannot be determined.
    pub fn default_location() -> Result<Self> {
        let path = RtichatPaths::snapshot_file()
            .map_err(|e| anyhow::anyhow!("Failed to resolve snapshot path: {}", e))?;
        Ok(Self::new(path))
    }

    async fn try_save(&self, snapshot: &Snapshot) -> Result<()> {
        let blob = serde_json::to_string_pretty(snapshot).context("Failed to serialize snapshot")?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create snapshot directory: {}", parent.display()))?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, blob.as_bytes())
            .await
            .with_context(|| format!("Failed to write snapshot file: {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path)
            .await
            .with_context(|| format!("Failed to move snapshot into place: {}", self.path.display()))?;

        Ok(())
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    /// Writes the snapshot, logging and swallowing any failure.
    ///
    /// The in-memory state stays the source of truth for the current
    /// runtime; a failed write only costs the next restart its cache.
    async fn save(&self, snapshot: &Snapshot) {
        if let Err(e) = self.try_save(snapshot).await {
            tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to persist session snapshot"
            );
        }
    }

    /// Reads the last snapshot, or the empty sentinel.
    ///
    /// A missing file is the normal first-run case; unparseable content is
    /// treated as cache corruption, logged, and discarded.
    async fn load(&self) -> Snapshot {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) => {
                tracing::debug!(
                    path = %self.path.display(),
                    error = %e,
                    "No session snapshot to restore"
                );
                return Snapshot::default();
            }
        };

        match serde_json::from_str::<Snapshot>(&content) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Discarding corrupt session snapshot"
                );
                Snapshot::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtichat_core::session::{Message, Session};
    use tempfile::TempDir;

    fn sample_snapshot() -> Snapshot {
        let mut session = Session::new_provisional();
        session.push_message(Message::user("What is RTI?", None));
        Snapshot {
            active_id: Some(session.id.clone()),
            sessions: vec![session],
            ..Snapshot::default()
        }
    }

    #[tokio::test]
    async fn save_and_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("snapshot.json"));

        let snapshot = sample_snapshot();
        store.save(&snapshot).await;

        let loaded = store.load().await;
        assert_eq!(loaded, snapshot);
    }

    #[tokio::test]
    async fn missing_file_loads_empty_sentinel() {
        let dir = TempDir::new().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("snapshot.json"));

        let loaded = store.load().await;
        assert!(loaded.is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_loads_empty_sentinel() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snapshot.json");
        tokio::fs::write(&path, b"{ not json ").await.unwrap();

        let store = FileSnapshotStore::new(&path);
        let loaded = store.load().await;
        assert!(loaded.is_empty());
    }

    #[tokio::test]
    async fn save_creates_missing_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("snapshot.json");

        let store = FileSnapshotStore::new(&path);
        store.save(&sample_snapshot()).await;

        assert!(path.exists());
    }

    #[tokio::test]
    async fn save_replaces_previous_snapshot() {
        let dir = TempDir::new().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("snapshot.json"));

        store.save(&sample_snapshot()).await;
        let replacement = Snapshot::default();
        store.save(&replacement).await;

        let loaded = store.load().await;
        assert_eq!(loaded, replacement);
    }
}
