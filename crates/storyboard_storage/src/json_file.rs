//! JSON file snapshot backend.

use crate::HistoryBackend;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use storyboard_core::GenerationResult;
use storyboard_error::{StorageError, StorageErrorKind, StoryboardResult};

/// Stores the history snapshot as one pretty-printed JSON array.
///
/// Writes go to a sibling temp file that is renamed over the snapshot, so a
/// crash mid-write leaves the previous snapshot intact. Image payloads are
/// embedded as `data:` URIs.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use storyboard_storage::{JsonFileBackend, ResultStore};
///
/// # async fn run() {
/// let backend = JsonFileBackend::new("/var/lib/storyboard/history.json");
/// let store = ResultStore::open(Arc::new(backend)).await;
/// println!("{} results in history", store.len().await);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    /// Backend writing to `path`. Parent directories are created on first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Snapshot file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parse(&self, content: &str) -> Vec<GenerationResult> {
        let results: Vec<GenerationResult> = match serde_json::from_str(content) {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "History snapshot is unreadable, starting with empty history"
                );
                return Vec::new();
            }
        };

        let total = results.len();
        let results: Vec<_> = results.into_iter().filter(|r| r.is_consistent()).collect();
        if results.len() != total {
            tracing::warn!(
                path = %self.path.display(),
                dropped = total - results.len(),
                "Skipped inconsistent records in history snapshot"
            );
        }
        results
    }
}

#[async_trait]
impl HistoryBackend for JsonFileBackend {
    #[tracing::instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> Vec<GenerationResult> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => {
                let results = self.parse(&content);
                tracing::debug!(count = results.len(), "Loaded history snapshot");
                results
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No history snapshot yet");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read history snapshot, starting with empty history");
                Vec::new()
            }
        }
    }

    #[tracing::instrument(skip(self, results), fields(path = %self.path.display(), count = results.len()))]
    async fn save(&self, results: &[GenerationResult]) -> StoryboardResult<()> {
        let json = serde_json::to_string_pretty(results).map_err(|e| {
            StorageError::new(StorageErrorKind::Serialization(e.to_string()))
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }

        let temp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, json).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
        })?;

        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| {
                StorageError::new(StorageErrorKind::FileWrite(format!(
                    "rename {} to {}: {}",
                    temp_path.display(),
                    self.path.display(),
                    e
                )))
            })?;

        tracing::debug!("Saved history snapshot");
        Ok(())
    }

    fn name(&self) -> &str {
        "json-file"
    }
}
