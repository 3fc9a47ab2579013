//! Ordered, persisted history of generation results.

use crate::{HistoryBackend, InMemoryBackend};
use std::sync::Arc;
use storyboard_core::GenerationResult;
use storyboard_error::StoryboardResult;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

/// History of generation results, keyed by id, in insertion order.
///
/// All mutations are serialized behind one async lock, and each one writes
/// the whole collection to the backend before the lock is released. If the
/// write fails the in-memory change is kept and the error is returned.
pub struct ResultStore {
    results: Mutex<Vec<GenerationResult>>,
    backend: Arc<dyn HistoryBackend>,
}

impl std::fmt::Debug for ResultStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultStore")
            .field("backend", &self.backend.name())
            .finish_non_exhaustive()
    }
}

impl ResultStore {
    /// Open a store, restoring the snapshot held by `backend`.
    #[instrument(skip(backend), fields(backend = backend.name()))]
    pub async fn open(backend: Arc<dyn HistoryBackend>) -> Self {
        let results = backend.load().await;
        info!(count = results.len(), "Opened result history");
        Self {
            results: Mutex::new(results),
            backend,
        }
    }

    /// Empty store that keeps nothing beyond the process.
    pub fn in_memory() -> Self {
        Self {
            results: Mutex::new(Vec::new()),
            backend: Arc::new(InMemoryBackend::new()),
        }
    }

    /// Add a result, or replace the one with the same id in place.
    #[instrument(skip(self, result), fields(id = %result.id()))]
    pub async fn insert_or_replace(&self, result: GenerationResult) -> StoryboardResult<()> {
        let mut results = self.results.lock().await;
        match results.iter().position(|r| r.id() == result.id()) {
            Some(pos) => results[pos] = result,
            None => results.push(result),
        }
        self.backend.save(&results).await
    }

    /// Store a result as the most recent entry.
    ///
    /// An existing entry with the same id is removed first, so a retried
    /// result moves to the front of [`ResultStore::recent`].
    #[instrument(skip(self, result), fields(id = %result.id()))]
    pub async fn upsert(&self, result: GenerationResult) -> StoryboardResult<()> {
        let mut results = self.results.lock().await;
        results.retain(|r| r.id() != result.id());
        results.push(result);
        self.backend.save(&results).await
    }

    /// Remove a result. Removing an unknown id does nothing and writes nothing.
    #[instrument(skip(self))]
    pub async fn remove(&self, id: &str) -> StoryboardResult<Option<GenerationResult>> {
        let mut results = self.results.lock().await;
        let Some(pos) = results.iter().position(|r| r.id() == id) else {
            debug!("Nothing to remove");
            return Ok(None);
        };
        let removed = results.remove(pos);
        self.backend.save(&results).await?;
        Ok(Some(removed))
    }

    /// Result by id.
    pub async fn get(&self, id: &str) -> Option<GenerationResult> {
        self.results
            .lock()
            .await
            .iter()
            .find(|r| r.id() == id)
            .cloned()
    }

    /// Every result in insertion order.
    pub async fn all(&self) -> Vec<GenerationResult> {
        self.results.lock().await.clone()
    }

    /// Up to `limit` results, newest first.
    pub async fn recent(&self, limit: usize) -> Vec<GenerationResult> {
        self.results
            .lock()
            .await
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect()
    }

    /// Results of one batch, ordered by the scene index encoded in their ids.
    pub async fn batch(&self, batch_id: &str) -> Vec<GenerationResult> {
        let mut batch: Vec<_> = self
            .results
            .lock()
            .await
            .iter()
            .filter(|r| r.batch_id() == batch_id)
            .cloned()
            .collect();
        batch.sort_by_key(|r| r.scene_index().unwrap_or(u32::MAX));
        batch
    }

    /// Distinct batch ids in the order they first appear.
    pub async fn batches(&self) -> Vec<String> {
        let results = self.results.lock().await;
        let mut batches: Vec<String> = Vec::new();
        for result in results.iter() {
            if !batches.iter().any(|b| b == result.batch_id()) {
                batches.push(result.batch_id().clone());
            }
        }
        batches
    }

    /// Number of stored results.
    pub async fn len(&self) -> usize {
        self.results.lock().await.len()
    }

    /// Whether the history is empty.
    pub async fn is_empty(&self) -> bool {
        self.results.lock().await.is_empty()
    }
}
