//! Snapshot backends for the result history.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use storyboard_core::GenerationResult;
use storyboard_error::StoryboardResult;
use tokio::sync::Mutex;

/// Durable home of the whole-collection history snapshot.
///
/// The store writes the complete ordered collection on every mutation, so a
/// backend only ever holds one record.
#[async_trait]
pub trait HistoryBackend: Send + Sync {
    /// Read the last saved snapshot.
    ///
    /// Missing or unparseable content is "no history": implementations log
    /// a warning and return an empty list rather than failing.
    async fn load(&self) -> Vec<GenerationResult>;

    /// Replace the snapshot with `results`.
    async fn save(&self, results: &[GenerationResult]) -> StoryboardResult<()>;

    /// Backend name for logs.
    fn name(&self) -> &str;
}

/// Keeps the snapshot in memory.
///
/// Used for ephemeral runs and by tests, which read [`InMemoryBackend::saves`]
/// to check that every mutation wrote a snapshot.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    snapshot: Mutex<Vec<GenerationResult>>,
    saves: AtomicUsize,
}

impl InMemoryBackend {
    /// Empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend pre-seeded with a snapshot, as if written by an earlier run.
    pub fn with_snapshot(results: Vec<GenerationResult>) -> Self {
        Self {
            snapshot: Mutex::new(results),
            saves: AtomicUsize::new(0),
        }
    }

    /// Number of snapshot writes so far.
    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Copy of the current snapshot.
    pub async fn snapshot(&self) -> Vec<GenerationResult> {
        self.snapshot.lock().await.clone()
    }
}

#[async_trait]
impl HistoryBackend for InMemoryBackend {
    async fn load(&self) -> Vec<GenerationResult> {
        self.snapshot.lock().await.clone()
    }

    async fn save(&self, results: &[GenerationResult]) -> StoryboardResult<()> {
        *self.snapshot.lock().await = results.to_vec();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
