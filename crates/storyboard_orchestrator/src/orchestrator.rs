//! The batch generation control loop and the commands around it.

use crate::guard::InFlight;
use crate::scenes::normalize_scenes;
use derive_getters::Getters;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use storyboard_core::{
    AspectRatio, BatchEvent, BatchProgress, GenerationResult, SceneDescriptor, new_batch_id,
};
use storyboard_error::{OrchestratorError, OrchestratorErrorKind, StoryboardResult};
use storyboard_interface::{ImageRenderer, PromptRepair, SceneAnalyzer};
use storyboard_rate_limit::Pacer;
use storyboard_storage::{ResultStore, export_image};
use tokio::sync::{Mutex, broadcast, watch};
use tracing::{debug, info, instrument, warn};

const EVENT_CAPACITY: usize = 256;

/// Outcome of one [`BatchOrchestrator::start_generation`] call.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct BatchReport {
    /// Id shared by every result of the batch
    batch_id: String,
    /// One result per scene, in scene order
    results: Vec<GenerationResult>,
    /// Terminal progress the batch ended with
    progress: BatchProgress,
}

impl BatchReport {
    /// Number of scenes that rendered.
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    /// Number of scenes that failed.
    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }
}

/// Results the presentation layer is showing right now.
#[derive(Debug, Default)]
struct LiveView {
    batch_id: Option<String>,
    results: Vec<GenerationResult>,
}

/// Drives scripts through analysis and rendering, one scene at a time.
///
/// The orchestrator owns the batch state machine
/// (`Idle → Analyzing → Generating → {Success, Error, Cancelled}`), the live
/// view of the current batch and the retry protocol. Provider failures become
/// data: a failed render is published as a failed result with an optional
/// repair suggestion, a failed analysis falls back to a single scene.
///
/// State changes are published on two channels: [`BatchOrchestrator::subscribe`]
/// delivers every [`BatchEvent`], [`BatchOrchestrator::progress`] always holds
/// the latest [`BatchProgress`].
///
/// # Example
///
/// ```rust,ignore
/// let orchestrator = BatchOrchestrator::from_provider(Arc::new(provider), store);
/// let mut events = orchestrator.subscribe();
/// let report = orchestrator
///     .start_generation("A fox crosses a frozen river.", AspectRatio::Landscape)
///     .await;
/// ```
pub struct BatchOrchestrator {
    analyzer: Arc<dyn SceneAnalyzer>,
    renderer: Arc<dyn ImageRenderer>,
    repair: Arc<dyn PromptRepair>,
    store: Arc<ResultStore>,
    pacer: Pacer,
    events: broadcast::Sender<BatchEvent>,
    progress: watch::Sender<BatchProgress>,
    live: Mutex<LiveView>,
    in_flight: InFlight,
    batch_gate: Mutex<()>,
    cancel_requested: AtomicBool,
}

impl std::fmt::Debug for BatchOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchOrchestrator")
            .field("store", &self.store)
            .field("pacer", &self.pacer)
            .field("progress", &*self.progress.borrow())
            .finish_non_exhaustive()
    }
}

impl BatchOrchestrator {
    /// Create an orchestrator from its collaborators.
    ///
    /// Uses the default pacing ([`storyboard_rate_limit::INTER_REQUEST_DELAY`]
    /// between renders).
    pub fn new(
        analyzer: Arc<dyn SceneAnalyzer>,
        renderer: Arc<dyn ImageRenderer>,
        repair: Arc<dyn PromptRepair>,
        store: Arc<ResultStore>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let (progress, _) = watch::channel(BatchProgress::idle());
        Self {
            analyzer,
            renderer,
            repair,
            store,
            pacer: Pacer::default(),
            events,
            progress,
            live: Mutex::new(LiveView::default()),
            in_flight: InFlight::default(),
            batch_gate: Mutex::new(()),
            cancel_requested: AtomicBool::new(false),
        }
    }

    /// Create an orchestrator whose three collaborators are one provider.
    pub fn from_provider<P>(provider: Arc<P>, store: Arc<ResultStore>) -> Self
    where
        P: SceneAnalyzer + ImageRenderer + PromptRepair + 'static,
    {
        Self::new(provider.clone(), provider.clone(), provider, store)
    }

    /// Replace the pacing between renders.
    pub fn with_pacer(mut self, pacer: Pacer) -> Self {
        self.pacer = pacer;
        self
    }

    /// Receive every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<BatchEvent> {
        self.events.subscribe()
    }

    /// Watch the batch progress.
    pub fn progress(&self) -> watch::Receiver<BatchProgress> {
        self.progress.subscribe()
    }

    /// Latest batch progress.
    pub fn current_progress(&self) -> BatchProgress {
        self.progress.borrow().clone()
    }

    /// Whether a batch is running.
    pub fn is_running(&self) -> bool {
        self.batch_gate.try_lock().is_err()
    }

    /// The result history.
    pub fn store(&self) -> &Arc<ResultStore> {
        &self.store
    }

    /// Results of the batch being shown, in scene order.
    pub async fn live_view(&self) -> Vec<GenerationResult> {
        self.live.lock().await.results.clone()
    }

    /// Id of the batch being shown.
    pub async fn live_batch_id(&self) -> Option<String> {
        self.live.lock().await.batch_id.clone()
    }

    /// Every stored result, oldest first.
    pub async fn history(&self) -> Vec<GenerationResult> {
        self.store.all().await
    }

    /// Up to `limit` stored results, newest first.
    pub async fn recent(&self, limit: usize) -> Vec<GenerationResult> {
        self.store.recent(limit).await
    }

    /// Ask the running batch to stop before its next scene.
    ///
    /// Results produced so far are kept. Has no effect when no batch runs.
    pub fn cancel(&self) {
        if self.is_running() {
            info!("Cancellation requested");
            self.cancel_requested.store(true, Ordering::SeqCst);
        }
    }

    /// Analyze `script` and render every scene.
    ///
    /// Returns `None` without doing anything when the script is blank or a
    /// batch is already running. Otherwise runs the batch to a terminal phase
    /// and returns its results; results of earlier batches are left alone.
    #[instrument(skip(self, script, aspect_ratio), fields(script_len = script.len(), aspect_ratio = %aspect_ratio))]
    pub async fn start_generation(
        &self,
        script: &str,
        aspect_ratio: AspectRatio,
    ) -> Option<BatchReport> {
        if script.trim().is_empty() {
            debug!("Ignoring blank script");
            return None;
        }

        let Ok(_gate) = self.batch_gate.try_lock() else {
            warn!("A batch is already running, ignoring start request");
            self.emit(BatchEvent::Notice(
                "A batch is already running".to_string(),
            ));
            return None;
        };
        self.cancel_requested.store(false, Ordering::SeqCst);

        let batch_id = new_batch_id();
        {
            let mut live = self.live.lock().await;
            live.batch_id = Some(batch_id.clone());
            live.results.clear();
        }
        info!(batch_id = %batch_id, "Starting batch");

        self.publish_progress(BatchProgress::analyzing());
        let scenes = self.analyze(script).await;

        let scenes = normalize_scenes(scenes, script);
        let progress = self
            .run_scenes(&batch_id, script, aspect_ratio, &scenes)
            .await;

        let results = {
            let live = self.live.lock().await;
            if live.batch_id.as_deref() == Some(batch_id.as_str()) {
                live.results.clone()
            } else {
                self.store.batch(&batch_id).await
            }
        };

        info!(
            batch_id = %batch_id,
            phase = %progress.phase,
            results = results.len(),
            "Batch finished"
        );

        Some(BatchReport {
            batch_id,
            results,
            progress,
        })
    }

    async fn analyze(&self, script: &str) -> Vec<SceneDescriptor> {
        match self.analyzer.analyze(script).await {
            Ok(scenes) => scenes,
            Err(e) => {
                warn!(error = %e, "Scene analysis failed, using the whole script as one scene");
                Vec::new()
            }
        }
    }

    async fn run_scenes(
        &self,
        batch_id: &str,
        script: &str,
        aspect_ratio: AspectRatio,
        scenes: &[SceneDescriptor],
    ) -> BatchProgress {
        let total = scenes.len();
        let mut pacer = self.pacer.clone();
        let mut failed = 0;

        self.publish_progress(BatchProgress::generating(0, total));

        for (position, scene) in scenes.iter().enumerate() {
            pacer.wait_turn(position).await;

            if self.cancel_requested.swap(false, Ordering::SeqCst) {
                info!(batch_id, completed = position, total, "Batch cancelled");
                let progress = BatchProgress::cancelled(position, total);
                self.publish_progress(progress.clone());
                return progress;
            }

            self.publish_progress(BatchProgress::generating(position + 1, total));

            let result = match self.renderer.render(&scene.image_prompt, aspect_ratio).await {
                Ok(image) => {
                    pacer.record_success();
                    let result =
                        GenerationResult::succeeded(batch_id, scene, script, aspect_ratio, image);
                    if let Err(e) = self.store.insert_or_replace(result.clone()).await {
                        warn!(id = %result.id(), error = %e, "Failed to persist result");
                    }
                    result
                }
                Err(e) => {
                    if e.is_rate_limited() {
                        pacer.record_rate_limited();
                    }
                    warn!(batch_id, scene = scene.index, error = %e, "Scene render failed");
                    failed += 1;
                    let suggestion = self.repair.repair(&scene.image_prompt).await;
                    GenerationResult::failed(batch_id, scene, script, aspect_ratio, Some(suggestion))
                }
            };

            {
                let mut live = self.live.lock().await;
                if live.batch_id.as_deref() == Some(batch_id) {
                    live.results.push(result.clone());
                }
            }
            debug!(id = %result.id(), status = %result.status(), "Scene finished");
            self.emit(BatchEvent::Result(result));
        }

        let progress = BatchProgress::success(total, failed);
        self.publish_progress(progress.clone());
        progress
    }

    /// Render a result again.
    ///
    /// Uses the pending suggestion when `use_suggested_prompt` is set and one
    /// exists, otherwise the prompt of the last attempt. On success the
    /// result is updated in place (the id is kept) in the live view and
    /// stored as the most recent history entry.
    ///
    /// Returns `Ok(None)` when a retry for the same id is already running.
    ///
    /// # Errors
    ///
    /// [`OrchestratorErrorKind::ResultNotFound`] for an unknown id or one
    /// deleted while the render ran, and
    /// [`OrchestratorErrorKind::RetryFailed`] when the render fails. A failed
    /// retry leaves the result unchanged and publishes a notice.
    #[instrument(skip(self))]
    pub async fn retry(
        &self,
        id: &str,
        use_suggested_prompt: bool,
    ) -> StoryboardResult<Option<GenerationResult>> {
        let Some(_guard) = self.in_flight.claim(id) else {
            debug!("Retry already in flight");
            return Ok(None);
        };

        let mut result = self.find(id).await.ok_or_else(|| {
            OrchestratorError::new(OrchestratorErrorKind::ResultNotFound(id.to_string()))
        })?;

        let prompt = result.retry_prompt(use_suggested_prompt).to_string();
        let image = match self.renderer.render(&prompt, *result.aspect_ratio()).await {
            Ok(image) => image,
            Err(e) => {
                warn!(error = %e, "Retry failed");
                self.emit(BatchEvent::Notice(format!(
                    "Retry of {} failed: {}",
                    id, e.kind
                )));
                return Err(OrchestratorError::new(OrchestratorErrorKind::RetryFailed {
                    id: id.to_string(),
                    message: e.kind.to_string(),
                })
                .into());
            }
        };

        result.mark_rendered(prompt, image);

        // `delete` holds the live lock until the store removal is done.
        let mut live = self.live.lock().await;
        let in_live = live.results.iter().any(|r| r.id() == id);
        if !in_live && self.store.get(id).await.is_none() {
            info!("Result was deleted while retrying, discarding render");
            return Err(
                OrchestratorError::new(OrchestratorErrorKind::ResultNotFound(id.to_string()))
                    .into(),
            );
        }
        if let Some(existing) = live.results.iter_mut().find(|r| r.id() == id) {
            *existing = result.clone();
        }
        if let Err(e) = self.store.upsert(result.clone()).await {
            warn!(error = %e, "Failed to persist retried result");
        }
        drop(live);

        info!("Retry succeeded");
        self.emit(BatchEvent::Updated(result.clone()));
        Ok(Some(result))
    }

    /// Delete a result from history and the live view.
    ///
    /// Deleting an unknown id does nothing. Returns whether anything was
    /// removed. A retry of the same id that is still rendering discards its
    /// image instead of bringing the result back.
    ///
    /// # Errors
    ///
    /// Returns an error if the history snapshot cannot be written; the result
    /// is removed from memory regardless.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> StoryboardResult<bool> {
        let removed = {
            let mut live = self.live.lock().await;
            let before = live.results.len();
            live.results.retain(|r| r.id() != id);
            let removed_live = live.results.len() != before;
            let removed_stored = self.store.remove(id).await?.is_some();
            removed_live || removed_stored
        };

        if removed {
            info!("Deleted result");
            self.emit(BatchEvent::Removed(id.to_string()));
        }
        Ok(removed)
    }

    /// Show a stored batch in the live view.
    ///
    /// Results are ordered by the scene index encoded in their ids. An
    /// unknown batch yields an empty list and leaves the live view alone.
    #[instrument(skip(self))]
    pub async fn select_batch(&self, batch_id: &str) -> Vec<GenerationResult> {
        let results = self.store.batch(batch_id).await;
        if results.is_empty() {
            debug!("No stored results for batch");
            return results;
        }

        let mut live = self.live.lock().await;
        live.batch_id = Some(batch_id.to_string());
        live.results = results.clone();
        debug!(count = results.len(), "Selected batch");
        results
    }

    /// Write the image of a result to `<dir>/scene-<id>.<ext>`.
    ///
    /// # Errors
    ///
    /// [`OrchestratorErrorKind::ResultNotFound`] for an unknown id, or a
    /// storage error when the result has no image or the file cannot be
    /// written.
    #[instrument(skip(self, dir), fields(dir = %dir.as_ref().display()))]
    pub async fn download(&self, id: &str, dir: impl AsRef<Path>) -> StoryboardResult<PathBuf> {
        let result = self.find(id).await.ok_or_else(|| {
            OrchestratorError::new(OrchestratorErrorKind::ResultNotFound(id.to_string()))
        })?;
        export_image(&result, dir.as_ref()).await
    }

    /// Look a result up in the live view, then in history.
    async fn find(&self, id: &str) -> Option<GenerationResult> {
        let live = self
            .live
            .lock()
            .await
            .results
            .iter()
            .find(|r| r.id() == id)
            .cloned();
        match live {
            Some(result) => Some(result),
            None => self.store.get(id).await,
        }
    }

    fn publish_progress(&self, progress: BatchProgress) {
        debug!(phase = %progress.phase, message = %progress.message, "Progress");
        self.progress.send_replace(progress.clone());
        self.emit(BatchEvent::Progress(progress));
    }

    fn emit(&self, event: BatchEvent) {
        // Sending only fails when nobody is subscribed.
        let _ = self.events.send(event);
    }
}
