//! Storyboard: turn a narrative script into a sequence of illustrated scenes.
//!
//! A script is split into scenes by a [`SceneAnalyzer`], each scene is
//! rendered by an [`ImageRenderer`] in a fixed house style, and scenes that
//! fail get a safer prompt suggestion from a [`PromptRepair`]. The
//! [`BatchOrchestrator`] drives this loop one scene at a time with pacing,
//! publishes results as they arrive and keeps successful ones in a persisted
//! [`ResultStore`].
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use storyboard::{
//!     AspectRatio, BatchOrchestrator, GeminiProvider, JsonFileBackend, Pacer, ResultStore,
//!     StoryboardConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StoryboardConfig::load()?;
//!     let provider = Arc::new(GeminiProvider::from_env(&config.provider)?);
//!     let backend = JsonFileBackend::new(config.storage.resolved_history_path());
//!     let store = Arc::new(ResultStore::open(Arc::new(backend)).await);
//!
//!     let orchestrator = BatchOrchestrator::from_provider(provider, store)
//!         .with_pacer(Pacer::from_config(&config.pacing));
//!     if let Some(report) = orchestrator
//!         .start_generation("A fox crosses a frozen river at dawn.", AspectRatio::Landscape)
//!         .await
//!     {
//!         println!("{} scenes, {} failed", report.results().len(), report.failed());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `storyboard_error` - Error types
//! - `storyboard_core` - Data model (scenes, results, progress, events)
//! - `storyboard_interface` - Collaborator traits
//! - `storyboard_rate_limit` - Configuration, pacing, rate limiting and retry
//! - `storyboard_storage` - Result history persistence and image export
//! - `storyboard_models` - Gemini provider
//! - `storyboard_orchestrator` - Batch orchestrator
//!
//! This crate re-exports everything for convenience.

pub use storyboard_core::*;
pub use storyboard_error::*;
pub use storyboard_interface::*;
pub use storyboard_models::{GEMINI_API_KEY_ENV, GeminiProvider};
pub use storyboard_orchestrator::{BatchOrchestrator, BatchReport, normalize_scenes};
pub use storyboard_rate_limit::*;
pub use storyboard_storage::*;
