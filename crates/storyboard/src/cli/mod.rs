//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the storyboard binary.

mod commands;
mod generate;
mod history;

pub use commands::{Cli, Commands, ScriptSource};
pub use generate::{generate, retry};
pub use history::{delete, download, show_batch, show_history};

use std::sync::Arc;
use storyboard::{
    BatchOrchestrator, ConfigError, GEMINI_API_KEY_ENV, GeminiProvider, JsonFileBackend, Pacer,
    ResultStore, StoryboardConfig, StoryboardResult,
};

/// Open the configured result history.
pub async fn open_store(config: &StoryboardConfig) -> Arc<ResultStore> {
    let backend = JsonFileBackend::new(config.storage.resolved_history_path());
    Arc::new(ResultStore::open(Arc::new(backend)).await)
}

/// Build an orchestrator over the Gemini provider.
///
/// # Errors
///
/// Returns a [`ConfigError`] when no API key is available.
pub async fn build_orchestrator(
    config: &StoryboardConfig,
    api_key: Option<String>,
) -> StoryboardResult<BatchOrchestrator> {
    let api_key = api_key.filter(|k| !k.trim().is_empty()).ok_or_else(|| {
        ConfigError::new(format!(
            "No Gemini API key found. Set {} (a .env file works) or pass --api-key.",
            GEMINI_API_KEY_ENV
        ))
    })?;

    let provider = Arc::new(GeminiProvider::new(api_key, &config.provider)?);
    let store = open_store(config).await;
    Ok(BatchOrchestrator::from_provider(provider, store)
        .with_pacer(Pacer::from_config(&config.pacing)))
}
