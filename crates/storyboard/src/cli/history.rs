//! History inspection and management command handlers.

use crate::cli::open_store;
use std::path::PathBuf;
use storyboard::{
    GenerationResult, OrchestratorError, OrchestratorErrorKind, StoryboardConfig,
    StoryboardResult, export_image,
};

fn print_result(result: &GenerationResult) {
    println!(
        "{}  {:<8} {}  {}",
        result.created_at().format("%Y-%m-%d %H:%M:%S"),
        result.status(),
        result.id(),
        result.scene_summary().as_deref().unwrap_or("")
    );
}

/// List the most recent results.
pub async fn show_history(config: &StoryboardConfig, limit: usize) -> StoryboardResult<()> {
    let store = open_store(config).await;
    let recent = store.recent(limit).await;
    if recent.is_empty() {
        println!("History is empty.");
    }
    for result in &recent {
        print_result(result);
    }
    Ok(())
}

/// Show one batch in scene order.
pub async fn show_batch(config: &StoryboardConfig, batch_id: &str) -> StoryboardResult<()> {
    let store = open_store(config).await;
    let results = store.batch(batch_id).await;
    if results.is_empty() {
        println!("No stored results for batch {}.", batch_id);
        return Ok(());
    }
    if let Some(first) = results.first() {
        println!("Script: {}", first.original_input());
    }
    for result in &results {
        print_result(result);
        println!("    prompt: {}", result.refined_prompt());
    }
    Ok(())
}

/// Delete a result; unknown ids are reported, not treated as errors.
pub async fn delete(config: &StoryboardConfig, id: &str) -> StoryboardResult<()> {
    let store = open_store(config).await;
    match store.remove(id).await? {
        Some(_) => println!("Deleted {}", id),
        None => println!("No result with id {}", id),
    }
    Ok(())
}

/// Export the image of a stored result.
pub async fn download(
    config: &StoryboardConfig,
    id: &str,
    out: Option<PathBuf>,
) -> StoryboardResult<()> {
    let store = open_store(config).await;
    let result = store.get(id).await.ok_or_else(|| {
        OrchestratorError::new(OrchestratorErrorKind::ResultNotFound(id.to_string()))
    })?;
    let dir = out.unwrap_or_else(|| config.storage.export_dir.clone());
    let path = export_image(&result, &dir).await?;
    println!("Saved {}", path.display());
    Ok(())
}
