//! Batch generation and retry command handlers.

use crate::cli::{ScriptSource, build_orchestrator};
use std::path::PathBuf;
use std::sync::Arc;
use storyboard::{
    AspectRatio, BatchEvent, BatchReport, ConfigError, StoryboardConfig, StoryboardResult,
    export_image,
};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

/// Read the script from `--text` or `--file`.
async fn read_script(source: ScriptSource) -> StoryboardResult<String> {
    match (source.text, source.file) {
        (Some(text), _) => Ok(text),
        (None, Some(path)) => tokio::fs::read_to_string(&path).await.map_err(|e| {
            ConfigError::new(format!("Failed to read script {}: {}", path.display(), e)).into()
        }),
        (None, None) => Err(ConfigError::new("Provide --text or --file").into()),
    }
}

fn print_event(event: &BatchEvent) {
    match event {
        BatchEvent::Progress(progress) => println!("[{}] {}", progress.phase, progress.message),
        BatchEvent::Result(result) => {
            println!("  {} {}", result.status(), result.id());
            if let Some(suggestion) = result.suggested_prompt() {
                println!("    suggested prompt: {}", suggestion);
            }
        }
        BatchEvent::Updated(result) => println!("  updated {}", result.id()),
        BatchEvent::Removed(id) => println!("  removed {}", id),
        BatchEvent::Notice(notice) => println!("  {}", notice),
    }
}

/// Run one batch, printing progress as it happens.
///
/// Ctrl-C cancels the batch before its next scene.
pub async fn generate(
    config: &StoryboardConfig,
    api_key: Option<String>,
    source: ScriptSource,
    aspect_ratio: AspectRatio,
    out: Option<PathBuf>,
) -> StoryboardResult<()> {
    let script = read_script(source).await?;
    let orchestrator = Arc::new(build_orchestrator(config, api_key).await?);

    let mut events = orchestrator.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => print_event(&event),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Dropped progress events"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let interrupt = {
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                orchestrator.cancel();
            }
        })
    };

    let report = orchestrator.start_generation(&script, aspect_ratio).await;

    interrupt.abort();
    let _ = interrupt.await;
    // Dropping the last orchestrator handle closes the event channel.
    drop(orchestrator);
    let _ = printer.await;

    let Some(report) = report else {
        println!("Nothing to do: the script is empty.");
        return Ok(());
    };
    summarize(&report);

    if let Some(dir) = out {
        for result in report.results().iter().filter(|r| r.is_success()) {
            let path = export_image(result, &dir).await?;
            println!("Saved {}", path.display());
        }
    }
    Ok(())
}

fn summarize(report: &BatchReport) {
    info!(
        batch_id = %report.batch_id(),
        succeeded = report.succeeded(),
        failed = report.failed(),
        "Batch complete"
    );
    println!();
    println!("Batch {}: {}", report.batch_id(), report.progress().message);
    for result in report.results() {
        println!(
            "  {:<8} {}  {}",
            result.status(),
            result.id(),
            result.scene_summary().as_deref().unwrap_or("")
        );
    }
}

/// Render a stored result again.
pub async fn retry(
    config: &StoryboardConfig,
    api_key: Option<String>,
    id: &str,
    use_suggested: bool,
) -> StoryboardResult<()> {
    let orchestrator = build_orchestrator(config, api_key).await?;
    match orchestrator.retry(id, use_suggested).await? {
        Some(result) => println!("Re-rendered {} with prompt: {}", result.id(), result.refined_prompt()),
        None => println!("A retry of {} is already running", id),
    }
    Ok(())
}
