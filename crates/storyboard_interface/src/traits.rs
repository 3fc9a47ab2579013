//! Trait definitions for the AI capabilities the orchestrator drives.

use async_trait::async_trait;
use storyboard_core::{AspectRatio, ImageData, SceneDescriptor};
use storyboard_error::{AnalysisError, RenderError};

/// Splits a script into an ordered list of scenes.
#[async_trait]
pub trait SceneAnalyzer: Send + Sync {
    /// Analyze `script` into scenes.
    ///
    /// Implementations normalize a single returned scene into a one-element
    /// list. The orchestrator tolerates errors and empty lists by falling
    /// back to a single scene built from the whole script.
    async fn analyze(&self, script: &str) -> Result<Vec<SceneDescriptor>, AnalysisError>;
}

/// Renders one scene prompt into an image.
#[async_trait]
pub trait ImageRenderer: Send + Sync {
    /// Render `prompt` at `aspect_ratio`.
    ///
    /// Fails with [`RenderError`] when the provider returns no image, which
    /// is usually a safety-filter rejection.
    async fn render(&self, prompt: &str, aspect_ratio: AspectRatio)
    -> Result<ImageData, RenderError>;
}

/// Rewrites a prompt that failed to render.
#[async_trait]
pub trait PromptRepair: Send + Sync {
    /// Return a safer rewrite of `prompt`.
    ///
    /// Never fails: on any problem the original prompt is returned, so callers
    /// compare the answer with the input before offering it as a suggestion.
    async fn repair(&self, prompt: &str) -> String;
}
