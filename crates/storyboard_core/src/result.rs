//! Generation results, the unit published by the orchestrator and kept in history.

use crate::{AspectRatio, ImageData, SceneDescriptor};
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Outcome of the last render attempt for a scene.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    /// An image was produced
    #[display("success")]
    Success,
    /// The renderer returned no image
    #[display("failed")]
    Failed,
}

/// Mint a new batch identifier.
///
/// The identifier contains no `-`, so the scene index can always be read back
/// from the suffix of a result id.
pub fn new_batch_id() -> String {
    format!("batch{}", uuid::Uuid::new_v4().simple())
}

/// Result id for a scene of a batch: `<batch_id>-<scene_index>`.
///
/// # Examples
///
/// ```
/// use storyboard_core::{result_id, scene_index_of};
///
/// let id = result_id("batch42", 3);
/// assert_eq!(id, "batch42-3");
/// assert_eq!(scene_index_of(&id), Some(3));
/// ```
pub fn result_id(batch_id: &str, scene_index: u32) -> String {
    format!("{}-{}", batch_id, scene_index)
}

/// Scene index encoded as the suffix of a result id.
pub fn scene_index_of(id: &str) -> Option<u32> {
    id.rsplit_once('-').and_then(|(_, suffix)| suffix.parse().ok())
}

/// One rendered (or failed) scene.
///
/// The constructors and [`GenerationResult::mark_rendered`] maintain two
/// invariants: `image_data` is present iff `status` is
/// [`ResultStatus::Success`], and `suggested_prompt` never equals
/// `refined_prompt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    /// Stable id derived from batch id and scene index
    id: String,
    /// Batch this result belongs to
    batch_id: String,
    /// The full script that was submitted
    original_input: String,
    /// Prompt used for the last render attempt
    refined_prompt: String,
    /// Safer rewrite offered after a failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    suggested_prompt: Option<String>,
    /// Scene summary from analysis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scene_summary: Option<String>,
    /// Rendered image, present only on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image_data: Option<ImageData>,
    /// Requested aspect ratio
    aspect_ratio: AspectRatio,
    /// When the last render attempt completed
    created_at: DateTime<Utc>,
    /// Outcome of the last render attempt
    status: ResultStatus,
}

impl GenerationResult {
    /// A scene that rendered successfully.
    pub fn succeeded(
        batch_id: &str,
        scene: &SceneDescriptor,
        original_input: &str,
        aspect_ratio: AspectRatio,
        image: ImageData,
    ) -> Self {
        Self {
            id: result_id(batch_id, scene.index),
            batch_id: batch_id.to_string(),
            original_input: original_input.to_string(),
            refined_prompt: scene.image_prompt.clone(),
            suggested_prompt: None,
            scene_summary: Some(scene.summary.clone()),
            image_data: Some(image),
            aspect_ratio,
            created_at: Utc::now(),
            status: ResultStatus::Success,
        }
    }

    /// A scene whose render failed, with an optional repair suggestion.
    ///
    /// A suggestion identical to the scene prompt (ignoring surrounding
    /// whitespace) or blank is dropped.
    pub fn failed(
        batch_id: &str,
        scene: &SceneDescriptor,
        original_input: &str,
        aspect_ratio: AspectRatio,
        suggestion: Option<String>,
    ) -> Self {
        let suggested_prompt =
            suggestion.filter(|s| is_distinct_suggestion(s, &scene.image_prompt));
        Self {
            id: result_id(batch_id, scene.index),
            batch_id: batch_id.to_string(),
            original_input: original_input.to_string(),
            refined_prompt: scene.image_prompt.clone(),
            suggested_prompt,
            scene_summary: Some(scene.summary.clone()),
            image_data: None,
            aspect_ratio,
            created_at: Utc::now(),
            status: ResultStatus::Failed,
        }
    }

    /// Apply a successful re-render in place.
    ///
    /// The id is kept, the prompt that produced the image becomes the
    /// refined prompt, any pending suggestion is consumed and the timestamp
    /// is refreshed.
    pub fn mark_rendered(&mut self, prompt: String, image: ImageData) {
        self.refined_prompt = prompt;
        self.suggested_prompt = None;
        self.image_data = Some(image);
        self.status = ResultStatus::Success;
        self.created_at = Utc::now();
    }

    /// Prompt a retry should use.
    ///
    /// Falls back to the refined prompt when no suggestion is pending.
    pub fn retry_prompt(&self, use_suggested: bool) -> &str {
        match (&self.suggested_prompt, use_suggested) {
            (Some(suggestion), true) => suggestion,
            _ => &self.refined_prompt,
        }
    }

    /// Scene index read back from the id suffix.
    pub fn scene_index(&self) -> Option<u32> {
        scene_index_of(&self.id)
    }

    /// Whether the last render produced an image.
    pub fn is_success(&self) -> bool {
        self.status == ResultStatus::Success
    }

    /// Check both record invariants; used when loading untrusted snapshots.
    pub fn is_consistent(&self) -> bool {
        let image_matches = self.image_data.is_some() == self.is_success();
        let suggestion_differs = self
            .suggested_prompt
            .as_deref()
            .is_none_or(|s| s != self.refined_prompt);
        image_matches && suggestion_differs
    }
}

fn is_distinct_suggestion(suggestion: &str, prompt: &str) -> bool {
    let suggestion = suggestion.trim();
    !suggestion.is_empty() && suggestion != prompt.trim()
}
