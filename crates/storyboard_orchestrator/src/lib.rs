//! Batch generation orchestrator for Storyboard.
//!
//! [`BatchOrchestrator`] takes a script through the injected
//! [`SceneAnalyzer`](storyboard_interface::SceneAnalyzer), renders the scenes
//! strictly one after another through the
//! [`ImageRenderer`](storyboard_interface::ImageRenderer), asks the
//! [`PromptRepair`](storyboard_interface::PromptRepair) for a safer prompt
//! whenever a render fails, and publishes results as they arrive. Successful
//! results go to the [`ResultStore`](storyboard_storage::ResultStore); failed
//! ones stay in the live view until retried or deleted.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod guard;
mod orchestrator;
mod scenes;

pub use orchestrator::{BatchOrchestrator, BatchReport};
pub use scenes::normalize_scenes;
