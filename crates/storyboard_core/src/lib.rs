//! Core data types for the Storyboard pipeline.
//!
//! A script is analyzed into [`SceneDescriptor`]s, each scene is rendered
//! into a [`GenerationResult`], and the orchestrator reports where a batch
//! stands through [`BatchProgress`] and [`BatchEvent`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod aspect_ratio;
mod event;
mod image;
mod progress;
mod result;
mod scene;

pub use aspect_ratio::AspectRatio;
pub use event::BatchEvent;
pub use image::ImageData;
pub use progress::{BatchPhase, BatchProgress};
pub use result::{GenerationResult, ResultStatus, new_batch_id, result_id, scene_index_of};
pub use scene::{FALLBACK_SUMMARY, SceneDescriptor};
