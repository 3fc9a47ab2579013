//! Collaborator interfaces for the Storyboard pipeline.
//!
//! The orchestrator never talks to a provider directly. It is handed one
//! implementation of each trait at construction time:
//!
//! - [`SceneAnalyzer`] - script text to ordered scene descriptors
//! - [`ImageRenderer`] - scene prompt to rendered image
//! - [`PromptRepair`] - failed prompt to a safer rewrite

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;

pub use traits::{ImageRenderer, PromptRepair, SceneAnalyzer};
