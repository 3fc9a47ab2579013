//! Error types for the Storyboard pipeline.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! Provider failures during a batch are converted into data by the
//! orchestrator (a failed result or an omitted suggestion). Only
//! [`ConfigError`] and orchestrator control-flow errors reach the caller.
//!
//! # Examples
//!
//! ```
//! use storyboard_error::{StoryboardResult, RenderError, RenderErrorKind};
//!
//! fn render() -> StoryboardResult<Vec<u8>> {
//!     Err(RenderError::new(RenderErrorKind::NoImage("blocked".into())))?
//! }
//!
//! assert!(render().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analysis;
mod config;
mod error;
mod http;
mod image;
mod orchestrator;
mod provider;
mod render;
mod repair;
mod storage;

pub use analysis::{AnalysisError, AnalysisErrorKind};
pub use config::ConfigError;
pub use error::{StoryboardError, StoryboardErrorKind, StoryboardResult};
pub use http::HttpError;
pub use image::{ImageError, ImageErrorKind};
pub use orchestrator::{OrchestratorError, OrchestratorErrorKind};
pub use provider::{ProviderError, ProviderErrorKind, RetryableError};
pub use render::{RenderError, RenderErrorKind};
pub use repair::RepairError;
pub use storage::{StorageError, StorageErrorKind};
