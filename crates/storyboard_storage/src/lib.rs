//! Result history persistence for Storyboard.
//!
//! [`ResultStore`] is the ordered history of generation results. It writes
//! its whole collection through a [`HistoryBackend`] after every mutation:
//!
//! - [`JsonFileBackend`] keeps the snapshot in one JSON file (atomic writes)
//! - [`InMemoryBackend`] keeps it in memory
//!
//! [`export_image`] writes a result's image to disk.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod export;
mod json_file;
mod store;

pub use backend::{HistoryBackend, InMemoryBackend};
pub use export::export_image;
pub use json_file::JsonFileBackend;
pub use store::ResultStore;
