//! Image export.

use std::path::{Path, PathBuf};
use storyboard_core::GenerationResult;
use storyboard_error::{StorageError, StorageErrorKind, StoryboardResult};

/// Write the image of `result` to `<dir>/scene-<id>.<ext>`.
///
/// The extension follows the image MIME type. Nothing is written for a
/// result without an image.
///
/// # Errors
///
/// [`StorageErrorKind::MissingImage`] when the result has no image, or an I/O
/// error kind when the directory or file cannot be written.
#[tracing::instrument(skip(result, dir), fields(id = %result.id(), dir = %dir.display()))]
pub async fn export_image(result: &GenerationResult, dir: &Path) -> StoryboardResult<PathBuf> {
    let image = result
        .image_data()
        .as_ref()
        .ok_or_else(|| StorageError::new(StorageErrorKind::MissingImage(result.id().clone())))?;

    tokio::fs::create_dir_all(dir).await.map_err(|e| {
        StorageError::new(StorageErrorKind::DirectoryCreation(format!(
            "{}: {}",
            dir.display(),
            e
        )))
    })?;

    let path = dir.join(format!("scene-{}.{}", result.id(), image.extension()));
    tokio::fs::write(&path, image.bytes()).await.map_err(|e| {
        StorageError::new(StorageErrorKind::FileWrite(format!(
            "{}: {}",
            path.display(),
            e
        )))
    })?;

    tracing::info!(path = %path.display(), size = image.bytes().len(), "Exported image");
    Ok(path)
}
