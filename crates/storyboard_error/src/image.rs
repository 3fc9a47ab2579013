//! Image payload error types.

/// Ways an encoded image payload can be malformed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ImageErrorKind {
    /// Value does not start with `data:`
    #[display("Image data is not a data URI")]
    NotDataUri,
    /// Data URI lacks the `;base64,` marker
    #[display("Image data URI is not base64 encoded")]
    NotBase64,
    /// Payload is not valid base64
    #[display("Invalid base64 image payload: {}", _0)]
    InvalidBase64(String),
}

/// Image payload error with location tracking.
///
/// # Examples
///
/// ```
/// use storyboard_error::{ImageError, ImageErrorKind};
///
/// let err = ImageError::new(ImageErrorKind::NotDataUri);
/// assert!(format!("{}", err).contains("not a data URI"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Image Error: {} at line {} in {}", kind, line, file)]
pub struct ImageError {
    /// The specific error condition
    pub kind: ImageErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl ImageError {
    /// Create a new ImageError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ImageErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
