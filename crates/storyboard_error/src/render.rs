//! Image rendering error types.

/// Ways a single scene render can fail.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum RenderErrorKind {
    /// Provider answered but produced no image, commonly a safety rejection
    #[display("No image returned: {}", _0)]
    NoImage(String),
    /// Upstream call failed
    #[display("Render request failed: {}", _0)]
    Provider(String),
    /// Upstream kept rejecting the request with a rate-limit status
    #[display("Rate limited: {}", _0)]
    RateLimited(String),
    /// Image payload could not be decoded
    #[display("Invalid image payload: {}", _0)]
    InvalidPayload(String),
}

/// Render error with location tracking.
///
/// # Examples
///
/// ```
/// use storyboard_error::{RenderError, RenderErrorKind};
///
/// let err = RenderError::new(RenderErrorKind::NoImage("IMAGE_SAFETY".to_string()));
/// assert!(format!("{}", err).contains("IMAGE_SAFETY"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Render Error: {} at line {} in {}", kind, line, file)]
pub struct RenderError {
    /// The specific error condition
    pub kind: RenderErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl RenderError {
    /// Create a new RenderError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: RenderErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Whether the failure was caused by upstream rate limiting.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self.kind, RenderErrorKind::RateLimited(_))
    }
}
