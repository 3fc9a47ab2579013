//! Scene analysis error types.

/// Ways a script analysis call can fail.
///
/// Every variant is recoverable: the orchestrator replaces the analysis with
/// a single-scene fallback.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum AnalysisErrorKind {
    /// Upstream call failed
    #[display("Analysis request failed: {}", _0)]
    Provider(String),
    /// Provider answered without any text
    #[display("Analysis returned no content")]
    EmptyResponse,
    /// Reply text was not valid JSON
    #[display("Failed to parse scene list: {}", _0)]
    Parse(String),
    /// JSON parsed but is neither a scene list nor a single scene
    #[display("Unexpected scene list shape: {}", _0)]
    InvalidShape(String),
}

/// Analysis error with location tracking.
///
/// # Examples
///
/// ```
/// use storyboard_error::{AnalysisError, AnalysisErrorKind};
///
/// let err = AnalysisError::new(AnalysisErrorKind::EmptyResponse);
/// assert!(format!("{}", err).contains("no content"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Analysis Error: {} at line {} in {}", kind, line, file)]
pub struct AnalysisError {
    /// The specific error condition
    pub kind: AnalysisErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl AnalysisError {
    /// Create a new AnalysisError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: AnalysisErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
