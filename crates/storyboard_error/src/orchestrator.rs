//! Batch orchestration error types.

/// Control-flow failures of the batch orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum OrchestratorErrorKind {
    /// No live or stored result carries this id
    #[display("No result with id '{}'", _0)]
    ResultNotFound(String),
    /// Retry was rejected because the render failed
    #[display("Retry of '{}' failed: {}", id, message)]
    RetryFailed {
        /// Result id
        id: String,
        /// Render failure message
        message: String,
    },
}

/// Orchestrator error with location tracking.
///
/// # Examples
///
/// ```
/// use storyboard_error::{OrchestratorError, OrchestratorErrorKind};
///
/// let err = OrchestratorError::new(OrchestratorErrorKind::ResultNotFound("batch1-2".into()));
/// assert!(format!("{}", err).contains("batch1-2"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Orchestrator Error: {} at line {} in {}", kind, line, file)]
pub struct OrchestratorError {
    /// The specific error condition
    pub kind: OrchestratorErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl OrchestratorError {
    /// Create a new OrchestratorError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: OrchestratorErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
