//! Top-level error wrapper types.

use crate::{
    AnalysisError, ConfigError, HttpError, ImageError, OrchestratorError, ProviderError,
    RenderError, RepairError, StorageError,
};

/// Every error family the workspace can produce.
///
/// # Examples
///
/// ```
/// use storyboard_error::{StoryboardError, HttpError};
///
/// let http_err = HttpError::new("Connection failed");
/// let err: StoryboardError = http_err.into();
/// assert!(format!("{}", err).contains("HTTP Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum StoryboardErrorKind {
    /// HTTP error
    #[from(HttpError)]
    Http(HttpError),
    /// Configuration error (including missing credentials)
    #[from(ConfigError)]
    Config(ConfigError),
    /// History persistence error
    #[from(StorageError)]
    Storage(StorageError),
    /// Malformed image payload
    #[from(ImageError)]
    Image(ImageError),
    /// Upstream provider error
    #[from(ProviderError)]
    Provider(ProviderError),
    /// Scene analysis error
    #[from(AnalysisError)]
    Analysis(AnalysisError),
    /// Scene render error
    #[from(RenderError)]
    Render(RenderError),
    /// Prompt repair error
    #[from(RepairError)]
    Repair(RepairError),
    /// Orchestrator control-flow error
    #[from(OrchestratorError)]
    Orchestrator(OrchestratorError),
}

/// Storyboard error with kind discrimination.
///
/// # Examples
///
/// ```
/// use storyboard_error::{StoryboardError, StoryboardResult, ConfigError};
///
/// fn might_fail() -> StoryboardResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Storyboard Error: {}", _0)]
pub struct StoryboardError(Box<StoryboardErrorKind>);

impl StoryboardError {
    /// Create a new error from a kind.
    pub fn new(kind: StoryboardErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &StoryboardErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to StoryboardErrorKind
impl<T> From<T> for StoryboardError
where
    T: Into<StoryboardErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Storyboard operations.
pub type StoryboardResult<T> = std::result::Result<T, StoryboardError>;
