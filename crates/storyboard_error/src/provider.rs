//! Provider transport errors and retry classification.

/// Failure conditions when talking to an upstream AI provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ProviderErrorKind {
    /// HTTP error with status code and message
    #[display("HTTP {} error: {}", status_code, message)]
    HttpStatus {
        /// HTTP status code
        status_code: u16,
        /// Error message
        message: String,
    },
    /// Request never produced a response (DNS, TLS, timeout)
    #[display("Request failed: {}", _0)]
    Transport(String),
    /// Response body did not have the expected shape
    #[display("Invalid provider response: {}", _0)]
    InvalidResponse(String),
    /// Request could not be assembled
    #[display("Failed to build request: {}", _0)]
    Builder(String),
}

impl ProviderErrorKind {
    /// Check if this error type should be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderErrorKind::HttpStatus { status_code, .. } => {
                matches!(*status_code, 408 | 429 | 500 | 502 | 503 | 504)
            }
            ProviderErrorKind::Transport(_) => true,
            _ => false,
        }
    }

    /// Whether the upstream signalled that its rate limit was hit.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ProviderErrorKind::HttpStatus { status_code: 429, .. })
    }

    /// Get retry strategy parameters for this error type.
    ///
    /// Returns `(initial_backoff_ms, max_retries, max_delay_secs)`.
    pub fn retry_strategy_params(&self) -> (u64, usize, u64) {
        match self {
            ProviderErrorKind::HttpStatus { status_code, .. } => match *status_code {
                429 => (5000, 3, 40),
                503 => (2000, 5, 60),
                500 | 502 | 504 => (1000, 3, 8),
                408 => (2000, 4, 30),
                _ => (2000, 5, 60),
            },
            ProviderErrorKind::Transport(_) => (1000, 3, 10),
            _ => (2000, 5, 60),
        }
    }
}

/// Provider error with source location tracking.
///
/// # Examples
///
/// ```
/// use storyboard_error::{ProviderError, ProviderErrorKind, RetryableError};
///
/// let err = ProviderError::new(ProviderErrorKind::HttpStatus {
///     status_code: 429,
///     message: "Resource exhausted".to_string(),
/// });
/// assert!(err.is_retryable());
/// assert!(format!("{}", err).contains("429"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Provider Error: {} at line {} in {}", kind, line, file)]
pub struct ProviderError {
    /// The kind of error that occurred
    pub kind: ProviderErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ProviderError {
    /// Create a new ProviderError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ProviderErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

/// Trait for errors that support retry logic.
///
/// Transient errors like 503 (service unavailable), 429 (rate limit) or
/// network timeouts report `true`. Permanent errors like 400 or 403 report
/// `false` and fail immediately.
pub trait RetryableError {
    /// Returns true if this error should trigger a retry.
    fn is_retryable(&self) -> bool;

    /// Get retry strategy parameters for this error.
    ///
    /// Returns `(initial_backoff_ms, max_retries, max_delay_secs)`.
    fn retry_strategy_params(&self) -> (u64, usize, u64) {
        (2000, 5, 60)
    }
}

impl RetryableError for ProviderError {
    fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    fn retry_strategy_params(&self) -> (u64, usize, u64) {
        self.kind.retry_strategy_params()
    }
}
