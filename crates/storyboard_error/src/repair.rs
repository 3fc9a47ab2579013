//! Prompt repair error types.

/// Prompt repair error with source location.
///
/// Never reaches the orchestrator: repair implementations log it and fall
/// back to the original prompt.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Repair Error: {} at line {} in {}", message, line, file)]
pub struct RepairError {
    /// Error message
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl RepairError {
    /// Create a new RepairError with the given message at the current location.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
