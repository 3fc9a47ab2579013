//! Events published to subscribers of the orchestrator.

use crate::{BatchProgress, GenerationResult};

/// Something the presentation layer may want to react to.
#[derive(Debug, Clone, PartialEq, derive_more::From)]
pub enum BatchEvent {
    /// The batch state machine moved
    Progress(BatchProgress),
    /// A scene of the running batch finished its first render attempt
    Result(GenerationResult),
    /// An existing result was changed by a retry
    #[from(skip)]
    Updated(GenerationResult),
    /// A result was deleted
    #[from(skip)]
    Removed(String),
    /// Transient, user-facing notice (for example a failed retry)
    #[from(skip)]
    Notice(String),
}
