//! Batch progress reported by the orchestrator.

use serde::{Deserialize, Serialize};

/// Phase of the batch state machine.
///
/// `Idle → Analyzing → Generating → {Success, Error, Cancelled}`.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum BatchPhase {
    /// No batch has been started
    #[default]
    #[display("idle")]
    Idle,
    /// Script analysis in progress
    #[display("analyzing")]
    Analyzing,
    /// Scenes are being rendered
    #[display("generating")]
    Generating,
    /// Every scene was attempted
    #[display("success")]
    Success,
    /// The control loop halted on an unexpected error
    #[display("error")]
    Error,
    /// The batch was stopped between scenes
    #[display("cancelled")]
    Cancelled,
}

impl BatchPhase {
    /// Whether the batch has finished.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BatchPhase::Success | BatchPhase::Error | BatchPhase::Cancelled
        )
    }
}

/// Snapshot of where the current batch stands.
///
/// # Examples
///
/// ```
/// use storyboard_core::{BatchPhase, BatchProgress};
///
/// let progress = BatchProgress::generating(2, 5);
/// assert_eq!(progress.phase, BatchPhase::Generating);
/// assert_eq!(progress.current_index, Some(2));
/// assert!(!progress.phase.is_terminal());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchProgress {
    /// Current phase
    pub phase: BatchPhase,
    /// 1-based index of the scene being rendered (0 before the first)
    pub current_index: Option<usize>,
    /// Number of scenes in the batch
    pub total_count: Option<usize>,
    /// Human readable status line
    pub message: String,
}

impl BatchProgress {
    /// Initial state.
    pub fn idle() -> Self {
        Self::default()
    }

    /// Script analysis started.
    pub fn analyzing() -> Self {
        Self {
            phase: BatchPhase::Analyzing,
            message: "Analyzing script into scenes".to_string(),
            ..Self::default()
        }
    }

    /// Rendering scene `current` of `total`.
    pub fn generating(current: usize, total: usize) -> Self {
        let message = if current == 0 {
            format!("Preparing {} scenes", total)
        } else {
            format!("Generating scene {} of {}", current, total)
        };
        Self {
            phase: BatchPhase::Generating,
            current_index: Some(current),
            total_count: Some(total),
            message,
        }
    }

    /// All scenes attempted.
    pub fn success(total: usize, failed: usize) -> Self {
        let message = if failed == 0 {
            format!("Generated {} scenes", total)
        } else {
            format!("Generated {} scenes ({} failed)", total, failed)
        };
        Self {
            phase: BatchPhase::Success,
            current_index: Some(total),
            total_count: Some(total),
            message,
        }
    }

    /// Control loop halted.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            phase: BatchPhase::Error,
            message: message.into(),
            ..Self::default()
        }
    }

    /// Batch stopped after `completed` of `total` scenes.
    pub fn cancelled(completed: usize, total: usize) -> Self {
        Self {
            phase: BatchPhase::Cancelled,
            current_index: Some(completed),
            total_count: Some(total),
            message: format!("Cancelled after {} of {} scenes", completed, total),
        }
    }
}
