//! Inter-request pacing for the scenes of one batch.

use crate::PacingConfig;
use std::time::Duration;
use tracing::debug;

/// Delay between two consecutive scene renders of one batch.
///
/// Keeps a batch under the upstream image provider's rate limit.
pub const INTER_REQUEST_DELAY: Duration = Duration::from_millis(3000);

/// Spaces out the renders of a batch.
///
/// The first scene is rendered immediately; every later scene waits the
/// current delay. With adaptive pacing enabled, a rate-limited render doubles
/// the delay (capped at `max_delay`) and a successful render restores the
/// base delay. Without it the delay never changes.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use storyboard_rate_limit::Pacer;
///
/// let mut pacer = Pacer::adaptive(Duration::from_secs(1), Duration::from_secs(3));
/// pacer.record_rate_limited();
/// assert_eq!(pacer.current_delay(), Duration::from_secs(2));
/// pacer.record_rate_limited();
/// assert_eq!(pacer.current_delay(), Duration::from_secs(3));
/// pacer.record_success();
/// assert_eq!(pacer.current_delay(), Duration::from_secs(1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pacer {
    base: Duration,
    current: Duration,
    max: Duration,
    adaptive: bool,
}

impl Pacer {
    /// A pacer that always waits `delay`.
    pub fn fixed(delay: Duration) -> Self {
        Self {
            base: delay,
            current: delay,
            max: delay,
            adaptive: false,
        }
    }

    /// A pacer that backs off on rate limiting, never beyond `max`.
    pub fn adaptive(base: Duration, max: Duration) -> Self {
        Self {
            base,
            current: base,
            max: max.max(base),
            adaptive: true,
        }
    }

    /// Build a pacer from configuration.
    pub fn from_config(config: &PacingConfig) -> Self {
        let base = Duration::from_millis(config.inter_request_delay_ms);
        if config.adaptive {
            Self::adaptive(base, Duration::from_millis(config.max_delay_ms))
        } else {
            Self::fixed(base)
        }
    }

    /// Delay that will be applied before the next render.
    pub fn current_delay(&self) -> Duration {
        self.current
    }

    /// Wait before rendering the scene at zero-based `position`.
    pub async fn wait_turn(&self, position: usize) {
        if position == 0 || self.current.is_zero() {
            return;
        }
        debug!(
            position,
            delay_ms = self.current.as_millis() as u64,
            "Pacing before next render"
        );
        tokio::time::sleep(self.current).await;
    }

    /// A render succeeded.
    pub fn record_success(&mut self) {
        if self.adaptive {
            self.current = self.base;
        }
    }

    /// A render was rejected by upstream rate limiting.
    pub fn record_rate_limited(&mut self) {
        if !self.adaptive {
            return;
        }
        let doubled = self
            .current
            .max(Duration::from_millis(1))
            .saturating_mul(2);
        self.current = doubled.min(self.max);
        debug!(
            delay_ms = self.current.as_millis() as u64,
            "Backing off after rate-limited render"
        );
    }
}

impl Default for Pacer {
    fn default() -> Self {
        Self::fixed(INTER_REQUEST_DELAY)
    }
}
