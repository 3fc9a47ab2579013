//! Request rate limiter built on governor and a Tokio semaphore.
//!
//! Every provider call goes through [`RateLimiter::execute`], which waits for
//! request-per-minute quota, holds a concurrency slot for the duration of the
//! call, and retries transient failures with exponential backoff.

use crate::ProviderConfig;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as GovernorRateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use storyboard_error::RetryableError;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_retry2::strategy::{ExponentialBackoff, jitter};
use tokio_retry2::{Retry, RetryError};
use tracing::{info, warn};

type DirectRateLimiter = GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Caller overrides for the error-derived retry strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryOverrides {
    /// Disable retries entirely
    pub no_retry: bool,
    /// Replace the retry count
    pub max_retries: Option<usize>,
    /// Replace the initial backoff in milliseconds
    pub backoff_ms: Option<u64>,
}

/// Rate limiter shared by all calls of one provider client.
///
/// # Example
///
/// ```rust,ignore
/// let limiter = RateLimiter::new(Some(10), Some(1));
/// let text = limiter.execute(|| async { client.call().await }).await?;
/// ```
#[derive(Clone)]
pub struct RateLimiter {
    rpm_limiter: Option<Arc<DirectRateLimiter>>,
    concurrent_semaphore: Arc<Semaphore>,
    overrides: RetryOverrides,
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("rpm_limited", &self.rpm_limiter.is_some())
            .field(
                "available_slots",
                &self.concurrent_semaphore.available_permits(),
            )
            .field("overrides", &self.overrides)
            .finish()
    }
}

impl RateLimiter {
    /// Create a limiter. `None` means unlimited.
    pub fn new(rpm: Option<u32>, max_concurrent: Option<u32>) -> Self {
        let rpm_limiter = rpm.and_then(|rpm| {
            NonZeroU32::new(rpm).map(|n| Arc::new(GovernorRateLimiter::direct(Quota::per_minute(n))))
        });

        let max_concurrent = max_concurrent
            .filter(|n| *n > 0)
            .map(|n| n as usize)
            .unwrap_or(Semaphore::MAX_PERMITS);

        Self {
            rpm_limiter,
            concurrent_semaphore: Arc::new(Semaphore::new(max_concurrent)),
            overrides: RetryOverrides::default(),
        }
    }

    /// Create a limiter from provider configuration.
    pub fn from_config(config: &ProviderConfig) -> Self {
        Self::new(config.rpm, config.max_concurrent).with_overrides(RetryOverrides {
            no_retry: false,
            max_retries: config.max_retries,
            backoff_ms: config.retry_backoff_ms,
        })
    }

    /// Replace the retry overrides.
    pub fn with_overrides(mut self, overrides: RetryOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Wait for quota and a concurrency slot.
    ///
    /// The returned guard releases the slot when dropped.
    pub async fn acquire(&self) -> RateLimiterGuard {
        if let Some(limiter) = &self.rpm_limiter {
            limiter.until_ready().await;
        }

        // The semaphore is owned by this limiter and never closed.
        let permit = self.concurrent_semaphore.clone().acquire_owned().await.ok();

        RateLimiterGuard { _permit: permit }
    }

    /// Run `operation` under rate limiting, retrying transient failures.
    ///
    /// The first attempt decides the retry strategy: a permanent error fails
    /// immediately, a transient one is retried with the backoff parameters
    /// its kind recommends (subject to the configured overrides).
    pub async fn execute<F, Fut, R, E>(&self, operation: F) -> Result<R, E>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<R, E>>,
        E: RetryableError + std::fmt::Display,
    {
        let first = {
            let _guard = self.acquire().await;
            operation().await
        };

        let err = match first {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        if self.overrides.no_retry || !err.is_retryable() {
            warn!(error = %err, "Permanent error, failing immediately");
            return Err(err);
        }

        let (mut initial_ms, mut max_retries, max_delay_secs) = err.retry_strategy_params();
        if let Some(backoff) = self.overrides.backoff_ms {
            initial_ms = backoff;
        }
        if let Some(retries) = self.overrides.max_retries {
            max_retries = retries;
        }

        info!(
            error = %err,
            initial_backoff_ms = initial_ms,
            max_retries,
            max_delay_secs,
            "Transient error, will retry with backoff"
        );

        let retry_strategy = ExponentialBackoff::from_millis(initial_ms)
            .factor(2)
            .max_delay(Duration::from_secs(max_delay_secs))
            .map(jitter)
            .take(max_retries);

        Retry::spawn(retry_strategy, || async {
            let _guard = self.acquire().await;

            match operation().await {
                Ok(value) => Ok(value),
                Err(e) => {
                    if e.is_retryable() {
                        warn!("Transient error, will retry: {}", e);
                        Err(RetryError::Transient {
                            err: e,
                            retry_after: None,
                        })
                    } else {
                        warn!("Permanent error, failing immediately: {}", e);
                        Err(RetryError::Permanent(e))
                    }
                }
            }
        })
        .await
    }
}

/// RAII guard for the limiter's concurrency slot.
pub struct RateLimiterGuard {
    _permit: Option<OwnedSemaphorePermit>,
}
