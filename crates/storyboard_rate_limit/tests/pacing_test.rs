//! Tests for batch pacing and provider rate limiting.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use storyboard_error::{ProviderError, ProviderErrorKind};
use storyboard_rate_limit::{PacingConfig, Pacer, RateLimiter, RetryOverrides};
use tokio::time::Instant;

#[tokio::test(start_paused = true)]
async fn test_first_scene_is_not_delayed() {
    let pacer = Pacer::default();
    let start = Instant::now();
    pacer.wait_turn(0).await;
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_later_scenes_wait_the_fixed_delay() {
    let pacer = Pacer::default();
    let start = Instant::now();
    pacer.wait_turn(1).await;
    assert!(start.elapsed() >= Duration::from_millis(3000));
}

#[test]
fn test_fixed_pacer_ignores_rate_limiting() {
    let mut pacer = Pacer::from_config(&PacingConfig::default());
    pacer.record_rate_limited();
    assert_eq!(pacer.current_delay(), Duration::from_millis(3000));
}

#[test]
fn test_adaptive_pacer_from_config() {
    let config = PacingConfig {
        inter_request_delay_ms: 1000,
        adaptive: true,
        max_delay_ms: 5000,
    };
    let mut pacer = Pacer::from_config(&config);
    for _ in 0..5 {
        pacer.record_rate_limited();
    }
    assert_eq!(pacer.current_delay(), Duration::from_millis(5000));
    pacer.record_success();
    assert_eq!(pacer.current_delay(), Duration::from_millis(1000));
}

fn status(code: u16) -> ProviderError {
    ProviderError::new(ProviderErrorKind::HttpStatus {
        status_code: code,
        message: "test".to_string(),
    })
}

#[tokio::test(start_paused = true)]
async fn test_execute_retries_transient_errors() {
    let limiter = RateLimiter::new(None, Some(1)).with_overrides(RetryOverrides {
        no_retry: false,
        max_retries: Some(3),
        backoff_ms: Some(10),
    });
    let attempts = Arc::new(AtomicUsize::new(0));

    let result: Result<&str, ProviderError> = limiter
        .execute(|| {
            let attempts = attempts.clone();
            async move {
                if attempts.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(status(503))
                } else {
                    Ok("done")
                }
            }
        })
        .await;

    assert_eq!(result.unwrap(), "done");
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_execute_fails_fast_on_permanent_errors() {
    let limiter = RateLimiter::new(None, None);
    let attempts = Arc::new(AtomicUsize::new(0));

    let result: Result<(), ProviderError> = limiter
        .execute(|| {
            let attempts = attempts.clone();
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(status(400))
            }
        })
        .await;

    assert!(result.is_err());
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_no_retry_override_makes_single_attempt() {
    let limiter = RateLimiter::new(None, None).with_overrides(RetryOverrides {
        no_retry: true,
        ..RetryOverrides::default()
    });
    let attempts = Arc::new(AtomicUsize::new(0));

    let result: Result<(), ProviderError> = limiter
        .execute(|| {
            let attempts = attempts.clone();
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(status(429))
            }
        })
        .await;

    assert!(result.is_err());
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}
