//! Pacing, rate limiting and configuration.
//!
//! - [`Pacer`] spaces out the renders of one batch ([`INTER_REQUEST_DELAY`]
//!   by default, optionally backing off after rate-limited renders).
//! - [`RateLimiter`] guards every provider call with a requests-per-minute
//!   quota, a concurrency limit and retry with exponential backoff.
//! - [`StoryboardConfig`] loads layered TOML configuration.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod limiter;
mod pacer;

pub use config::{PacingConfig, ProviderConfig, StorageConfig, StoryboardConfig};
pub use limiter::{RateLimiter, RateLimiterGuard, RetryOverrides};
pub use pacer::{INTER_REQUEST_DELAY, Pacer};
