//! Retry logic with exponential backoff
//!
//! Image requests are single-attempt by default. When `retry.max_attempts` is
//! raised in the configuration, transient failures (timeouts, connection
//! failures, 5xx and 429 responses) are retried with exponential backoff and
//! optional jitter.
//!
//! # Example
//!
//! ```no_run
//! use franchise_logo_dl::config::RetryConfig;
//! use franchise_logo_dl::error::FetchError;
//! use franchise_logo_dl::retry::with_retry;
//!
//! # async fn example() -> Result<(), FetchError> {
//! let config = RetryConfig { max_attempts: 2, ..Default::default() };
//! let body = with_retry(&config, || async {
//!     // A timeout is transient, so this runs three times before giving up
//!     Err::<Vec<u8>, _>(FetchError::Timeout { url: "https://cdn.example/a.png".into() })
//! })
//! .await?;
//! # let _ = body;
//! # Ok(())
//! # }
//! ```

use crate::config::RetryConfig;
use crate::error::FetchError;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Trait for errors that can be classified as retryable or not
///
/// Transient failures (timeouts, connection refused, server busy) return `true`.
/// Permanent failures (not found, forbidden, disk full) return `false`.
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation should be retried
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for FetchError {
    fn is_retryable(&self) -> bool {
        match self {
            FetchError::Timeout { .. } => true,
            FetchError::Transport { connect, .. } => *connect,
            FetchError::Status { status, .. } => *status == 429 || (500..=599).contains(status),
            FetchError::EmptyBody { .. } => false,
        }
    }
}

/// Execute an async operation with exponential backoff retry logic
///
/// `config.max_attempts` is the number of retries after the first attempt, so
/// the default configuration runs the operation exactly once.
pub async fn with_retry<F, Fut, T, E>(config: &RetryConfig, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: IsRetryable + std::fmt::Display,
{
    let mut attempt = 0;
    let mut delay = config.initial_delay;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    tracing::info!(attempts = attempt + 1, "Operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) if e.is_retryable() && attempt < config.max_attempts => {
                attempt += 1;

                tracing::warn!(
                    error = %e,
                    attempt = attempt,
                    max_attempts = config.max_attempts,
                    delay_ms = delay.as_millis(),
                    "Operation failed, retrying"
                );

                let jittered_delay = if config.jitter {
                    add_jitter(delay)
                } else {
                    delay
                };
                tokio::time::sleep(jittered_delay).await;

                let next_delay =
                    Duration::from_secs_f64(delay.as_secs_f64() * config.backoff_multiplier);
                delay = next_delay.min(config.max_delay);
            }
            Err(e) => {
                if attempt > 0 {
                    tracing::debug!(
                        error = %e,
                        attempts = attempt + 1,
                        "Operation failed after all retry attempts exhausted"
                    );
                }
                return Err(e);
            }
        }
    }
}

/// Add random jitter to a delay
///
/// The result lies between `delay` and `2 * delay`.
fn add_jitter(delay: Duration) -> Duration {
    let mut rng = rand::thread_rng();
    let jitter_factor: f64 = rng.gen_range(0.0..=1.0);
    Duration::from_secs_f64(delay.as_secs_f64() * (1.0 + jitter_factor))
}
