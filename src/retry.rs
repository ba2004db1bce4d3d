//! Bounded retries and per-call timeouts for remote site calls.
//!
//! Only [`SiteError::Transient`] failures are retried. Backoff is a fixed
//! exponential formula without jitter so tests can reason about timings.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::platform::SiteError;

/// How often, and how patiently, a transient failure is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
  /// Total attempts including the first one. `1` disables retries.
  pub max_attempts: u32,
  /// Delay before the second attempt; doubled for every further attempt.
  pub base_delay: Duration,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self {
      max_attempts: 3,
      base_delay: Duration::from_millis(250),
    }
  }
}

impl RetryPolicy {
  /// A policy that never retries.
  pub fn no_retry() -> Self {
    Self {
      max_attempts: 1,
      base_delay: Duration::ZERO,
    }
  }

  /// Delay before the given retry (1-indexed: `1` is the first retry).
  pub fn delay_for(&self, retry: u32) -> Duration {
    let multiplier = 1u32.checked_shl(retry.saturating_sub(1)).unwrap_or(u32::MAX);
    self.base_delay.saturating_mul(multiplier)
  }
}

/// Timeout and retry settings applied to every remote call of one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSettings {
  pub timeout: Duration,
  pub retry: RetryPolicy,
}

impl Default for CallSettings {
  fn default() -> Self {
    Self {
      timeout: Duration::from_secs(30),
      retry: RetryPolicy::default(),
    }
  }
}

/// Why a remote call ultimately failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallError {
  /// The call did not complete within [`CallSettings::timeout`].
  Timeout { operation: String, seconds: u64 },
  /// The call failed; transient failures only end up here once retries are
  /// exhausted.
  Site(SiteError),
}

/// Run `call` under the timeout, retrying transient failures with backoff.
///
/// # Arguments
/// * `settings` - Timeout and retry policy.
/// * `operation` - Short description used in logs and timeout errors.
/// * `call` - Produces a fresh future for every attempt.
///
/// # Errors
/// Returns [`CallError::Timeout`] when an attempt exceeds the timeout and
/// [`CallError::Site`] with the last failure otherwise.
pub async fn call_with_retry<T, F, Fut>(settings: &CallSettings, operation: &str, mut call: F) -> Result<T, CallError>
where
  F: FnMut() -> Fut,
  Fut: Future<Output = Result<T, SiteError>>,
{
  let max_attempts = settings.retry.max_attempts.max(1);
  let mut attempt = 1;

  loop {
    let outcome = tokio::time::timeout(settings.timeout, call()).await;

    let error = match outcome {
      Ok(Ok(value)) => return Ok(value),
      Ok(Err(error)) => error,
      Err(_) => {
        warn!("{operation} timed out after {:?}", settings.timeout);
        return Err(CallError::Timeout {
          operation: operation.to_string(),
          seconds: settings.timeout.as_secs(),
        });
      }
    };

    if !error.is_transient() || attempt >= max_attempts {
      return Err(CallError::Site(error));
    }

    let delay = settings.retry.delay_for(attempt);
    debug!("{operation} failed (attempt {attempt}/{max_attempts}): {error}; retrying in {delay:?}");
    tokio::time::sleep(delay).await;
    attempt += 1;
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicU32, Ordering};

  use super::*;

  fn fast_settings(max_attempts: u32) -> CallSettings {
    CallSettings {
      timeout: Duration::from_millis(200),
      retry: RetryPolicy {
        max_attempts,
        base_delay: Duration::from_millis(1),
      },
    }
  }

  #[test]
  fn test_delay_doubles() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.delay_for(1), Duration::from_millis(250));
    assert_eq!(policy.delay_for(2), Duration::from_millis(500));
    assert_eq!(policy.delay_for(3), Duration::from_millis(1000));
  }

  #[tokio::test]
  async fn test_transient_failure_is_retried() {
    let attempts = AtomicU32::new(0);
    let result = call_with_retry(&fast_settings(3), "get page", || {
      let n = attempts.fetch_add(1, Ordering::SeqCst);
      async move {
        if n < 2 {
          Err(SiteError::Transient("503".into()))
        } else {
          Ok(n)
        }
      }
    })
    .await;

    assert_eq!(result, Ok(2));
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
  }

  #[tokio::test]
  async fn test_permanent_failure_is_not_retried() {
    let attempts = AtomicU32::new(0);
    let result: Result<(), _> = call_with_retry(&fast_settings(3), "get page", || {
      attempts.fetch_add(1, Ordering::SeqCst);
      async { Err(SiteError::NotFound("x".into())) }
    })
    .await;

    assert_eq!(result, Err(CallError::Site(SiteError::NotFound("x".into()))));
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_exhausted_retries_return_last_error() {
    let attempts = AtomicU32::new(0);
    let result: Result<(), _> = call_with_retry(&fast_settings(2), "save page", || {
      attempts.fetch_add(1, Ordering::SeqCst);
      async { Err(SiteError::Transient("reset".into())) }
    })
    .await;

    assert_eq!(result, Err(CallError::Site(SiteError::Transient("reset".into()))));
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn test_timeout() {
    let result: Result<(), _> = call_with_retry(&fast_settings(3), "get page", || async {
      tokio::time::sleep(Duration::from_secs(5)).await;
      Ok(())
    })
    .await;

    assert!(matches!(result, Err(CallError::Timeout { ref operation, .. }) if operation == "get page"));
  }
}
