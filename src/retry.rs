//! Bounded retry with exponential backoff.
//!
//! [`retry`] drives an attempt function until it succeeds, the retry budget
//! runs out, or the attempt bails out with [`Attempt::Bail`]. Attempts run
//! strictly one after another; the next one starts only after the previous
//! one settled and the backoff delay elapsed.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;

/// Backoff and budget for one [`retry`] invocation.
#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of retries after the initial attempt.
    pub retries: usize,
    /// Exponential growth factor applied per retry.
    pub factor: f64,
    /// Delay before the first retry in milliseconds.
    pub min_timeout_ms: u64,
    /// Upper bound for any single delay. `None` means unbounded.
    pub max_timeout_ms: Option<u64>,
    /// Multiplies each delay by a random value in `[1, 2)`.
    pub randomize: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 2,
            factor: 2.0,
            min_timeout_ms: 1_000,
            max_timeout_ms: None,
            randomize: false,
        }
    }
}

impl RetryPolicy {
    /// Default backoff with a custom retry budget.
    pub fn new(retries: usize) -> Self {
        Self {
            retries,
            ..Self::default()
        }
    }

    /// Single attempt, never retried.
    pub fn no_retry() -> Self {
        Self::new(0)
    }

    pub fn with_min_timeout_ms(mut self, min_timeout_ms: u64) -> Self {
        self.min_timeout_ms = min_timeout_ms;
        self
    }

    pub fn with_max_timeout_ms(mut self, max_timeout_ms: u64) -> Self {
        self.max_timeout_ms = Some(max_timeout_ms);
        self
    }

    pub fn with_factor(mut self, factor: f64) -> Self {
        self.factor = factor;
        self
    }

    pub fn randomized(mut self) -> Self {
        self.randomize = true;
        self
    }

    /// Delay before retry number `retry_index` (0 for the first retry).
    pub fn delay_for(&self, retry_index: usize) -> Duration {
        let exp = retry_index.min(32) as i32;
        let random = if self.randomize {
            rand::thread_rng().gen_range(1.0..2.0)
        } else {
            1.0
        };
        let delay_ms = (self.min_timeout_ms as f64 * self.factor.powi(exp) * random).round();
        // f64 -> u64 casts saturate, NaN becomes zero.
        let delay_ms = delay_ms as u64;
        let delay_ms = match self.max_timeout_ms {
            Some(max) => delay_ms.min(max),
            None => delay_ms,
        };
        Duration::from_millis(delay_ms)
    }
}

/// Failure of a single attempt.
#[derive(Debug)]
pub enum Attempt<E> {
    /// Counts against the budget; the attempt is scheduled again if any is left.
    Retry(E),
    /// Stops immediately with this error.
    Bail(E),
    /// Stops immediately with a generic [`Aborted`] error.
    Abort,
}

impl<E> From<E> for Attempt<E> {
    fn from(err: E) -> Self {
        Self::Retry(err)
    }
}

/// Error produced by [`Attempt::Abort`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Aborted;

impl fmt::Display for Aborted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("aborted")
    }
}

impl std::error::Error for Aborted {}

/// Runs `attempt` until it succeeds, bails, or `policy.retries` retries
/// have failed.
///
/// `attempt` receives the attempt number, starting at 1. When the budget is
/// exhausted the error of the last attempt is returned.
///
/// # Example
///
/// ```no_run
/// use doxie_http::retry::{retry, Attempt, RetryPolicy};
///
/// # async fn run() -> Result<u32, doxie_http::DoxieError> {
/// retry(&RetryPolicy::new(2), |attempt| async move {
///     if attempt < 3 {
///         return Err(Attempt::Retry(doxie_http::DoxieError::Aborted));
///     }
///     Ok(attempt as u32)
/// })
/// .await
/// # }
/// ```
pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy, mut attempt: F) -> Result<T, E>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<T, Attempt<E>>>,
    E: From<Aborted> + fmt::Display,
{
    let mut number = 1usize;
    loop {
        match attempt(number).await {
            Ok(value) => return Ok(value),
            Err(Attempt::Bail(err)) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(attempt = number, error = %err, "attempt bailed, not retrying");
                return Err(err);
            }
            Err(Attempt::Abort) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(attempt = number, "attempt aborted, not retrying");
                return Err(E::from(Aborted));
            }
            Err(Attempt::Retry(err)) => {
                if number > policy.retries {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(attempts = number, error = %err, "retry budget exhausted");
                    return Err(err);
                }

                let delay = policy.delay_for(number - 1);

                #[cfg(feature = "tracing")]
                tracing::debug!(
                    attempt = number,
                    error = %err,
                    "retrying after {} ms",
                    delay.as_millis()
                );

                sleep(delay).await;
                number += 1;
            }
        }
    }
}
