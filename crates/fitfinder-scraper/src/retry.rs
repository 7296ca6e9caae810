//! Transport-level retry for retailer HTTP requests.
//!
//! Sits below the adapter's single query-simplification retry: it repeats the
//! same request and never changes the search term.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

/// Longest sleep between two attempts, whatever the retailer asks for.
pub(crate) const MAX_DELAY: Duration = Duration::from_secs(30);

/// How often and how patiently one request is repeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RetryPolicy {
    /// Extra attempts after the first one.
    pub max_retries: u32,
    pub backoff_base: Duration,
}

impl RetryPolicy {
    pub(crate) fn new(max_retries: u32, backoff_base_secs: u64) -> Self {
        Self {
            max_retries,
            backoff_base: Duration::from_secs(backoff_base_secs),
        }
    }

    /// Sleep before retry number `attempt + 1`.
    ///
    /// Exponential in `attempt`, raised to the retailer's `Retry-After` when
    /// that is longer, and capped at [`MAX_DELAY`].
    pub(crate) fn delay(&self, attempt: u32, err: &ScraperError) -> Duration {
        let backoff = self
            .backoff_base
            .saturating_mul(1u32.checked_shl(attempt).unwrap_or(u32::MAX));
        let hinted = match err {
            ScraperError::RateLimited {
                retry_after_secs: Some(secs),
                ..
            } => Duration::from_secs(*secs),
            _ => Duration::ZERO,
        };
        backoff.max(hinted).min(MAX_DELAY)
    }

    /// Runs `operation` until it succeeds, fails with a permanent error, or
    /// the retry budget is spent. The last error is returned.
    pub(crate) async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T, ScraperError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ScraperError>>,
    {
        let mut attempt = 0u32;
        loop {
            let err = match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if !is_transient(&err) || attempt >= self.max_retries => return Err(err),
                Err(err) => err,
            };

            let delay = self.delay(attempt, &err);
            tracing::warn!(
                attempt,
                max_retries = self.max_retries,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %err,
                "transient retailer error, retrying"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

/// 429, gateway errors, and network failures. A 404, a 500, or a body that
/// does not parse will look the same on the next attempt.
fn is_transient(err: &ScraperError) -> bool {
    match err {
        ScraperError::RateLimited { .. } | ScraperError::Http(_) => true,
        ScraperError::UnexpectedStatus { status, .. } => matches!(status, 502..=504),
        _ => false,
    }
}
