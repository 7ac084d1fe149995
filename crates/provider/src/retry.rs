// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exponential-backoff retry combinator

use std::future::Future;
use std::time::Duration;

/// Retry schedule: `attempts` total calls, sleeping `base * multiplier^i`
/// between them (i = zero-based attempt index).
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub base: Duration,
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    /// Four calls total, waiting 1 s, 2 s, 4 s between them.
    fn default() -> Self {
        Self {
            attempts: 4,
            base: Duration::from_secs(1),
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt_index + 1`, saturating on overflow.
    pub fn delay(&self, attempt_index: u32) -> Duration {
        self.base
            .checked_mul(self.multiplier.saturating_pow(attempt_index))
            .unwrap_or(Duration::MAX)
    }
}

/// Invoke `op` until it succeeds, the policy is exhausted, or an error fails
/// the `should_retry` predicate. Returns the first success or the last error.
pub async fn retry_if<T, E, F, Fut, P>(policy: RetryPolicy, should_retry: P, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
{
    let mut attempt = 0u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                attempt += 1;
                if attempt >= policy.attempts || !should_retry(&err) {
                    return Err(err);
                }
                tokio::time::sleep(policy.delay(attempt - 1)).await;
            }
        }
    }
}

/// [`retry_if`] with an always-true predicate.
pub async fn retry_all<T, E, F, Fut>(policy: RetryPolicy, op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    retry_if(policy, |_| true, op).await
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
