//! Bounded retry with exponential backoff.

use std::future::Future;

use raidnight_core::FetchError;
use tracing::{debug, warn};

use crate::config::RetryPolicy;
use crate::error::WclError;

/// Run `op` until it succeeds, fails permanently, or the policy's retry
/// budget is spent.
///
/// Retryable failures that exhaust the budget surface as
/// `FetchError::Transient` carrying the attempt count; anything else is
/// `FetchError::Permanent` on first occurrence.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    resource: &str,
    mut op: F,
) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, WclError>>,
{
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        let err = match op().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !policy.is_retryable(&err) {
            debug!(resource, attempt, error = %err, "request failed permanently");
            return Err(FetchError::permanent(resource, err.to_string()));
        }
        if attempt > policy.max_retries {
            warn!(resource, attempts = attempt, error = %err, "retry budget exhausted");
            return Err(FetchError::transient(resource, attempt, err.to_string()));
        }

        let delay = policy.delay_for(attempt);
        debug!(
            resource,
            attempt,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "retrying request"
        );
        tokio::time::sleep(delay).await;
    }
}
