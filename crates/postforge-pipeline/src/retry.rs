//! Retry with exponential back-off and jitter for stage attempts.
//!
//! [`retry_with_backoff`] wraps one stage's fallible async call and retries
//! on transient errors only. `Upstream` and `SchemaInvalid` indicate a
//! non-transient defect and are returned immediately, so a run can never
//! loop on a broken payload.

use std::future::Future;
use std::time::Duration;

use crate::error::StageError;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:** [`StageError::Timeout`], [`StageError::RateLimited`].
///
/// **Not retriable (hard stop):** [`StageError::Upstream`] and
/// [`StageError::SchemaInvalid`].
pub(crate) fn is_retriable(err: &StageError) -> bool {
    matches!(
        err,
        StageError::Timeout(_) | StageError::RateLimited { .. }
    )
}

/// Runs `operation` with up to `max_retries` additional attempts on
/// transient errors.
///
/// Back-off schedule with `backoff_base_ms = 500`: 500 ms × 2⁰, × 2¹, × 2²,
/// … each ±25% jitter, capped at 60 s. With `max_retries = 2` the operation
/// runs at most 3 times, so total run time stays bounded by
/// `(max_retries + 1) × call timeout` plus the back-off sleeps.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, StageError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StageError>>,
{
    const MAX_DELAY_MS: u64 = 60_000;
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient stage error; retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
