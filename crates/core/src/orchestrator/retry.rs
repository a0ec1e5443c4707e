//! Linear backoff retry for the non-streaming image stage.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Run `op` up to `attempts` times (at least once). Attempt `n` (1-based)
/// that fails waits `base_delay * n` before the next one. Returns the last
/// error when every attempt fails.
pub async fn retry_with_backoff<T, E, F, Fut>(
    attempts: u32,
    base_delay: Duration,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < attempts => {
                tracing::warn!(attempt, max = attempts, error = %e, "attempt failed, retrying");
                tokio::time::sleep(base_delay * attempt).await;
                attempt += 1;
            }
            Err(e) => {
                tracing::warn!(attempt, error = %e, "all attempts failed");
                return Err(e);
            }
        }
    }
}
