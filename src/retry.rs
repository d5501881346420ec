/*!
 * Bounded fixed-delay retry utility.
 *
 * Infrastructure-level retry, distinct from model-tier fallback: callers pick
 * an attempt bound and a fixed delay, and the operation is re-run until it
 * succeeds or the bound is exhausted.
 */

use std::future::Future;
use std::time::Duration;

use log::warn;

/// Run `operation` up to `attempts` times, sleeping `delay` between attempts.
///
/// Returns the first success, or the last error once attempts are exhausted.
/// `attempts` of 0 is treated as 1.
pub async fn retry_fixed<T, E, F, Fut>(
    attempts: u32,
    delay: Duration,
    description: &str,
    mut operation: F,
) -> Result<T, E>
where
    E: std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                warn!("{} failed (attempt {}/{}): {}", description, attempt, attempts, e);
                if attempt >= attempts {
                    return Err(e);
                }
            }
        }

        attempt += 1;
        tokio::time::sleep(delay).await;
    }
}
