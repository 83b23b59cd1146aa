//! Linear-backoff retry for remote operations.

use std::time::Duration;

use tracing::warn;

use crate::store::StoreError;

/// Run `op` up to `attempts` times, waiting `base_delay * attempt_number`
/// between failures (1s, 2s, ... for a 1s base). Returns the last error
/// once attempts are exhausted.
///
/// The closure builds a fresh future per attempt, cloning whatever it needs.
pub(crate) async fn retry_linear<T, F, Fut>(
    attempts: u32,
    base_delay: Duration,
    what: &str,
    mut op: F,
) -> Result<T, StoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StoreError>>,
{
    let attempts = attempts.max(1);
    let mut last_error: Option<StoreError> = None;

    for attempt in 1..=attempts {
        match op().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                warn!(%error, attempt, attempts, "{what} attempt failed");
                last_error = Some(error);
                if attempt < attempts {
                    tokio::time::sleep(base_delay * attempt).await;
                }
            }
        }
    }

    Err(last_error
        .unwrap_or_else(|| StoreError::Unreachable(format!("{what}: no attempts made"))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn connectivity() -> StoreError {
        StoreError::Unreachable("test".to_string())
    }

    #[tokio::test]
    async fn test_first_success_skips_backoff() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let result = retry_linear(3, Duration::from_secs(1), "op", move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, StoreError>(42)
            }
        })
        .await;
        assert_eq!(result.expect("success"), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_takes_three_attempts_with_linear_spacing() {
        let started = Instant::now();
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let result: Result<(), _> = retry_linear(3, Duration::from_secs(1), "op", move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(connectivity())
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 1s after attempt 1 plus 2s after attempt 2.
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_on_later_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let result = retry_linear(3, Duration::from_secs(1), "op", move || {
            let counter = Arc::clone(&counter);
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(connectivity())
                } else {
                    Ok("recovered")
                }
            }
        })
        .await;
        assert_eq!(result.expect("third attempt succeeds"), "recovered");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
