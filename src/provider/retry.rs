use std::future::Future;

use tracing::warn;

use crate::error::ChatError;

/// Runs `operation` up to `max_attempts` times, repeating only transient failures.
///
/// A failure that carries an HTTP status is returned immediately. `max_attempts`
/// below one is treated as one.
pub(crate) async fn with_transient_retry<T, F, Fut>(
    max_attempts: u32,
    mut operation: F,
) -> Result<T, ChatError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ChatError>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match operation().await {
            Err(err) if err.is_transient() && attempt < max_attempts => {
                warn!(attempt, max_attempts, error = %err, "transient failure, retrying");
                attempt += 1;
            }
            result => return result,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::error::TransportError;

    #[tokio::test]
    async fn retries_transient_failure_once() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = with_transient_retry(2, move || async move {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(ChatError::transport("test", TransportError::new("reset")))
            } else {
                Ok("done")
            }
        })
        .await;
        assert_eq!(result.expect("second attempt"), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), _> = with_transient_retry(2, move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ChatError::transport("test", TransportError::new("timeout")))
        })
        .await;
        assert!(result.expect_err("exhausted").is_transient());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn status_errors_are_not_retried() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), _> = with_transient_retry(3, move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ChatError::provider("test", 500, "boom"))
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
