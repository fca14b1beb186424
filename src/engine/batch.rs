//! Bounded-concurrency helpers shared by the scan pipeline.

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use tracing::debug;

use crate::types::ProspectorError;

/// Runs `f` over `items` in chunks of `batch_size`, awaiting every
/// future in a chunk concurrently before moving to the next chunk.
///
/// Each item's outcome is isolated: one failure does not abort its
/// batch or the remaining items. Output order matches input order.
pub async fn run_batched<T, R, F, Fut>(
    items: Vec<T>,
    batch_size: usize,
    f: F,
) -> Vec<Result<R>>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<R>>,
{
    let batch_size = batch_size.max(1);
    let total = items.len();
    let mut results = Vec::with_capacity(total);

    let mut remaining = items;
    while !remaining.is_empty() {
        let take = batch_size.min(remaining.len());
        let chunk: Vec<T> = remaining.drain(..take).collect();
        debug!(batch = chunk.len(), done = results.len(), total, "running batch");
        let futures: Vec<Fut> = chunk.into_iter().map(&f).collect();
        results.extend(futures::future::join_all(futures).await);
    }

    results
}

/// Polls `f` at a fixed `interval` until it yields `Some`, giving up
/// with [`ProspectorError::Timeout`] once `timeout` has elapsed.
///
/// Used where an upstream indexer lags behind chain state and a
/// just-seen signature is not yet queryable.
pub async fn poll_until<R, F, Fut>(
    what: &str,
    interval: Duration,
    timeout: Duration,
    mut f: F,
) -> Result<R, ProspectorError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<R>>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if let Some(value) = f().await {
            return Ok(value);
        }
        if tokio::time::Instant::now() + interval > deadline {
            return Err(ProspectorError::Timeout {
                what: what.to_string(),
                secs: timeout.as_secs(),
            });
        }
        tokio::time::sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_run_batched_preserves_order() {
        let items: Vec<u32> = (0..13).collect();
        let results = run_batched(items, 5, |n| async move { Ok(n * 2) }).await;
        assert_eq!(results.len(), 13);
        for (i, r) in results.iter().enumerate() {
            assert_eq!(*r.as_ref().unwrap(), (i as u32) * 2);
        }
    }

    #[tokio::test]
    async fn test_run_batched_isolates_failures() {
        let items = vec![1u32, 2, 3, 4, 5, 6];
        let results = run_batched(items, 2, |n| async move {
            if n % 3 == 0 {
                anyhow::bail!("item {n} failed");
            }
            Ok(n)
        })
        .await;
        assert_eq!(results.len(), 6);
        assert!(results[2].is_err());
        assert!(results[5].is_err());
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 4);
    }

    #[tokio::test]
    async fn test_run_batched_empty_input() {
        let results: Vec<Result<u32>> =
            run_batched(Vec::<u32>::new(), 5, |n| async move { Ok(n) }).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_run_batched_zero_batch_size_treated_as_one() {
        let results = run_batched(vec![1u32, 2], 0, |n| async move { Ok(n) }).await;
        assert_eq!(results.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_until_succeeds_after_retries() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls2 = calls.clone();
        let result = poll_until(
            "indexing",
            Duration::from_millis(100),
            Duration::from_secs(5),
            move || {
                let calls = calls2.clone();
                async move {
                    if calls.fetch_add(1, Ordering::SeqCst) >= 2 {
                        Some(42u32)
                    } else {
                        None
                    }
                }
            },
        )
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_until_times_out() {
        let result: Result<u32, ProspectorError> = poll_until(
            "never ready",
            Duration::from_millis(200),
            Duration::from_secs(1),
            || async { None },
        )
        .await;
        match result {
            Err(ProspectorError::Timeout { what, secs }) => {
                assert_eq!(what, "never ready");
                assert_eq!(secs, 1);
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }
}
