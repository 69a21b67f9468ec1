//! Bounded parallel fan-out.
//!
//! Resolvers frequently need N independent upstream calls (clone attachments,
//! follow/unfollow a batch of threads, scan candidate entities). This helper
//! runs the branches with bounded concurrency, keeps results in input order,
//! and fails the aggregate on the first branch error.

use futures::{StreamExt, stream};

/// Default branch concurrency for fan-out calls.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Run `futs` with at most `limit` in flight, preserving input order.
///
/// Returns the first error encountered; successful branch results are
/// collected by index.
pub async fn bounded<T, E, F>(limit: usize, futs: Vec<F>) -> Result<Vec<T>, E>
where
    F: Future<Output = Result<T, E>>,
{
    let limit = limit.max(1);
    let results: Vec<(usize, Result<T, E>)> = stream::iter(futs.into_iter().enumerate())
        .map(|(i, fut)| async move { (i, fut.await) })
        .buffer_unordered(limit)
        .collect()
        .await;

    let mut slots: Vec<Option<T>> = Vec::new();
    slots.resize_with(results.len(), || None);
    for (i, res) in results {
        slots[i] = Some(res?);
    }
    // Every slot was filled above; flatten preserves order.
    Ok(slots.into_iter().flatten().collect())
}

/// [`bounded`] with [`DEFAULT_CONCURRENCY`].
pub async fn all<T, E, F>(futs: Vec<F>) -> Result<Vec<T>, E>
where
    F: Future<Output = Result<T, E>>,
{
    bounded(DEFAULT_CONCURRENCY, futs).await
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;

    #[tokio::test]
    async fn collects_results_in_input_order() {
        let futs: Vec<_> = (0..10)
            .map(|i| async move {
                if i % 2 == 0 {
                    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                }
                Ok::<_, String>(i * 10)
            })
            .collect();
        let out = bounded(3, futs).await.unwrap_or_default();
        assert_eq!(out, (0..10).map(|i| i * 10).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn first_error_fails_the_aggregate() {
        let futs: Vec<_> = (0..4)
            .map(|i| async move {
                if i == 2 {
                    Err(format!("branch {i} failed"))
                } else {
                    Ok(i)
                }
            })
            .collect();
        let err = all(futs).await.err();
        assert_eq!(err.as_deref(), Some("branch 2 failed"));
    }

    #[tokio::test]
    async fn respects_the_concurrency_limit() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let futs: Vec<_> = (0..16)
            .map(|_| {
                let in_flight = in_flight.clone();
                let peak = peak.clone();
                async move {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(std::time::Duration::from_millis(2)).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    Ok::<_, ()>(())
                }
            })
            .collect();
        let _ = bounded(4, futs).await;
        assert!(peak.load(Ordering::SeqCst) <= 4);
    }
}
