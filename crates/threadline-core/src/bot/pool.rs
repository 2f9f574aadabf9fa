//! Bounded pool for detached response work.
//!
//! Each unit (LLM call plus reply post, or a "run" button script) is spawned
//! outside the event-delivery path with its own deadline and a child
//! cancellation token. A full pool rejects new units with [`BotError::Busy`]
//! instead of queueing without bound.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::Instrument;

use threadline_types::error::BotError;

pub struct ResponsePool {
    permits: Arc<Semaphore>,
    tracker: TaskTracker,
    cancel: CancellationToken,
}

impl ResponsePool {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            tracker: TaskTracker::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Spawn `work` with a deadline of `timeout`.
    ///
    /// Failures, timeouts and cancellations are logged by the pool; the
    /// returned handle resolves to the same outcome for callers that want it.
    pub fn submit<F>(
        &self,
        unit: &'static str,
        timeout: Duration,
        work: F,
    ) -> Result<JoinHandle<Result<(), BotError>>, BotError>
    where
        F: Future<Output = Result<(), BotError>> + Send + 'static,
    {
        if self.tracker.is_closed() || self.cancel.is_cancelled() {
            return Err(BotError::ShuttingDown);
        }

        let permit = Arc::clone(&self.permits)
            .try_acquire_owned()
            .map_err(|_| BotError::Busy)?;
        let token = self.cancel.child_token();
        let span = tracing::info_span!("response_unit", unit);

        let handle = self.tracker.spawn(
            async move {
                let _permit = permit;
                let outcome = tokio::select! {
                    _ = token.cancelled() => Err(BotError::Cancelled),
                    result = tokio::time::timeout(timeout, work) => {
                        result.unwrap_or(Err(BotError::Timeout(timeout)))
                    }
                };
                if let Err(ref e) = outcome {
                    tracing::warn!(error = %e, "response unit failed");
                }
                outcome
            }
            .instrument(span),
        );

        Ok(handle)
    }

    /// Number of units currently running.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Stop accepting work and drain.
    ///
    /// Waits up to `grace` for running units, then cancels whatever is left
    /// and waits for it to unwind.
    pub async fn shutdown(&self, grace: Duration) {
        self.tracker.close();
        if tokio::time::timeout(grace, self.tracker.wait()).await.is_err() {
            tracing::warn!(
                remaining = self.tracker.len(),
                "grace period elapsed, cancelling response units"
            );
            self.cancel.cancel();
            self.tracker.wait().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unit_runs_to_completion() {
        let pool = ResponsePool::new(2);
        let handle = pool.submit("test", Duration::from_secs(5), async { Ok(()) }).unwrap();
        assert!(handle.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_unit_times_out() {
        let pool = ResponsePool::new(2);
        let handle = pool
            .submit("test", Duration::from_millis(20), async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(())
            })
            .unwrap();
        assert!(matches!(handle.await.unwrap(), Err(BotError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_full_pool_is_busy() {
        let pool = ResponsePool::new(1);
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let _first = pool
            .submit("test", Duration::from_secs(5), async move {
                let _ = rx.await;
                Ok(())
            })
            .unwrap();

        let second = pool.submit("test", Duration::from_secs(5), async { Ok(()) });
        assert!(matches!(second, Err(BotError::Busy)));

        tx.send(()).unwrap();
        pool.shutdown(Duration::from_secs(5)).await;
        assert_eq!(pool.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_rejects_new_work() {
        let pool = ResponsePool::new(1);
        pool.shutdown(Duration::from_millis(10)).await;
        let result = pool.submit("test", Duration::from_secs(5), async { Ok(()) });
        assert!(matches!(result, Err(BotError::ShuttingDown)));
    }

    #[tokio::test]
    async fn test_shutdown_cancels_after_grace() {
        let pool = ResponsePool::new(1);
        let handle = pool
            .submit("test", Duration::from_secs(60), async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(())
            })
            .unwrap();
        pool.shutdown(Duration::from_millis(20)).await;
        assert!(matches!(handle.await.unwrap(), Err(BotError::Cancelled)));
    }
}
