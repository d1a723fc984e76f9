//! WorkerPool - sweep ブランチの並行数制限付き実行
//!
//! 各 item が `JoinSet` の 1 タスクになり、セマフォで同時実行数を制限する。
//! 結果は入力順で返る。
//!
//! # 学習ポイント
//! - `Semaphore` + `JoinSet` による bounded concurrency
//! - panic を `SyncError::Worker` へ変換

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::error;

use crate::domain::errors::SyncError;

/// Bounded worker group.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    limit: usize,
}

impl WorkerPool {
    /// `limit` is clamped to at least 1.
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Run `work` for every item, at most `limit` at a time, and wait for all.
    ///
    /// # Errors
    /// - `SyncError::Worker` if a branch panicked or was cancelled. The other
    ///   branches still run to completion.
    pub async fn run<I, F, Fut, R>(&self, items: Vec<I>, work: F) -> Result<Vec<R>, SyncError>
    where
        I: Send + 'static,
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: Send + 'static,
    {
        let semaphore = Arc::new(Semaphore::new(self.limit));
        let work = Arc::new(work);
        let mut joins = JoinSet::new();

        for (index, item) in items.into_iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let work = Arc::clone(&work);
            joins.spawn(async move {
                // the semaphore is never closed
                let _permit = semaphore.acquire_owned().await.ok();
                (index, work(item).await)
            });
        }

        let mut results: Vec<Option<R>> = Vec::new();
        results.resize_with(joins.len(), || None);
        let mut failure = None;

        while let Some(joined) = joins.join_next().await {
            match joined {
                Ok((index, result)) => results[index] = Some(result),
                Err(e) => {
                    error!(error = %e, "worker branch aborted");
                    failure.get_or_insert_with(|| SyncError::Worker(e.to_string()));
                }
            }
        }

        match failure {
            Some(err) => Err(err),
            None => Ok(results.into_iter().flatten().collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn results_keep_input_order() {
        let pool = WorkerPool::new(3);
        let out = pool
            .run((0..10u64).collect(), |n| async move {
                tokio::time::sleep(Duration::from_millis(10 - n)).await;
                n * 2
            })
            .await
            .unwrap();
        assert_eq!(out, (0..10u64).map(|n| n * 2).collect::<Vec<_>>());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn never_exceeds_limit() {
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let pool = WorkerPool::new(2);
        let (r, p) = (Arc::clone(&running), Arc::clone(&peak));
        pool.run((0..12).collect::<Vec<u32>>(), move |_| {
            let running = Arc::clone(&r);
            let peak = Arc::clone(&p);
            async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                running.fetch_sub(1, Ordering::SeqCst);
            }
        })
        .await
        .unwrap();

        assert!(peak.load(Ordering::SeqCst) <= 2);
        assert!(peak.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn panicking_branch_is_a_worker_error() {
        let done = Arc::new(AtomicUsize::new(0));
        let d = Arc::clone(&done);
        let err = WorkerPool::new(4)
            .run(vec![1, 2, 3], move |n| {
                let done = Arc::clone(&d);
                async move {
                    if n == 2 {
                        panic!("boom");
                    }
                    done.fetch_add(1, Ordering::SeqCst);
                }
            })
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::Worker(_)));
        assert_eq!(done.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn zero_limit_is_clamped() {
        assert_eq!(WorkerPool::new(0).limit(), 1);
    }

    #[tokio::test]
    async fn empty_input() {
        let out: Vec<()> = WorkerPool::new(2).run(Vec::<u8>::new(), |_| async {}).await.unwrap();
        assert!(out.is_empty());
    }
}
