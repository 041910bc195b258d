//! A fixed-size worker pool over a bounded job queue.
//!
//! Both measurement stages run through [`WorkerPool`]: `workers` tasks pull
//! jobs from one shared queue until it is closed and drained, and push their
//! outputs into a result channel. The number of jobs in flight therefore never
//! exceeds the worker count, however many jobs are queued behind them.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tracing::{error, warn};

#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    workers: usize,
}

impl WorkerPool {
    /// A pool of at least one worker.
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Capacity used for job queues feeding this pool.
    pub fn queue_depth(&self) -> usize {
        self.workers.saturating_mul(2)
    }

    /// Starts the workers.
    ///
    /// Every job is handed to `handler` exactly once. `Some` outputs are sent
    /// to `results`; `None` means the job produced nothing. Each job runs in
    /// its own task: when it panics, the worker logs it, sends whatever
    /// `recover` makes of the job instead, and moves on to the next one. The
    /// `results` channel closes once every worker has exited and the caller
    /// has dropped its own senders.
    pub fn spawn<T, R, F, Fut, G>(
        &self,
        jobs: mpsc::Receiver<T>,
        results: mpsc::Sender<R>,
        handler: F,
        recover: G,
    ) -> PoolHandle
    where
        T: Clone + Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Option<R>> + Send + 'static,
        G: Fn(T) -> Option<R> + Send + Sync + 'static,
    {
        let jobs = Arc::new(Mutex::new(jobs));
        let handler = Arc::new(handler);
        let recover = Arc::new(recover);
        let mut set = JoinSet::new();

        for _ in 0..self.workers {
            let jobs = Arc::clone(&jobs);
            let handler = Arc::clone(&handler);
            let recover = Arc::clone(&recover);
            let results = results.clone();

            set.spawn(async move {
                loop {
                    let job = jobs.lock().await.recv().await;
                    let Some(job) = job else {
                        break;
                    };

                    let output = match tokio::spawn(handler(job.clone())).await {
                        Ok(output) => output,
                        Err(e) => {
                            warn!("Job abandoned: {e}");
                            recover(job)
                        }
                    };

                    if let Some(output) = output {
                        if results.send(output).await.is_err() {
                            break;
                        }
                    }
                }
            });
        }

        PoolHandle { set }
    }
}

/// Joins the workers of a running pool.
pub struct PoolHandle {
    set: JoinSet<()>,
}

impl PoolHandle {
    pub async fn join(mut self) {
        while let Some(res) = self.set.join_next().await {
            if let Err(e) = res {
                error!("Worker task failed: {e}");
            }
        }
    }
}

/// Streams `items` into a bounded queue from a background task.
///
/// The iterator is consumed lazily; the task waits whenever the queue is full.
pub fn feed<I>(items: I, depth: usize) -> (mpsc::Receiver<I::Item>, tokio::task::JoinHandle<u64>)
where
    I: IntoIterator,
    I::IntoIter: Send + 'static,
    I::Item: Send + 'static,
{
    let (tx, rx) = mpsc::channel(depth.max(1));
    let items = items.into_iter();

    let handle = tokio::spawn(async move {
        let mut sent = 0u64;
        for item in items {
            if tx.send(item).await.is_err() {
                break;
            }
            sent += 1;
        }
        sent
    });

    (rx, handle)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
