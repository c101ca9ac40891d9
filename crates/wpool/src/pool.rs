//! Pool - bounded worker pool with result and error channels

use std::fmt::Display;
use std::future::Future;
use std::sync::{Arc, Mutex, Once, PoisonError};

use async_channel::{Receiver, Sender};
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use crate::error::PoolError;
use crate::job::Job;
use crate::metrics::{PoolMetrics, PoolMetricsSnapshot};
use crate::worker::{process_fn, ProcessFn, Worker, WorkerBuilder};

/// A fixed set of workers sharing one bounded job queue
///
/// Lifecycle is `created -> started -> stopped`. Every accepted job comes
/// out exactly once, on either [`results`](Self::results) or
/// [`errors`](Self::errors).
///
/// The job, results and errors channels all hold `num_workers` entries.
/// `stop` waits for the workers, and a worker blocks while its output
/// channel is full, so drain outputs concurrently when more than
/// `2 * num_workers` outputs may be pending at stop time.
pub struct Pool<T, R> {
    num_workers: usize,
    process: ProcessFn<T, R>,
    jobs_tx: Sender<Job<T, R>>,
    jobs_rx: Receiver<Job<T, R>>,
    results_tx: Sender<Job<T, R>>,
    results_rx: Receiver<Job<T, R>>,
    errors_tx: Sender<Job<T, R>>,
    errors_rx: Receiver<Job<T, R>>,
    quit: CancellationToken,
    workers: Mutex<Vec<JoinHandle<()>>>,
    started: Once,
    stopped: OnceCell<()>,
    metrics: Arc<PoolMetrics>,
}

impl<T, R> Pool<T, R>
where
    T: Clone + Send + 'static,
    R: Send + 'static,
{
    /// Create a pool of `num_workers` (0 is raised to 1) running `process`
    pub fn new<E, F, Fut>(num_workers: usize, process: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        Self::with_process_fn(num_workers, process_fn(process))
    }

    pub fn builder() -> PoolBuilder<T, R> {
        PoolBuilder::new()
    }

    fn with_process_fn(num_workers: usize, process: ProcessFn<T, R>) -> Self {
        let num_workers = num_workers.max(1);
        let (jobs_tx, jobs_rx) = async_channel::bounded(num_workers);
        let (results_tx, results_rx) = async_channel::bounded(num_workers);
        let (errors_tx, errors_rx) = async_channel::bounded(num_workers);

        Self {
            num_workers,
            process,
            jobs_tx,
            jobs_rx,
            results_tx,
            results_rx,
            errors_tx,
            errors_rx,
            quit: CancellationToken::new(),
            workers: Mutex::new(Vec::with_capacity(num_workers)),
            started: Once::new(),
            stopped: OnceCell::new(),
            metrics: Arc::new(PoolMetrics::new()),
        }
    }

    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// Spawn the workers; later calls do nothing
    ///
    /// Must be called from within a Tokio runtime. Ignored once the pool
    /// is stopping.
    pub fn start(&self) {
        if self.quit.is_cancelled() {
            warn!("Pool already stopped, start ignored");
            return;
        }

        self.started.call_once(|| self.spawn_workers());
    }

    fn spawn_workers(&self) {
        let mut workers = self.workers.lock().unwrap_or_else(PoisonError::into_inner);
        for id in 0..self.num_workers {
            match self.worker_builder(id).build() {
                Ok(worker) => workers.push(tokio::spawn(worker.run())),
                Err(e) => error!(worker_id = id, error = %e, "Failed to build worker"),
            }
        }
        observability::record_active_workers(workers.len());
        info!(workers = workers.len(), "Pool started");
    }

    fn worker_builder(&self, id: usize) -> WorkerBuilder<T, R> {
        Worker::builder()
            .id(id)
            .jobs(self.jobs_rx.clone())
            .process(Arc::clone(&self.process))
            .quit(self.quit.clone())
            .results(self.results_tx.clone())
            .errors(self.errors_tx.clone())
            .metrics(Arc::clone(&self.metrics))
    }

    /// Enqueue a job, waiting while the queue is full
    ///
    /// Returns [`PoolError::Stopped`] if the pool stops first; the job is
    /// then dropped without being processed or reported.
    pub async fn submit(&self, job: Job<T, R>) -> Result<(), PoolError> {
        if self.quit.is_cancelled() {
            return Err(self.reject());
        }

        tokio::select! {
            biased;
            _ = self.quit.cancelled() => Err(self.reject()),
            sent = self.jobs_tx.send(job) => match sent {
                Ok(()) => {
                    self.metrics.inc_submitted();
                    Ok(())
                }
                Err(_) => Err(self.reject()),
            },
        }
    }

    /// Alias of [`submit`](Self::submit)
    pub async fn add_task(&self, job: Job<T, R>) -> Result<(), PoolError> {
        self.submit(job).await
    }

    fn reject(&self) -> PoolError {
        self.metrics.inc_rejected();
        observability::record_job_rejected();
        PoolError::Stopped
    }

    /// Stop the pool and wait for every worker to exit
    ///
    /// Jobs already accepted are processed first, even when the pool was
    /// never started. Concurrent callers all
    /// return once the single teardown completes. Afterwards the results
    /// and errors channels are closed.
    #[instrument(name = "wpool_stop", skip(self), fields(workers = self.num_workers))]
    pub async fn stop(&self) {
        self.stopped
            .get_or_init(|| async {
                // Close submission before raising quit so no job lands after
                // the workers have checked for an empty queue.
                self.jobs_tx.close();
                self.quit.cancel();

                // Jobs accepted before start are still processed
                if !self.started.is_completed() && !self.jobs_rx.is_empty() {
                    warn!(
                        queued = self.jobs_rx.len(),
                        "Pool stopped before start, spawning workers to drain queue"
                    );
                    self.started.call_once(|| self.spawn_workers());
                }

                let workers = std::mem::take(
                    &mut *self.workers.lock().unwrap_or_else(PoisonError::into_inner),
                );
                for handle in workers {
                    if let Err(e) = handle.await {
                        error!(error = %e, "Worker task failed");
                    }
                }

                self.results_tx.close();
                self.errors_tx.close();
                observability::record_active_workers(0);
                info!(metrics = ?self.metrics.snapshot(), "Pool stopped");
            })
            .await;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.initialized()
    }

    /// Receive every successful job until the pool stops
    pub async fn collect_results(&self) -> Vec<Job<T, R>> {
        drain(&self.results_rx).await
    }

    /// Receive every failed job until the pool stops
    pub async fn collect_errors(&self) -> Vec<Job<T, R>> {
        drain(&self.errors_rx).await
    }

    /// Receiver for successful jobs, for draining from another task
    pub fn results(&self) -> Receiver<Job<T, R>> {
        self.results_rx.clone()
    }

    /// Receiver for failed jobs, for draining from another task
    pub fn errors(&self) -> Receiver<Job<T, R>> {
        self.errors_rx.clone()
    }

    pub fn metrics(&self) -> PoolMetricsSnapshot {
        self.metrics.snapshot()
    }
}

impl<T, R> Drop for Pool<T, R> {
    fn drop(&mut self) {
        // Let running workers drain and exit
        self.jobs_tx.close();
        self.quit.cancel();
    }
}

async fn drain<J>(rx: &Receiver<J>) -> Vec<J> {
    let mut out = Vec::new();
    while let Ok(item) = rx.recv().await {
        out.push(item);
    }
    out
}

/// Builder for [`Pool`]
pub struct PoolBuilder<T, R> {
    workers: usize,
    process: Option<ProcessFn<T, R>>,
}

impl<T, R> Default for PoolBuilder<T, R> {
    fn default() -> Self {
        Self {
            workers: 1,
            process: None,
        }
    }
}

impl<T, R> PoolBuilder<T, R>
where
    T: Clone + Send + 'static,
    R: Send + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Worker count; 0 is raised to 1
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn process<E, F, Fut>(mut self, process: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        self.process = Some(process_fn(process));
        self
    }

    pub fn build(self) -> Result<Pool<T, R>, PoolError> {
        let process = self.process.ok_or(PoolError::MissingProcess)?;
        Ok(Pool::with_process_fn(self.workers, process))
    }
}
