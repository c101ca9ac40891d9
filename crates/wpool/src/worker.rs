//! Worker - pulls jobs from the shared queue and routes outcomes

use std::fmt::Display;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_channel::{Receiver, Sender};
use futures::future::BoxFuture;
use futures::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, instrument, warn};

use contracts::panic_message;

use crate::error::PoolError;
use crate::job::Job;
use crate::metrics::PoolMetrics;

/// Type-erased process function shared by all workers
///
/// Failures are already rendered to their `Display` text.
pub type ProcessFn<T, R> = Arc<dyn Fn(T) -> BoxFuture<'static, Result<R, String>> + Send + Sync>;

/// Erase an async process closure into a [`ProcessFn`]
pub fn process_fn<T, R, E, F, Fut>(process: F) -> ProcessFn<T, R>
where
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
    E: Display + Send + 'static,
    T: 'static,
    R: 'static,
{
    Arc::new(move |input| {
        let fut = process(input);
        async move { fut.await.map_err(|e| e.to_string()) }.boxed()
    })
}

/// A fungible executor bound to one pool's channels
pub struct Worker<T, R> {
    id: usize,
    jobs: Receiver<Job<T, R>>,
    process: ProcessFn<T, R>,
    quit: CancellationToken,
    results: Sender<Job<T, R>>,
    errors: Sender<Job<T, R>>,
    metrics: Arc<PoolMetrics>,
}

impl<T, R> Worker<T, R>
where
    T: Clone + Send + 'static,
    R: Send + 'static,
{
    pub fn builder() -> WorkerBuilder<T, R> {
        WorkerBuilder::default()
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Run until quit is raised with the queue drained, or the queue closes
    ///
    /// The queue is closed before quit is raised, so once quit fires an
    /// empty queue stays empty.
    #[instrument(name = "wpool_worker", skip(self), fields(worker_id = self.id))]
    pub async fn run(self) {
        debug!("Worker started");

        loop {
            let job = tokio::select! {
                biased;
                _ = self.quit.cancelled() => match self.jobs.try_recv() {
                    Ok(job) => job,
                    Err(_) => break,
                },
                job = self.jobs.recv() => match job {
                    Ok(job) => job,
                    Err(_) => break,
                },
            };
            self.handle(job).await;
        }

        debug!("Worker exited");
    }

    async fn handle(&self, mut job: Job<T, R>) {
        let input = job.input.clone();
        let process = Arc::clone(&self.process);
        let outcome = AssertUnwindSafe(async move { process(input).await })
            .catch_unwind()
            .await;

        let target = match outcome {
            Ok(Ok(result)) => {
                job.succeed(result);
                self.metrics.inc_succeeded();
                observability::record_job(true);
                debug!(job_id = %job.id, "Job succeeded");
                &self.results
            }
            Ok(Err(message)) => {
                job.fail(message);
                self.metrics.inc_failed();
                observability::record_job(false);
                debug!(job_id = %job.id, "Job failed");
                &self.errors
            }
            Err(payload) => {
                let message = format!("panic recovered: {}", panic_message(payload.as_ref()));
                error!(job_id = %job.id, error = %message, "Job panicked");
                job.fail(message);
                self.metrics.inc_failed();
                observability::record_job(false);
                observability::record_panic_recovered("wpool");
                &self.errors
            }
        };

        if let Err(e) = target.send(job).await {
            // Outputs are closed only after every worker exits
            warn!(job_id = %e.into_inner().id, "Output channel closed, job dropped");
        }
    }
}

/// Builder for [`Worker`]; every binding except `id` and `metrics` is required
pub struct WorkerBuilder<T, R> {
    id: usize,
    jobs: Option<Receiver<Job<T, R>>>,
    process: Option<ProcessFn<T, R>>,
    quit: Option<CancellationToken>,
    results: Option<Sender<Job<T, R>>>,
    errors: Option<Sender<Job<T, R>>>,
    metrics: Option<Arc<PoolMetrics>>,
}

impl<T, R> Default for WorkerBuilder<T, R> {
    fn default() -> Self {
        Self {
            id: 0,
            jobs: None,
            process: None,
            quit: None,
            results: None,
            errors: None,
            metrics: None,
        }
    }
}

impl<T, R> WorkerBuilder<T, R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: usize) -> Self {
        self.id = id;
        self
    }

    pub fn jobs(mut self, jobs: Receiver<Job<T, R>>) -> Self {
        self.jobs = Some(jobs);
        self
    }

    pub fn process(mut self, process: ProcessFn<T, R>) -> Self {
        self.process = Some(process);
        self
    }

    pub fn quit(mut self, quit: CancellationToken) -> Self {
        self.quit = Some(quit);
        self
    }

    pub fn results(mut self, results: Sender<Job<T, R>>) -> Self {
        self.results = Some(results);
        self
    }

    pub fn errors(mut self, errors: Sender<Job<T, R>>) -> Self {
        self.errors = Some(errors);
        self
    }

    pub fn metrics(mut self, metrics: Arc<PoolMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn build(self) -> Result<Worker<T, R>, PoolError> {
        Ok(Worker {
            id: self.id,
            jobs: self.jobs.ok_or(PoolError::MissingBinding("jobs"))?,
            process: self.process.ok_or(PoolError::MissingBinding("process"))?,
            quit: self.quit.ok_or(PoolError::MissingBinding("quit"))?,
            results: self.results.ok_or(PoolError::MissingBinding("results"))?,
            errors: self.errors.ok_or(PoolError::MissingBinding("errors"))?,
            metrics: self.metrics.unwrap_or_default(),
        })
    }
}
