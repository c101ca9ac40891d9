//! # wpool
//!
//! Generic bounded worker pool.
//!
//! A fixed number of workers pull [`Job`]s from one bounded queue, run an
//! async process function on each, and route the finished job to either
//! the results or the errors channel.
//!
//! ```ignore
//! let pool = Pool::new(3, |x: i32| async move { Ok::<_, String>(x * 2) });
//! pool.start();
//! let results = tokio::spawn({
//!     let rx = pool.results();
//!     async move { rx.recv().await }
//! });
//! pool.submit(Job::new(21)).await?;
//! pool.stop().await;
//! ```

mod error;
mod job;
mod metrics;
mod pool;
mod worker;

pub use error::PoolError;
pub use job::{Job, JobError};
pub use metrics::{PoolMetrics, PoolMetricsSnapshot};
pub use pool::{Pool, PoolBuilder};
pub use worker::{process_fn, ProcessFn, Worker, WorkerBuilder};
