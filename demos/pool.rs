//! Worker Pool Example
//!
//! Doubles a handful of numbers on three workers and prints both channels.
//!
//! Run with: cargo run -p demos --bin pool_demo

use std::time::Duration;

use observability::{LogTarget, ObservabilityConfig};
use wpool::{Job, Pool};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    observability::init_with_config(
        ObservabilityConfig::default().with_target(LogTarget::Stdout),
    )?;

    let pool = Pool::new(3, |x: i64| async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        if x == 4 {
            return Err(format!("refusing to double {x}"));
        }
        Ok(x * 2)
    });
    pool.start();

    // Drain outputs concurrently so stop() never waits on a full channel
    let results = pool.results();
    let errors = pool.errors();
    let result_printer = tokio::spawn(async move {
        while let Ok(job) = results.recv().await {
            println!("job {} -> {:?}", job.id, job.result);
        }
    });
    let error_printer = tokio::spawn(async move {
        while let Ok(job) = errors.recv().await {
            if let Some(error) = job.error {
                println!("{error}");
            }
        }
    });

    for x in 1..=5 {
        pool.submit(Job::new(x)).await?;
    }
    pool.stop().await;
    result_printer.await?;
    error_printer.await?;

    tracing::info!(metrics = ?pool.metrics(), "Pool finished");
    Ok(())
}
