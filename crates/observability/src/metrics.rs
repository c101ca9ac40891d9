//! Notification metrics
//!
//! Thin wrappers over the `metrics` facade so every crate records the same
//! names and labels. Nothing is exported unless a recorder is installed
//! (see [`crate::init_with_config`]).

use std::collections::HashMap;

use metrics::{counter, gauge, histogram};

/// Record one messenger send
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_send;
///
/// let started = Instant::now();
/// let result = messenger.send(&ctx).await;
/// record_send(messenger.name(), result.is_ok(), started.elapsed().as_secs_f64() * 1000.0);
/// ```
pub fn record_send(messenger: &str, success: bool, elapsed_ms: f64) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "nofy_messages_sent_total",
        "messenger" => messenger.to_string(),
        "status" => status
    )
    .increment(1);

    histogram!(
        "nofy_send_duration_ms",
        "messenger" => messenger.to_string()
    )
    .record(elapsed_ms);
}

/// Record one fan-out over `messengers` with `failures` failed sends
pub fn record_dispatch(messengers: usize, failures: usize) {
    counter!("nofy_dispatch_total").increment(1);
    gauge!("nofy_dispatch_fanout").set(messengers as f64);
    if failures > 0 {
        counter!("nofy_dispatch_failed_total").increment(1);
    }
}

/// Record a panic caught by a fault barrier
///
/// `component` is `"dispatcher"` or `"wpool"`.
pub fn record_panic_recovered(component: &str) {
    counter!(
        "nofy_panics_recovered_total",
        "component" => component.to_string()
    )
    .increment(1);
}

/// Record one processed pool job
pub fn record_job(success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!("nofy_jobs_total", "status" => status).increment(1);
}

/// Record a submit refused because the pool stopped
pub fn record_job_rejected() {
    counter!("nofy_jobs_total", "status" => "rejected").increment(1);
}

/// Record the number of running workers
pub fn record_active_workers(count: usize) {
    gauge!("nofy_pool_workers").set(count as f64);
}

/// In-memory send statistics
///
/// Aggregates sends across dispatches so a CLI run can print a summary
/// without a Prometheus scrape.
#[derive(Debug, Clone, Default)]
pub struct SendStatsAggregator {
    pub total_dispatches: u64,
    pub total_sends: u64,
    pub total_failures: u64,
    /// Latency over all messengers
    pub latency_stats: RunningStats,
    /// Latency per messenger
    pub per_messenger: HashMap<String, RunningStats>,
    /// Failures per messenger
    pub failure_counts: HashMap<String, u64>,
}

impl SendStatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a new fan-out
    pub fn record_dispatch(&mut self) {
        self.total_dispatches += 1;
    }

    /// Add one send outcome
    pub fn update(&mut self, messenger: &str, success: bool, elapsed_ms: f64) {
        self.total_sends += 1;
        self.latency_stats.push(elapsed_ms);
        self.per_messenger
            .entry(messenger.to_string())
            .or_default()
            .push(elapsed_ms);

        if !success {
            self.total_failures += 1;
            *self.failure_counts.entry(messenger.to_string()).or_insert(0) += 1;
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_dispatches: self.total_dispatches,
            total_sends: self.total_sends,
            total_failures: self.total_failures,
            failure_rate: if self.total_sends > 0 {
                self.total_failures as f64 / self.total_sends as f64 * 100.0
            } else {
                0.0
            },
            latency_ms: StatsSummary::from(&self.latency_stats),
            failure_counts: self.failure_counts.clone(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Summary printed at the end of a run
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_dispatches: u64,
    pub total_sends: u64,
    pub total_failures: u64,
    pub failure_rate: f64,
    pub latency_ms: StatsSummary,
    pub failure_counts: HashMap<String, u64>,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Send Summary ===")?;
        writeln!(f, "Dispatches: {}", self.total_dispatches)?;
        writeln!(f, "Sends: {}", self.total_sends)?;
        writeln!(
            f,
            "Failures: {} ({:.2}%)",
            self.total_failures, self.failure_rate
        )?;
        writeln!(f, "Latency (ms): {}", self.latency_ms)?;

        if !self.failure_counts.is_empty() {
            let mut counts: Vec<_> = self.failure_counts.iter().collect();
            counts.sort();
            writeln!(f, "Failures by messenger:")?;
            for (messenger, count) in counts {
                writeln!(f, "  {}: {}", messenger, count)?;
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online mean/variance (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
