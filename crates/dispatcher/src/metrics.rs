//! Dispatch metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared by every `send_all` of one dispatcher
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    /// Total `send_all` calls
    dispatch_count: AtomicU64,
    /// Total successful messenger sends
    send_success: AtomicU64,
    /// Total failed messenger sends (panics included)
    send_failure: AtomicU64,
    /// Panics caught by the fault barrier
    panics_recovered: AtomicU64,
}

impl DispatchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch_count(&self) -> u64 {
        self.dispatch_count.load(Ordering::Relaxed)
    }

    pub fn inc_dispatch_count(&self) {
        self.dispatch_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn send_success(&self) -> u64 {
        self.send_success.load(Ordering::Relaxed)
    }

    pub fn inc_send_success(&self) {
        self.send_success.fetch_add(1, Ordering::Relaxed);
    }

    pub fn send_failure(&self) -> u64 {
        self.send_failure.load(Ordering::Relaxed)
    }

    pub fn inc_send_failure(&self) {
        self.send_failure.fetch_add(1, Ordering::Relaxed);
    }

    pub fn panics_recovered(&self) -> u64 {
        self.panics_recovered.load(Ordering::Relaxed)
    }

    pub fn inc_panics_recovered(&self) {
        self.panics_recovered.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            dispatch_count: self.dispatch_count(),
            send_success: self.send_success(),
            send_failure: self.send_failure(),
            panics_recovered: self.panics_recovered(),
        }
    }
}

/// Snapshot of dispatch metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub dispatch_count: u64,
    pub send_success: u64,
    pub send_failure: u64,
    pub panics_recovered: u64,
}
