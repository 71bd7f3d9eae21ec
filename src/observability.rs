//! Counters for slot operations

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics handle for recording counters
#[derive(Debug, Default)]
pub struct Metrics {
    saves_completed: AtomicU64,
    saves_rejected: AtomicU64,
    uploads_completed: AtomicU64,
    test_runs_submitted: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save_completed(&self) {
        self.saves_completed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "saves_completed", "Metric incremented");
    }

    pub fn save_rejected(&self) {
        self.saves_rejected.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "saves_rejected", "Metric incremented");
    }

    pub fn upload_completed(&self) {
        self.uploads_completed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "uploads_completed", "Metric incremented");
    }

    pub fn test_run_submitted(&self) {
        self.test_runs_submitted.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "test_runs_submitted", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            saves_completed: self.saves_completed.load(Ordering::Relaxed),
            saves_rejected: self.saves_rejected.load(Ordering::Relaxed),
            uploads_completed: self.uploads_completed.load(Ordering::Relaxed),
            test_runs_submitted: self.test_runs_submitted.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub saves_completed: u64,
    pub saves_rejected: u64,
    pub uploads_completed: u64,
    pub test_runs_submitted: u64,
}
