use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing batch activity since startup.
#[derive(Default)]
pub struct BatchMetrics {
    batches_run: AtomicU64,
    files_succeeded: AtomicU64,
    files_failed: AtomicU64,
}

impl BatchMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed batch and its per-file outcome counts.
    pub fn record_batch(&self, succeeded: u64, failed: u64) {
        self.batches_run.fetch_add(1, Ordering::Relaxed);
        self.files_succeeded.fetch_add(succeeded, Ordering::Relaxed);
        self.files_failed.fetch_add(failed, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            batches_run: self.batches_run.load(Ordering::Relaxed),
            files_succeeded: self.files_succeeded.load(Ordering::Relaxed),
            files_failed: self.files_failed.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of batch counters used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Number of batches whose listing succeeded.
    pub batches_run: u64,
    /// Files summarized successfully across all batches.
    pub files_succeeded: u64,
    /// Files recorded with `status = error` across all batches.
    pub files_failed: u64,
}
