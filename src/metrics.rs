use anyhow::Result;
use metrics::{counter, gauge, histogram};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Metric names and local totals for the feedback pipeline
///
/// Every `record_*` call goes to the global `metrics` recorder and also bumps
/// an in-process total, so callers can inspect what happened without a
/// recorder installed.
pub struct FeedbackMetrics {
    // Store metrics
    pub db_operations_total: &'static str,
    pub db_operation_duration: &'static str,

    // Intake metrics
    pub submissions_accepted_total: &'static str,
    pub submissions_rejected_total: &'static str,

    // Analytics metrics
    pub analytics_runs_total: &'static str,
    pub analytics_duration: &'static str,
    pub analytics_corpus_size: &'static str,

    // Snapshot metrics
    pub snapshot_files_written_total: &'static str,

    // Error metrics
    pub errors_total: &'static str,

    db_operations: AtomicU64,
    db_failures: AtomicU64,
    accepted: AtomicU64,
    rejected: AtomicU64,
    analytics_runs: AtomicU64,
    snapshot_files: AtomicU64,
    errors: AtomicU64,
}

impl Default for FeedbackMetrics {
    fn default() -> Self {
        Self {
            db_operations_total: "feedback_db_operations_total",
            db_operation_duration: "feedback_db_operation_duration_seconds",

            submissions_accepted_total: "feedback_submissions_accepted_total",
            submissions_rejected_total: "feedback_submissions_rejected_total",

            analytics_runs_total: "feedback_analytics_runs_total",
            analytics_duration: "feedback_analytics_duration_seconds",
            analytics_corpus_size: "feedback_analytics_corpus_size",

            snapshot_files_written_total: "feedback_snapshot_files_written_total",

            errors_total: "feedback_errors_total",

            db_operations: AtomicU64::new(0),
            db_failures: AtomicU64::new(0),
            accepted: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            analytics_runs: AtomicU64::new(0),
            snapshot_files: AtomicU64::new(0),
            errors: AtomicU64::new(0),
        }
    }
}

/// Point-in-time copy of the local totals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub db_operations: u64,
    pub db_failures: u64,
    pub submissions_accepted: u64,
    pub submissions_rejected: u64,
    pub analytics_runs: u64,
    pub snapshot_files_written: u64,
    pub errors: u64,
}

impl FeedbackMetrics {
    /// Install the no-op global recorder
    pub fn init() -> Result<()> {
        metrics::set_global_recorder(metrics::NoopRecorder)
            .map_err(|e| anyhow::anyhow!("Failed to initialize metrics recorder: {}", e))?;

        Ok(())
    }

    /// Record store operation metrics
    pub fn record_db_operation(&self, operation: &'static str, duration: Duration, success: bool) {
        let status = if success { "success" } else { "error" };

        counter!(self.db_operations_total, "operation" => operation, "status" => status)
            .increment(1);
        histogram!(self.db_operation_duration, "operation" => operation)
            .record(duration.as_secs_f64());
        self.db_operations.fetch_add(1, Ordering::Relaxed);

        if !success {
            self.db_failures.fetch_add(1, Ordering::Relaxed);
            self.record_error("database", operation);
        }
    }

    /// Record a submission that passed validation
    pub fn record_submission_accepted(&self, category: &'static str) {
        counter!(self.submissions_accepted_total, "category" => category).increment(1);
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a submission that failed validation
    pub fn record_submission_rejected(&self) {
        counter!(self.submissions_rejected_total).increment(1);
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one analytics run over `corpus_size` submissions
    pub fn record_analytics_run(&self, corpus_size: usize, duration: Duration) {
        counter!(self.analytics_runs_total).increment(1);
        histogram!(self.analytics_duration).record(duration.as_secs_f64());
        #[allow(clippy::cast_precision_loss)]
        gauge!(self.analytics_corpus_size).set(corpus_size as f64);
        self.analytics_runs.fetch_add(1, Ordering::Relaxed);
    }

    /// Record snapshot files written
    pub fn record_snapshot_files(&self, file_count: usize) {
        counter!(self.snapshot_files_written_total).increment(file_count as u64);
        self.snapshot_files
            .fetch_add(file_count as u64, Ordering::Relaxed);
    }

    /// Record error metrics
    pub fn record_error(&self, error_type: &'static str, operation: &'static str) {
        counter!(self.errors_total, "type" => error_type, "operation" => operation).increment(1);
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Current local totals
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            db_operations: self.db_operations.load(Ordering::Relaxed),
            db_failures: self.db_failures.load(Ordering::Relaxed),
            submissions_accepted: self.accepted.load(Ordering::Relaxed),
            submissions_rejected: self.rejected.load(Ordering::Relaxed),
            analytics_runs: self.analytics_runs.load(Ordering::Relaxed),
            snapshot_files_written: self.snapshot_files.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}
