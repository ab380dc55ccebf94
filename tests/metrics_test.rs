//! Unit tests for metrics.rs module

use std::time::Duration;
use feedback_insights::metrics::{FeedbackMetrics, MetricsSnapshot};

#[test]
fn test_metrics_default_names() {
    let metrics = FeedbackMetrics::default();
    assert_eq!(metrics.db_operations_total, "feedback_db_operations_total");
    assert_eq!(metrics.submissions_accepted_total, "feedback_submissions_accepted_total");
    assert_eq!(metrics.snapshot_files_written_total, "feedback_snapshot_files_written_total");
    assert_eq!(metrics.snapshot(), MetricsSnapshot::default());
}

#[test]
fn test_metrics_initialization() {
    // Only one global recorder can ever be installed
    let _ = FeedbackMetrics::init();
    assert!(FeedbackMetrics::init().is_err());
}

#[test]
fn test_record_db_operation_success() {
    let metrics = FeedbackMetrics::default();
    metrics.record_db_operation("fetch_all", Duration::from_millis(5), true);

    let totals = metrics.snapshot();
    assert_eq!(totals.db_operations, 1);
    assert_eq!(totals.db_failures, 0);
    assert_eq!(totals.errors, 0);
}

#[test]
fn test_record_db_operation_failure() {
    let metrics = FeedbackMetrics::default();
    metrics.record_db_operation("insert", Duration::from_millis(5), false);

    let totals = metrics.snapshot();
    assert_eq!(totals.db_operations, 1);
    assert_eq!(totals.db_failures, 1);
    assert_eq!(totals.errors, 1);
}

#[test]
fn test_record_intake_and_analysis() {
    let metrics = FeedbackMetrics::default();
    metrics.record_submission_accepted("Facilities");
    metrics.record_submission_accepted("Student Welfare");
    metrics.record_submission_rejected();
    metrics.record_analytics_run(2, Duration::from_millis(12));
    metrics.record_snapshot_files(3);
    metrics.record_error("csv", "snapshot");

    let totals = metrics.snapshot();
    assert_eq!(totals.submissions_accepted, 2);
    assert_eq!(totals.submissions_rejected, 1);
    assert_eq!(totals.analytics_runs, 1);
    assert_eq!(totals.snapshot_files_written, 3);
    assert_eq!(totals.errors, 1);
}
