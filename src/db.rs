use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{Local, NaiveDate, NaiveDateTime};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql};
use tracing::{debug, error, info, warn};

use crate::error::{FeedbackError, Result};
use crate::metrics::FeedbackMetrics;
use crate::models::{
    Category, CategorySummary, DailyTrend, NewSubmission, PriorityBreakdown, Status, StatusSummary,
    Submission, SubmissionFilter, SUBMISSION_DATE_FORMAT,
};
use crate::schema::feedback_submissions as fs_cols;
use crate::validation::InputValidator;

/// SQLite-backed store for feedback submissions
///
/// Each operation opens its own connection and drops it when done; there is
/// no pool. The plain methods (`insert`, `fetch_all`, `update_status`,
/// `search`) log failures and return a sentinel, while the `try_*` forms hand
/// the error back.
pub struct SubmissionStore {
    path: PathBuf,
    metrics: FeedbackMetrics,
}

impl SubmissionStore {
    /// Store over the database file at `path`; nothing is opened yet
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            metrics: FeedbackMetrics::default(),
        }
    }

    /// Store over `path` with its parent directory and table created
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let store = Self::new(path);
        InputValidator::validate_database_path(&store.path)?;

        // Create parent directory if it doesn't exist
        if let Some(parent) = store.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        store.try_create_tables()?;
        Ok(store)
    }

    /// Path of the database file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Operation counters for this store
    #[must_use]
    pub const fn metrics(&self) -> &FeedbackMetrics {
        &self.metrics
    }

    fn connect(&self) -> Result<Connection> {
        Ok(Connection::open(&self.path)?)
    }

    fn instrumented<T>(&self, operation: &'static str, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let start = Instant::now();
        let result = f();
        self.metrics
            .record_db_operation(operation, start.elapsed(), result.is_ok());
        result
    }

    /// Create the submissions table if it does not exist
    pub fn try_create_tables(&self) -> Result<()> {
        self.instrumented("create_tables", || {
            let conn = self.connect()?;
            conn.execute_batch(fs_cols::CREATE)?;
            debug!(path = %self.path.display(), "Ensured submissions table");
            Ok(())
        })
    }

    /// Create the submissions table, logging instead of failing
    pub fn create_tables(&self) -> bool {
        match self.try_create_tables() {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "Failed to create submissions table");
                false
            }
        }
    }

    /// Validate and store a submission stamped with the current local time
    pub fn try_insert(&self, submission: &NewSubmission) -> Result<i64> {
        self.try_insert_at(submission, Local::now().naive_local())
    }

    /// Validate and store a submission with an explicit timestamp
    ///
    /// Validation runs before any connection is opened, so a rejected
    /// submission never touches the database.
    pub fn try_insert_at(&self, submission: &NewSubmission, submitted_at: NaiveDateTime) -> Result<i64> {
        let prepared = match InputValidator::prepare_submission(submission.clone()) {
            Ok(prepared) => prepared,
            Err(e) => {
                self.metrics.record_submission_rejected();
                return Err(e);
            }
        };

        let id = self.instrumented("insert", || {
            let conn = self.connect()?;
            conn.execute(
                &format!(
                    "INSERT INTO {} ({}, {}, {}, {}, {}, {}, {}, {}, {}, {}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                    fs_cols::TABLE,
                    fs_cols::STUDENT_ID,
                    fs_cols::STUDENT_NAME,
                    fs_cols::EMAIL,
                    fs_cols::CATEGORY,
                    fs_cols::SUBJECT,
                    fs_cols::FEEDBACK_TEXT,
                    fs_cols::PRIORITY,
                    fs_cols::IS_ANONYMOUS,
                    fs_cols::SUBMISSION_DATE,
                    fs_cols::STATUS
                ),
                params![
                    prepared.student_id,
                    prepared.student_name,
                    prepared.email,
                    prepared.category.label(),
                    prepared.subject,
                    prepared.feedback_text,
                    prepared.priority.map(|p| p.label()),
                    prepared.is_anonymous,
                    submitted_at.format(SUBMISSION_DATE_FORMAT).to_string(),
                    Status::Pending.label()
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })?;

        self.metrics
            .record_submission_accepted(prepared.category.label());
        info!(id, category = %prepared.category, "Feedback submitted");
        Ok(id)
    }

    /// Store a submission; `false` if it was rejected or the write failed
    pub fn insert(&self, submission: &NewSubmission) -> bool {
        match self.try_insert(submission) {
            Ok(_) => true,
            Err(e) => {
                error!(error = %e, "Failed to insert feedback");
                false
            }
        }
    }

    /// Every stored submission in insertion order
    pub fn try_fetch_all(&self) -> Result<Vec<Submission>> {
        self.instrumented("fetch_all", || {
            let conn = self.connect()?;
            let mut stmt = conn.prepare(&format!(
                "SELECT * FROM {} ORDER BY {} ASC",
                fs_cols::TABLE,
                fs_cols::ID
            ))?;
            let rows = stmt.query_map([], map_submission)?;
            let collected = rows.collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(collected)
        })
    }

    /// Every stored submission; empty if the read failed
    pub fn fetch_all(&self) -> Vec<Submission> {
        self.try_fetch_all().unwrap_or_else(|e| {
            error!(error = %e, "Failed to fetch feedback");
            Vec::new()
        })
    }

    /// One submission by id
    pub fn try_get(&self, id: i64) -> Result<Option<Submission>> {
        self.instrumented("get", || {
            let conn = self.connect()?;
            let submission = conn
                .query_row(
                    &format!("SELECT * FROM {} WHERE {} = ?", fs_cols::TABLE, fs_cols::ID),
                    params![id],
                    map_submission,
                )
                .optional()?;
            Ok(submission)
        })
    }

    /// Move a submission to `status`, replacing its notes only when `notes` is non-empty
    ///
    /// Returns `Ok(false)` when no submission has that id.
    pub fn try_update_status(&self, id: i64, status: Status, notes: Option<&str>) -> Result<bool> {
        let notes = notes.map(str::trim).filter(|n| !n.is_empty());

        let affected = self.instrumented("update_status", || {
            let conn = self.connect()?;
            let affected = match notes {
                Some(notes) => conn.execute(
                    &format!(
                        "UPDATE {} SET {} = ?, {} = ? WHERE {} = ?",
                        fs_cols::TABLE,
                        fs_cols::STATUS,
                        fs_cols::ADMIN_NOTES,
                        fs_cols::ID
                    ),
                    params![status.label(), notes, id],
                )?,
                None => conn.execute(
                    &format!(
                        "UPDATE {} SET {} = ? WHERE {} = ?",
                        fs_cols::TABLE,
                        fs_cols::STATUS,
                        fs_cols::ID
                    ),
                    params![status.label(), id],
                )?,
            };
            Ok(affected)
        })?;

        if affected == 0 {
            warn!(id, "No feedback with this id to update");
            return Ok(false);
        }

        info!(id, status = %status, "Feedback status updated");
        Ok(true)
    }

    /// Update status and notes; `false` on a missing id or a failed write
    pub fn update_status(&self, id: i64, status: Status, notes: Option<&str>) -> bool {
        self.try_update_status(id, status, notes).unwrap_or_else(|e| {
            error!(id, error = %e, "Failed to update feedback status");
            false
        })
    }

    /// Submissions matching every set field of `filter`, newest first
    pub fn try_search(&self, filter: &SubmissionFilter) -> Result<Vec<Submission>> {
        InputValidator::validate_date_range(filter.from, filter.to)?;

        self.instrumented("search", || {
            let conn = self.connect()?;

            // Build query
            let mut query = format!("SELECT * FROM {} WHERE 1=1", fs_cols::TABLE);
            let mut params: Vec<Box<dyn ToSql>> = Vec::new();

            if let Some(term) = filter.search_term.as_deref().filter(|t| !t.trim().is_empty()) {
                query.push_str(&format!(
                    " AND ({} LIKE ? OR {} LIKE ? OR {} LIKE ?)",
                    fs_cols::FEEDBACK_TEXT,
                    fs_cols::SUBJECT,
                    fs_cols::STUDENT_NAME
                ));
                let pattern = format!("%{}%", term.trim());
                params.push(Box::new(pattern.clone()));
                params.push(Box::new(pattern.clone()));
                params.push(Box::new(pattern));
            }

            if let Some(category) = filter.category {
                query.push_str(&format!(" AND {} = ?", fs_cols::CATEGORY));
                params.push(Box::new(category.label()));
            }

            if let Some(status) = filter.status {
                query.push_str(&format!(" AND {} = ?", fs_cols::STATUS));
                params.push(Box::new(status.label()));
            }

            if let Some(priority) = filter.priority {
                query.push_str(&format!(" AND {} = ?", fs_cols::PRIORITY));
                params.push(Box::new(priority.label()));
            }

            if let Some(from) = filter.from {
                query.push_str(&format!(" AND date({}) >= ?", fs_cols::SUBMISSION_DATE));
                params.push(Box::new(from.format("%Y-%m-%d").to_string()));
            }

            if let Some(anonymous) = filter.anonymous {
                query.push_str(&format!(" AND COALESCE({}, 0) = ?", fs_cols::IS_ANONYMOUS));
                params.push(Box::new(anonymous));
            }

            if let Some(to) = filter.to {
                query.push_str(&format!(" AND date({}) <= ?", fs_cols::SUBMISSION_DATE));
                params.push(Box::new(to.format("%Y-%m-%d").to_string()));
            }

            query.push_str(&format!(
                " ORDER BY {} DESC, {} DESC",
                fs_cols::SUBMISSION_DATE,
                fs_cols::ID
            ));

            let mut stmt = conn.prepare(&query)?;
            let rows = stmt.query_map(rusqlite::params_from_iter(params.iter()), map_submission)?;
            let collected = rows.collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(collected)
        })
    }

    /// Filtered submissions; empty if the query failed
    pub fn search(&self, filter: &SubmissionFilter) -> Vec<Submission> {
        self.try_search(filter).unwrap_or_else(|e| {
            error!(error = %e, "Failed to search feedback");
            Vec::new()
        })
    }

    /// Count and mean priority score per category, largest first
    pub fn category_summary(&self) -> Result<Vec<CategorySummary>> {
        self.instrumented("category_summary", || {
            let conn = self.connect()?;
            let mut stmt = conn.prepare(&format!(
                "SELECT {cat}, COUNT(*) AS count,
                        AVG(CASE {pri} WHEN 'High' THEN 3 WHEN 'Medium' THEN 2 ELSE 1 END)
                 FROM {table}
                 GROUP BY {cat}
                 ORDER BY count DESC, {cat} ASC",
                cat = fs_cols::CATEGORY,
                pri = fs_cols::PRIORITY,
                table = fs_cols::TABLE
            ))?;
            let rows = stmt.query_map([], |row| {
                Ok(CategorySummary {
                    category: row.get(0)?,
                    count: count_at(row, 1)?,
                    avg_priority_score: row.get(2)?,
                })
            })?;
            let collected = rows.collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(collected)
        })
    }

    /// Submissions and high-priority submissions per day, newest day first
    pub fn daily_trends(&self, limit: usize) -> Result<Vec<DailyTrend>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        self.instrumented("daily_trends", || {
            let conn = self.connect()?;
            let mut stmt = conn.prepare(&format!(
                "SELECT date({date}) AS day, COUNT(*),
                        SUM(CASE WHEN {pri} = 'High' THEN 1 ELSE 0 END)
                 FROM {table}
                 WHERE date({date}) IS NOT NULL
                 GROUP BY day
                 ORDER BY day DESC
                 LIMIT ?",
                date = fs_cols::SUBMISSION_DATE,
                pri = fs_cols::PRIORITY,
                table = fs_cols::TABLE
            ))?;
            let rows = stmt.query_map(params![limit], |row| {
                let day: String = row.get(0)?;
                let date = NaiveDate::parse_from_str(&day, "%Y-%m-%d").map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e))
                })?;
                Ok(DailyTrend {
                    date,
                    submissions: count_at(row, 1)?,
                    high_priority: count_at(row, 2)?,
                })
            })?;
            let collected = rows.collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(collected)
        })
    }

    /// Count and mean days open per status, measured against `now`
    pub fn status_summary(&self, now: NaiveDateTime) -> Result<Vec<StatusSummary>> {
        let now = now.format(SUBMISSION_DATE_FORMAT).to_string();

        self.instrumented("status_summary", || {
            let conn = self.connect()?;
            let mut stmt = conn.prepare(&format!(
                "SELECT COALESCE({status}, 'Pending') AS st, COUNT(*),
                        AVG(julianday(?) - julianday({date}))
                 FROM {table}
                 GROUP BY st
                 ORDER BY st ASC",
                status = fs_cols::STATUS,
                date = fs_cols::SUBMISSION_DATE,
                table = fs_cols::TABLE
            ))?;
            let rows = stmt.query_map(params![now], |row| {
                Ok(StatusSummary {
                    status: row.get(0)?,
                    count: count_at(row, 1)?,
                    avg_days_open: row.get::<_, Option<f64>>(2)?.unwrap_or(0.0),
                })
            })?;
            let collected = rows.collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(collected)
        })
    }

    /// Count per (priority, category) pair
    pub fn priority_distribution(&self) -> Result<Vec<PriorityBreakdown>> {
        self.instrumented("priority_distribution", || {
            let conn = self.connect()?;
            let mut stmt = conn.prepare(&format!(
                "SELECT {pri}, {cat}, COUNT(*) AS count
                 FROM {table}
                 GROUP BY {pri}, {cat}
                 ORDER BY {pri}, count DESC, {cat}",
                pri = fs_cols::PRIORITY,
                cat = fs_cols::CATEGORY,
                table = fs_cols::TABLE
            ))?;
            let rows = stmt.query_map([], |row| {
                Ok(PriorityBreakdown {
                    priority: row.get(0)?,
                    category: row.get(1)?,
                    count: count_at(row, 2)?,
                })
            })?;
            let collected = rows.collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(collected)
        })
    }

    /// Fail with `NotFound` unless a submission with `id` exists
    pub fn ensure_exists(&self, id: i64) -> Result<()> {
        match self.try_get(id)? {
            Some(_) => Ok(()),
            None => Err(FeedbackError::NotFound(id)),
        }
    }
}

fn count_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<usize> {
    let n: Option<i64> = row.get(idx)?;
    Ok(usize::try_from(n.unwrap_or(0)).unwrap_or(0))
}

fn conversion_error(idx: usize, err: FeedbackError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

/// Map a database row to a Submission
fn map_submission(row: &Row<'_>) -> rusqlite::Result<Submission> {
    let category: String = row.get(fs_cols::CATEGORY)?;
    let priority: Option<String> = row.get(fs_cols::PRIORITY)?;
    let status: Option<String> = row.get(fs_cols::STATUS)?;
    let category_idx = row.as_ref().column_index(fs_cols::CATEGORY)?;
    let status_idx = row.as_ref().column_index(fs_cols::STATUS)?;

    Ok(Submission {
        id: row.get(fs_cols::ID)?,
        student_id: row.get(fs_cols::STUDENT_ID)?,
        student_name: row.get(fs_cols::STUDENT_NAME)?,
        email: row.get(fs_cols::EMAIL)?,
        category: category
            .parse::<Category>()
            .map_err(|e| conversion_error(category_idx, e))?,
        subject: row.get(fs_cols::SUBJECT)?,
        feedback_text: row.get(fs_cols::FEEDBACK_TEXT)?,
        // Unknown priority labels read back as unset
        priority: priority.and_then(|p| p.parse().ok()),
        is_anonymous: row
            .get::<_, Option<bool>>(fs_cols::IS_ANONYMOUS)?
            .unwrap_or(false),
        submission_date: row.get(fs_cols::SUBMISSION_DATE)?,
        status: status
            .map(|s| s.parse::<Status>())
            .transpose()
            .map_err(|e| conversion_error(status_idx, e))?
            .unwrap_or_default(),
        admin_notes: row.get(fs_cols::ADMIN_NOTES)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Priority};
    use tempfile::TempDir;

    fn store() -> (TempDir, SubmissionStore) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = SubmissionStore::open(dir.path().join("feedback.db"))
            .expect("Failed to open store");
        (dir, store)
    }

    fn submission(text: &str) -> NewSubmission {
        NewSubmission {
            student_id: "CU2021001".to_string(),
            student_name: Some("Asha".to_string()),
            email: None,
            category: Category::AcademicIssues,
            subject: Some("Grading".to_string()),
            feedback_text: text.to_string(),
            priority: Some(Priority::High),
            is_anonymous: false,
        }
    }

    #[test]
    fn test_insert_defaults_to_pending() {
        let (_dir, store) = store();
        assert!(store.insert(&submission("Exams are returned late")));

        let rows = store.fetch_all();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, Status::Pending);
        assert!(rows[0].submitted_at().is_some());
    }

    #[test]
    fn test_update_keeps_notes_when_blank() {
        let (_dir, store) = store();
        let id = store
            .try_insert(&submission("Exams are returned late"))
            .expect("Failed to insert");

        assert!(store.update_status(id, Status::InProgress, Some("Asked the department")));
        assert!(store.update_status(id, Status::Resolved, Some("  ")));

        let row = store.try_get(id).expect("Failed to get").expect("row exists");
        assert_eq!(row.status, Status::Resolved);
        assert_eq!(row.admin_notes.as_deref(), Some("Asked the department"));
    }

    #[test]
    fn test_broken_path_returns_sentinels() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = SubmissionStore::new(dir.path());
        assert!(store.fetch_all().is_empty());
        assert!(!store.update_status(1, Status::Closed, None));
        assert!(store.metrics().snapshot().db_failures >= 2);
    }
}
