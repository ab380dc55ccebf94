//! Database schema definitions
//!
//! This module provides constants for the table and column names used with
//! rusqlite, plus the DDL that creates them.

/// Feedback submissions table schema
pub mod feedback_submissions {
    /// Table name
    pub const TABLE: &str = "feedback_submissions";
    /// Primary key column
    pub const ID: &str = "id";
    /// Student identifier column
    pub const STUDENT_ID: &str = "student_id";
    /// Student display name column
    pub const STUDENT_NAME: &str = "student_name";
    /// Contact email column
    pub const EMAIL: &str = "email";
    /// Category label column
    pub const CATEGORY: &str = "category";
    /// Subject line column
    pub const SUBJECT: &str = "subject";
    /// Free-text body column
    pub const FEEDBACK_TEXT: &str = "feedback_text";
    /// Priority label column
    pub const PRIORITY: &str = "priority";
    /// Anonymity flag column (0/1)
    pub const IS_ANONYMOUS: &str = "is_anonymous";
    /// Submission timestamp column
    pub const SUBMISSION_DATE: &str = "submission_date";
    /// Workflow status column
    pub const STATUS: &str = "status";
    /// Admin annotation column
    pub const ADMIN_NOTES: &str = "admin_notes";

    /// Create the table if it does not exist yet
    pub const CREATE: &str = "CREATE TABLE IF NOT EXISTS feedback_submissions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        student_id TEXT NOT NULL,
        student_name TEXT,
        email TEXT,
        category TEXT NOT NULL,
        subject TEXT,
        feedback_text TEXT NOT NULL,
        priority TEXT,
        is_anonymous INTEGER,
        submission_date TEXT NOT NULL,
        status TEXT DEFAULT 'Pending',
        admin_notes TEXT
    );";
}
