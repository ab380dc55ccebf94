//! Error types for the feedback-insights library.
//!
//! This module provides custom error types using `thiserror` so that store,
//! validation and snapshot failures can be told apart by callers.

use thiserror::Error;

/// Errors that can occur in the feedback-insights application.
#[derive(Error, Debug)]
pub enum FeedbackError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reading or writing errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A submission failed validation before reaching the store
    #[error("Validation error: {0}")]
    Validation(String),

    /// Category label outside the fixed set
    #[error("Invalid category: {0}")]
    InvalidCategory(String),

    /// Priority label outside Low/Medium/High
    #[error("Invalid priority: {0}")]
    InvalidPriority(String),

    /// Status label outside the admin workflow states
    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    /// Invalid date format
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Admin operation attempted without a verified access code
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Submission id not present in the store
    #[error("Submission not found: {0}")]
    NotFound(i64),
}

/// Convenience type alias for Result with FeedbackError
pub type Result<T> = std::result::Result<T, FeedbackError>;

