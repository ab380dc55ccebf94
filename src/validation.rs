use chrono::NaiveDate;
use std::path::Path;

use crate::error::{FeedbackError, Result};
use crate::models::NewSubmission;

/// Longest accepted student identifier
pub const MAX_STUDENT_ID_LEN: usize = 50;
/// Longest accepted display name
pub const MAX_NAME_LEN: usize = 100;
/// Longest accepted subject line
pub const MAX_SUBJECT_LEN: usize = 200;
/// Longest accepted feedback body
pub const MAX_FEEDBACK_LEN: usize = 10_000;

fn invalid(message: impl Into<String>) -> FeedbackError {
    FeedbackError::Validation(message.into())
}

/// Validation utilities for input sanitization and edge case handling
#[derive(Debug, Copy, Clone)]
pub struct InputValidator;

impl InputValidator {
    /// Validate student identifier
    pub fn validate_student_id(student_id: &str) -> Result<()> {
        if student_id.trim().is_empty() {
            return Err(invalid("Student ID is required"));
        }

        if student_id.chars().count() > MAX_STUDENT_ID_LEN {
            return Err(invalid(format!(
                "Student ID too long (max {MAX_STUDENT_ID_LEN} characters)"
            )));
        }

        if student_id.chars().any(char::is_control) {
            return Err(invalid("Student ID contains invalid characters"));
        }

        Ok(())
    }

    /// Validate student display name
    pub fn validate_student_name(name: &str) -> Result<()> {
        if name.chars().count() > MAX_NAME_LEN {
            return Err(invalid(format!(
                "Student name too long (max {MAX_NAME_LEN} characters)"
            )));
        }

        // Check for potentially dangerous characters
        if name.contains('\0') || name.contains('\r') || name.contains('\n') {
            return Err(invalid("Student name contains invalid characters"));
        }

        Ok(())
    }

    /// Validate email format
    pub fn validate_email(email: &str) -> Result<()> {
        if email.trim().is_empty() {
            return Err(invalid("Email cannot be empty"));
        }

        if email.len() > 254 {
            return Err(invalid("Email too long (max 254 characters)"));
        }

        let Some((local_part, domain_part)) = email.split_once('@') else {
            return Err(invalid("Email must contain @ symbol"));
        };

        if domain_part.contains('@') {
            return Err(invalid("Email must have exactly one @ symbol"));
        }

        if local_part.is_empty() || local_part.len() > 64 {
            return Err(invalid("Email local part invalid"));
        }

        if domain_part.is_empty() || !domain_part.contains('.') {
            return Err(invalid("Email domain invalid"));
        }

        Ok(())
    }

    /// Validate subject line
    pub fn validate_subject(subject: &str) -> Result<()> {
        if subject.chars().count() > MAX_SUBJECT_LEN {
            return Err(invalid(format!(
                "Subject too long (max {MAX_SUBJECT_LEN} characters)"
            )));
        }

        Ok(())
    }

    /// Validate feedback body
    pub fn validate_feedback_text(text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Err(invalid("Detailed feedback is required"));
        }

        if text.chars().count() > MAX_FEEDBACK_LEN {
            return Err(invalid(format!(
                "Feedback too long (max {MAX_FEEDBACK_LEN} characters)"
            )));
        }

        Ok(())
    }

    /// Validate every field of a submission before it is written
    pub fn validate_new_submission(submission: &NewSubmission) -> Result<()> {
        Self::validate_student_id(&submission.student_id)?;
        Self::validate_feedback_text(&submission.feedback_text)?;

        if let Some(name) = &submission.student_name {
            Self::validate_student_name(name)?;
        }
        if let Some(email) = &submission.email {
            Self::validate_email(email)?;
        }
        if let Some(subject) = &submission.subject {
            Self::validate_subject(subject)?;
        }

        Ok(())
    }

    /// Sanitize text fields and turn blank optionals into `None`, then validate
    pub fn prepare_submission(submission: NewSubmission) -> Result<NewSubmission> {
        let optional = |value: Option<String>| {
            value
                .map(|v| Self::sanitize_text(&v))
                .filter(|v| !v.is_empty())
        };

        let prepared = NewSubmission {
            student_id: Self::sanitize_text(&submission.student_id),
            student_name: optional(submission.student_name),
            email: optional(submission.email),
            category: submission.category,
            subject: optional(submission.subject),
            feedback_text: Self::sanitize_text(&submission.feedback_text),
            priority: submission.priority,
            is_anonymous: submission.is_anonymous,
        };

        Self::validate_new_submission(&prepared)?;
        Ok(prepared)
    }

    /// Validate date range
    pub fn validate_date_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<()> {
        if let (Some(start_date), Some(end_date)) = (start, end) {
            if start_date > end_date {
                return Err(invalid("Start date cannot be after end date"));
            }
        }

        Ok(())
    }

    /// Parse a `YYYY-MM-DD` date argument
    pub fn parse_date(value: &str) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
            .map_err(|_| FeedbackError::InvalidDate(format!("{value} (expected YYYY-MM-DD)")))
    }

    /// Sanitize text input
    #[must_use]
    pub fn sanitize_text(text: &str) -> String {
        text.chars()
            .filter(|c| !c.is_control() || *c == '\n' || *c == '\t' || *c == '\r')
            .collect::<String>()
            .trim()
            .to_string()
    }

    /// Validate database file path
    pub fn validate_database_path(path: &Path) -> Result<()> {
        let path_str = path.to_string_lossy();
        if path_str.trim().is_empty() {
            return Err(FeedbackError::InvalidConfig(
                "Database path cannot be empty".to_string(),
            ));
        }

        if path.is_dir() {
            return Err(FeedbackError::InvalidConfig(format!(
                "Database path is a directory: {}",
                path.display()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Priority};

    fn submission(text: &str) -> NewSubmission {
        NewSubmission {
            student_id: "CU2021001".to_string(),
            student_name: Some("  ".to_string()),
            email: Some(String::new()),
            category: Category::Facilities,
            subject: Some(" Projector ".to_string()),
            feedback_text: text.to_string(),
            priority: Some(Priority::Medium),
            is_anonymous: false,
        }
    }

    #[test]
    fn test_prepare_blanks_become_none() {
        let prepared = InputValidator::prepare_submission(submission("Broken projector"))
            .expect("valid submission");
        assert_eq!(prepared.student_name, None);
        assert_eq!(prepared.email, None);
        assert_eq!(prepared.subject.as_deref(), Some("Projector"));
    }

    #[test]
    fn test_prepare_rejects_blank_body() {
        let err = InputValidator::prepare_submission(submission("   ")).unwrap_err();
        assert!(matches!(err, FeedbackError::Validation(_)));
    }
}
