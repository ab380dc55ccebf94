//! Unit tests for validation.rs module

use chrono::NaiveDate;
use feedback_insights::error::FeedbackError;
use feedback_insights::models::{Category, NewSubmission, Priority};
use feedback_insights::validation::{InputValidator, MAX_FEEDBACK_LEN, MAX_STUDENT_ID_LEN};
use std::path::Path;

fn valid_submission() -> NewSubmission {
    NewSubmission {
        student_id: "CU2021001".to_string(),
        student_name: Some("Ravi Kumar".to_string()),
        email: Some("ravi.kumar@cu.edu".to_string()),
        category: Category::AdministrativeIssues,
        subject: Some("Fee receipt".to_string()),
        feedback_text: "The accounts office has not issued my fee receipt.".to_string(),
        priority: Some(Priority::Medium),
        is_anonymous: false,
    }
}

#[test]
fn test_valid_submission_passes() {
    assert!(InputValidator::validate_new_submission(&valid_submission()).is_ok());
}

#[test]
fn test_student_id_rules() {
    assert!(InputValidator::validate_student_id("CU2021001").is_ok());
    assert!(InputValidator::validate_student_id("").is_err());
    assert!(InputValidator::validate_student_id("   ").is_err());
    assert!(InputValidator::validate_student_id(&"x".repeat(MAX_STUDENT_ID_LEN + 1)).is_err());
    assert!(InputValidator::validate_student_id("CU\u{7}01").is_err());
}

#[test]
fn test_feedback_text_rules() {
    assert!(InputValidator::validate_feedback_text("Too few lab slots").is_ok());
    assert!(InputValidator::validate_feedback_text("").is_err());
    assert!(InputValidator::validate_feedback_text("\n\t ").is_err());
    assert!(InputValidator::validate_feedback_text(&"a".repeat(MAX_FEEDBACK_LEN + 1)).is_err());
}

#[test]
fn test_email_validation() {
    assert!(InputValidator::validate_email("student@cu.edu").is_ok());
    assert!(InputValidator::validate_email("first.last@dept.cu.ac.in").is_ok());

    assert!(InputValidator::validate_email("").is_err());
    assert!(InputValidator::validate_email("no-at-sign.cu.edu").is_err());
    assert!(InputValidator::validate_email("a@b@cu.edu").is_err());
    assert!(InputValidator::validate_email("@cu.edu").is_err());
    assert!(InputValidator::validate_email("student@localhost").is_err());
}

#[test]
fn test_malformed_email_rejects_submission() {
    let mut submission = valid_submission();
    submission.email = Some("ravi.kumar".to_string());

    let err = InputValidator::validate_new_submission(&submission).expect_err("Email must be rejected");
    assert!(matches!(err, FeedbackError::Validation(_)));
}

#[test]
fn test_name_with_line_break_is_rejected() {
    let mut submission = valid_submission();
    submission.student_name = Some("Ravi\nKumar".to_string());
    assert!(InputValidator::validate_new_submission(&submission).is_err());
}

#[test]
fn test_prepare_submission_trims_and_blanks() {
    let mut submission = valid_submission();
    submission.student_id = "  CU2021001 ".to_string();
    submission.email = Some("   ".to_string());
    submission.feedback_text = "  Fee receipt missing\u{0}  ".to_string();

    let prepared = InputValidator::prepare_submission(submission).expect("Submission should be valid");
    assert_eq!(prepared.student_id, "CU2021001");
    assert_eq!(prepared.email, None);
    assert_eq!(prepared.feedback_text, "Fee receipt missing");
}

#[test]
fn test_sanitize_text_keeps_line_breaks() {
    assert_eq!(InputValidator::sanitize_text("  line one\nline two\u{1b}  "), "line one\nline two");
}

#[test]
fn test_date_range_validation() {
    let early = NaiveDate::from_ymd_opt(2024, 1, 1);
    let late = NaiveDate::from_ymd_opt(2024, 2, 1);

    assert!(InputValidator::validate_date_range(early, late).is_ok());
    assert!(InputValidator::validate_date_range(early, None).is_ok());
    assert!(InputValidator::validate_date_range(late, early).is_err());
}

#[test]
fn test_parse_date() {
    assert_eq!(
        InputValidator::parse_date("2024-03-15").expect("valid date"),
        NaiveDate::from_ymd_opt(2024, 3, 15).expect("valid date")
    );
    assert!(matches!(
        InputValidator::parse_date("15/03/2024"),
        Err(FeedbackError::InvalidDate(_))
    ));
}

#[test]
fn test_database_path_validation() {
    assert!(InputValidator::validate_database_path(Path::new("feedback_system.db")).is_ok());
    assert!(InputValidator::validate_database_path(Path::new("")).is_err());
    assert!(InputValidator::validate_database_path(&std::env::temp_dir()).is_err());
}

#[test]
fn test_label_parsing() {
    assert_eq!("facilities".parse::<Category>().expect("known category"), Category::Facilities);
    assert!(matches!("Sports".parse::<Category>(), Err(FeedbackError::InvalidCategory(_))));
    assert_eq!("HIGH".parse::<Priority>().expect("known priority"), Priority::High);
    assert!(matches!("Urgent".parse::<Priority>(), Err(FeedbackError::InvalidPriority(_))));
}
