//! Feedback Insights - Student Feedback Intake and Analysis
//!
//! A Rust library for collecting university feedback and grievances in a
//! SQLite store and turning the free text into themes, categories and
//! sentiment for the people who act on it.
//!
//! # Features
//!
//! - Validated submission intake with an admin status workflow
//! - Text normalization with stop-word removal and lemmatization
//! - Theme extraction, keyword categorization and lexicon sentiment
//! - Aggregated analytics with trends and automated recommendations
//! - CSV snapshots and analysis of external review datasets

/// Analytics aggregation and recommendations
pub mod analytics;
/// Admin authorization context
pub mod auth;
/// Configuration management
pub mod config;
/// External review dataset analysis
pub mod dataset;
/// Submission store
pub mod db;
/// Error types
pub mod error;
/// Noun lemmatization
pub mod lemmatizer;
/// Stop words, category keywords and sentiment lexicons
pub mod lexicon;
/// Logging setup and utilities
pub mod logging;
/// Metrics collection
pub mod metrics;
/// Data models and structures
pub mod models;
/// Text analysis pipeline
pub mod nlp;
/// Database schema definitions
pub mod schema;
/// CSV snapshots of analysis results
pub mod snapshot;
/// Input validation and sanitization
pub mod validation;

// Re-export key components for easier access
pub use analytics::{AnalyticsReport, FeedbackAnalytics};
pub use auth::AdminAuth;
pub use db::SubmissionStore;
pub use error::{FeedbackError, Result};
pub use models::{Category, NewSubmission, Priority, Sentiment, Status, Submission, SubmissionFilter};
pub use nlp::TextAnalyzer;
