//! Data models for feedback submissions and derived analytics
//!
//! This module contains the typed submission records stored in SQLite, the
//! closed label sets used to classify them, and the tallies produced by the
//! text analyzer.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::FeedbackError;

/// Timestamp layout used by the `submission_date` column
pub const SUBMISSION_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Grievance category, one of four fixed administrative labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    /// Teaching, grading and course content
    #[serde(rename = "Academic Issues")]
    AcademicIssues,
    /// Registration, scheduling and staff services
    #[serde(rename = "Administrative Issues")]
    AdministrativeIssues,
    /// Buildings, rooms and equipment
    Facilities,
    /// Health, safety and student support
    #[serde(rename = "Student Welfare")]
    StudentWelfare,
}

impl Category {
    /// All categories in their fixed reporting order
    pub const ALL: [Self; 4] = [
        Self::AcademicIssues,
        Self::AdministrativeIssues,
        Self::Facilities,
        Self::StudentWelfare,
    ];

    /// The label stored in the database and shown to users
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::AcademicIssues => "Academic Issues",
            Self::AdministrativeIssues => "Administrative Issues",
            Self::Facilities => "Facilities",
            Self::StudentWelfare => "Student Welfare",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = FeedbackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FeedbackError::InvalidCategory(s.to_string()))
    }
}

/// Urgency chosen by the submitter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    /// Low urgency
    Low,
    /// Medium urgency
    Medium,
    /// High urgency
    High,
}

impl Priority {
    /// All priorities from lowest to highest
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    /// The label stored in the database
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Priority {
    type Err = FeedbackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FeedbackError::InvalidPriority(s.to_string()))
    }
}

/// Admin workflow state of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Status {
    /// Newly submitted, not yet looked at
    #[default]
    Pending,
    /// Being handled by staff
    #[serde(rename = "In Progress")]
    InProgress,
    /// Handled
    Resolved,
    /// Closed without further action
    Closed,
}

impl Status {
    /// All statuses in workflow order
    pub const ALL: [Self; 4] = [Self::Pending, Self::InProgress, Self::Resolved, Self::Closed];

    /// The label stored in the database
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
            Self::Closed => "Closed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Status {
    type Err = FeedbackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|st| {
                st.label().eq_ignore_ascii_case(wanted)
                    || st.label().replace(' ', "-").eq_ignore_ascii_case(wanted)
                    || st.label().replace(' ', "_").eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| FeedbackError::InvalidStatus(s.to_string()))
    }
}

/// A stored feedback submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    /// Auto-assigned primary key
    pub id: i64,
    /// Opaque student identifier
    pub student_id: String,
    /// Display name, if given
    pub student_name: Option<String>,
    /// Contact address, if given
    pub email: Option<String>,
    /// Grievance category
    pub category: Category,
    /// Short summary line
    pub subject: Option<String>,
    /// Free-text body, always present
    pub feedback_text: String,
    /// Urgency, if recorded
    pub priority: Option<Priority>,
    /// True when the submitter asked to stay anonymous
    pub is_anonymous: bool,
    /// Creation timestamp as stored (`YYYY-MM-DD HH:MM:SS`)
    pub submission_date: String,
    /// Admin workflow state
    pub status: Status,
    /// Free-text annotation left by an admin
    pub admin_notes: Option<String>,
}

impl Submission {
    /// Parse the stored timestamp, `None` if it is malformed
    #[must_use]
    pub fn submitted_at(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(self.submission_date.trim(), SUBMISSION_DATE_FORMAT).ok()
    }
}

/// Data for creating a new submission
///
/// Status is not part of the write model: every insert starts as
/// [`Status::Pending`] and only the admin workflow moves it on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubmission {
    /// Opaque student identifier
    pub student_id: String,
    /// Display name, if given
    pub student_name: Option<String>,
    /// Contact address, if given
    pub email: Option<String>,
    /// Grievance category
    pub category: Category,
    /// Short summary line
    pub subject: Option<String>,
    /// Free-text body
    pub feedback_text: String,
    /// Urgency
    pub priority: Option<Priority>,
    /// True when the submitter asked to stay anonymous
    pub is_anonymous: bool,
}

/// Filters for searching stored submissions
#[derive(Debug, Default, Clone)]
pub struct SubmissionFilter {
    /// Substring matched against feedback text, subject and student name
    pub search_term: Option<String>,
    /// Exact category
    pub category: Option<Category>,
    /// Exact status
    pub status: Option<Status>,
    /// Exact priority
    pub priority: Option<Priority>,
    /// Earliest submission day, inclusive
    pub from: Option<NaiveDate>,
    /// Latest submission day, inclusive
    pub to: Option<NaiveDate>,
    /// Only anonymous (`true`) or only named (`false`) submissions
    pub anonymous: Option<bool>,
}

/// A normalized token and how often it occurred across a corpus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeEntry {
    /// Normalized token
    pub token: String,
    /// Occurrence count, never zero
    pub frequency: usize,
}

/// Per-category document counts, one independent counter per category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryTally {
    counts: BTreeMap<Category, usize>,
}

impl Default for CategoryTally {
    fn default() -> Self {
        Self {
            counts: Category::ALL.into_iter().map(|c| (c, 0)).collect(),
        }
    }
}

impl CategoryTally {
    /// Count for one category
    #[must_use]
    pub fn get(&self, category: Category) -> usize {
        self.counts.get(&category).copied().unwrap_or(0)
    }

    /// Add one document to a category
    pub fn increment(&mut self, category: Category) {
        self.add(category, 1);
    }

    /// Add `n` documents to a category
    pub fn add(&mut self, category: Category, n: usize) {
        *self.counts.entry(category).or_insert(0) += n;
    }

    /// Counts in fixed category order
    pub fn iter(&self) -> impl Iterator<Item = (Category, usize)> + '_ {
        self.counts.iter().map(|(c, n)| (*c, *n))
    }
}

/// Sentiment vote of a single document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sentiment {
    /// More positive than negative lexicon hits
    Positive,
    /// More negative than positive lexicon hits
    Negative,
    /// Equal hits, including none at all
    Neutral,
}

impl Sentiment {
    /// All sentiments in reporting order
    pub const ALL: [Self; 3] = [Self::Positive, Self::Negative, Self::Neutral];

    /// Display label
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Positive => "Positive",
            Self::Negative => "Negative",
            Self::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Sentiment {
    type Err = FeedbackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|st| st.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FeedbackError::Validation(format!("Unknown sentiment label: {s}")))
    }
}

/// Per-sentiment document counts; every document lands in exactly one bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SentimentTally {
    counts: BTreeMap<Sentiment, usize>,
}

impl Default for SentimentTally {
    fn default() -> Self {
        Self {
            counts: Sentiment::ALL.into_iter().map(|s| (s, 0)).collect(),
        }
    }
}

impl SentimentTally {
    /// Count for one sentiment
    #[must_use]
    pub fn get(&self, sentiment: Sentiment) -> usize {
        self.counts.get(&sentiment).copied().unwrap_or(0)
    }

    /// Record one document's vote
    pub fn record(&mut self, sentiment: Sentiment) {
        self.add(sentiment, 1);
    }

    /// Record `n` votes at once
    pub fn add(&mut self, sentiment: Sentiment, n: usize) {
        *self.counts.entry(sentiment).or_insert(0) += n;
    }

    /// Number of documents scored
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Counts in Positive, Negative, Neutral order
    pub fn iter(&self) -> impl Iterator<Item = (Sentiment, usize)> + '_ {
        self.counts.iter().map(|(s, n)| (*s, *n))
    }
}

/// Per-category counts with the mean priority score (High=3, Medium=2, else 1)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    /// Category label as stored
    pub category: String,
    /// Submissions in this category
    pub count: usize,
    /// Mean priority score
    pub avg_priority_score: f64,
}

/// Submissions received on one calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTrend {
    /// Calendar date
    pub date: NaiveDate,
    /// Submissions that day
    pub submissions: usize,
    /// Of which marked High priority
    pub high_priority: usize,
}

/// Per-status counts with how long items have been open on average
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSummary {
    /// Status label as stored
    pub status: String,
    /// Submissions in this status
    pub count: usize,
    /// Mean days since submission
    pub avg_days_open: f64,
}

/// Count of submissions for a (priority, category) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityBreakdown {
    /// Priority label as stored, if any
    pub priority: Option<String>,
    /// Category label as stored
    pub category: String,
    /// Submissions in this cell
    pub count: usize,
}
