//! Analytics aggregation over stored submissions
//!
//! Combines the text pipeline (themes, keyword categories, sentiment) with
//! plain relational counts and time-based trends, then derives a short list
//! of recommendations from the result.

use std::collections::BTreeMap;
use std::fmt;

use anyhow::Result;
use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::AnalysisConfig;
use crate::logging::OperationTimer;
use crate::models::{
    Category, CategoryTally, Priority, Sentiment, SentimentTally, Status, Submission, ThemeEntry,
};
use crate::nlp::{TextAnalyzer, DEFAULT_TOP_THEMES};

/// Default length of the daily trend window
pub const DEFAULT_TREND_WINDOW_DAYS: i64 = 30;

/// Negative share above which staff attention is recommended
const NEGATIVE_ATTENTION_PCT: f64 = 30.0;
/// Negative share below which current performance is acknowledged
const NEGATIVE_GOOD_PCT: f64 = 15.0;
/// Anonymous share above which trust building is recommended
const ANONYMOUS_TRUST_PCT: f64 = 50.0;

/// Kind of automated recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecommendationKind {
    /// The busiest category deserves a policy review
    PriorityFocus,
    /// Too much of the feedback is negative
    AttentionNeeded,
    /// Little of the feedback is negative
    GoodPerformance,
    /// Most submitters hide their identity
    TrustBuilding,
}

impl RecommendationKind {
    /// Heading shown before the message
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::PriorityFocus => "Priority Focus",
            Self::AttentionNeeded => "Attention Needed",
            Self::GoodPerformance => "Good Performance",
            Self::TrustBuilding => "Trust Building",
        }
    }
}

/// One automated recommendation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub message: String,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.title(), self.message)
    }
}

/// Everything the analytics view shows, computed in one pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsReport {
    /// Clock the time-based metrics were measured against
    pub generated_at: NaiveDateTime,
    pub total_feedback: usize,
    pub themes: Vec<ThemeEntry>,
    /// Keyword-derived categories, independent of the stored label
    pub categories: CategoryTally,
    pub sentiment: SentimentTally,
    /// Stored category labels
    pub category_distribution: BTreeMap<Category, usize>,
    /// Stored priorities; submissions without one are not counted
    pub priority_distribution: BTreeMap<Priority, usize>,
    pub status_distribution: BTreeMap<Status, usize>,
    pub anonymous_percentage: f64,
    /// `None` when any stored timestamp failed to parse
    pub avg_submissions_per_day: Option<f64>,
    /// Submissions per day inside the trend window; `None` on bad timestamps
    pub daily_trends: Option<BTreeMap<NaiveDate, usize>>,
    /// Submissions per `YYYY-MM` month; `None` on bad timestamps
    pub monthly_trends: Option<BTreeMap<String, usize>>,
    pub recommendations: Vec<Recommendation>,
}

impl AnalyticsReport {
    /// Zeroed report for an empty corpus
    #[must_use]
    pub fn empty(generated_at: NaiveDateTime) -> Self {
        Self {
            generated_at,
            total_feedback: 0,
            themes: Vec::new(),
            categories: CategoryTally::default(),
            sentiment: SentimentTally::default(),
            category_distribution: BTreeMap::new(),
            priority_distribution: BTreeMap::new(),
            status_distribution: BTreeMap::new(),
            anonymous_percentage: 0.0,
            avg_submissions_per_day: Some(0.0),
            daily_trends: Some(BTreeMap::new()),
            monthly_trends: Some(BTreeMap::new()),
            recommendations: Vec::new(),
        }
    }

    /// Share of scored documents voting Negative, 0 when nothing was scored
    #[must_use]
    pub fn negative_percentage(&self) -> f64 {
        percentage(self.sentiment.get(Sentiment::Negative), self.sentiment.total())
    }
}

/// Analytics engine over stored submissions
pub struct FeedbackAnalytics {
    analyzer: TextAnalyzer,
    top_themes: usize,
    trend_window_days: i64,
}

impl FeedbackAnalytics {
    /// Engine with the default theme count and trend window
    pub fn new() -> Result<Self> {
        Ok(Self {
            analyzer: TextAnalyzer::new()?,
            top_themes: DEFAULT_TOP_THEMES,
            trend_window_days: DEFAULT_TREND_WINDOW_DAYS,
        })
    }

    /// Engine configured from the `analysis` config section
    pub fn from_config(config: &AnalysisConfig) -> Result<Self> {
        Ok(Self {
            analyzer: TextAnalyzer::new()?,
            top_themes: config.top_themes,
            trend_window_days: config.trend_window_days,
        })
    }

    /// The text analyzer shared by every report
    #[must_use]
    pub const fn analyzer(&self) -> &TextAnalyzer {
        &self.analyzer
    }

    /// Compute the report against the current local time
    #[must_use]
    pub fn compute_analytics(&self, submissions: &[Submission]) -> AnalyticsReport {
        self.compute_analytics_at(submissions, Local::now().naive_local())
    }

    /// Compute the report with an explicit clock for the trend window
    #[must_use]
    pub fn compute_analytics_at(&self, submissions: &[Submission], now: NaiveDateTime) -> AnalyticsReport {
        if submissions.is_empty() {
            return AnalyticsReport::empty(now);
        }

        let timer = OperationTimer::new("compute_analytics");

        let corpus: Vec<Option<&str>> = submissions
            .iter()
            .map(|s| Some(s.feedback_text.as_str()))
            .collect();
        let text = self.analyzer.analyze(&corpus, self.top_themes);

        let mut category_distribution = BTreeMap::new();
        let mut priority_distribution = BTreeMap::new();
        let mut status_distribution = BTreeMap::new();
        let mut anonymous = 0usize;
        for submission in submissions {
            *category_distribution.entry(submission.category).or_insert(0) += 1;
            if let Some(priority) = submission.priority {
                *priority_distribution.entry(priority).or_insert(0) += 1;
            }
            *status_distribution.entry(submission.status).or_insert(0) += 1;
            if submission.is_anonymous {
                anonymous += 1;
            }
        }

        let timeline = self.timeline(submissions, now);

        let mut report = AnalyticsReport {
            generated_at: now,
            total_feedback: submissions.len(),
            themes: text.themes,
            categories: text.categories,
            sentiment: text.sentiment,
            category_distribution,
            priority_distribution,
            status_distribution,
            anonymous_percentage: percentage(anonymous, submissions.len()),
            avg_submissions_per_day: timeline.as_ref().map(|t| t.avg_per_day),
            daily_trends: timeline.as_ref().map(|t| t.daily.clone()),
            monthly_trends: timeline.map(|t| t.monthly),
            recommendations: Vec::new(),
        };
        report.recommendations = recommendations(&report);

        debug!(
            total = report.total_feedback,
            duration_ms = timer.elapsed().as_millis(),
            "Computed feedback analytics"
        );
        report
    }

    /// Date-based metrics, or `None` if any timestamp is unparsable
    fn timeline(&self, submissions: &[Submission], now: NaiveDateTime) -> Option<Timeline> {
        let mut stamps = Vec::with_capacity(submissions.len());
        for submission in submissions {
            match submission.submitted_at() {
                Some(stamp) => stamps.push(stamp),
                None => {
                    warn!(
                        id = submission.id,
                        submission_date = %submission.submission_date,
                        "Unparsable submission date, skipping date-based metrics"
                    );
                    return None;
                }
            }
        }

        let earliest = stamps.iter().min()?;
        let latest = stamps.iter().max()?;
        let span_days = (*latest - *earliest).num_days().max(1);
        #[allow(clippy::cast_precision_loss)]
        let avg_per_day = stamps.len() as f64 / span_days as f64;

        let window_start = now - Duration::days(self.trend_window_days);
        let mut daily = BTreeMap::new();
        let mut monthly = BTreeMap::new();
        for stamp in &stamps {
            if *stamp >= window_start {
                *daily.entry(stamp.date()).or_insert(0) += 1;
            }
            *monthly.entry(stamp.format("%Y-%m").to_string()).or_insert(0) += 1;
        }

        Some(Timeline {
            avg_per_day,
            daily,
            monthly,
        })
    }
}

struct Timeline {
    avg_per_day: f64,
    daily: BTreeMap<NaiveDate, usize>,
    monthly: BTreeMap<String, usize>,
}

#[allow(clippy::cast_precision_loss)]
fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

/// Recommendations derived from a finished report
#[must_use]
pub fn recommendations(report: &AnalyticsReport) -> Vec<Recommendation> {
    let mut out = Vec::new();

    // Ties go to the category listed first
    let top = report
        .category_distribution
        .iter()
        .fold(None, |best: Option<(Category, usize)>, (&category, &count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((category, count)),
        });
    if let Some((category, count)) = top {
        out.push(Recommendation {
            kind: RecommendationKind::PriorityFocus,
            message: format!(
                "{category} has the highest number of submissions ({count}). \
                 Consider reviewing policies and procedures in this area."
            ),
        });
    }

    if report.sentiment.total() > 0 {
        let negative = report.negative_percentage();
        if negative > NEGATIVE_ATTENTION_PCT {
            out.push(Recommendation {
                kind: RecommendationKind::AttentionNeeded,
                message: format!(
                    "{negative:.1}% of feedback is negative. Consider implementing improvement measures."
                ),
            });
        } else if negative < NEGATIVE_GOOD_PCT {
            out.push(Recommendation {
                kind: RecommendationKind::GoodPerformance,
                message: format!(
                    "Only {negative:.1}% of feedback is negative. Maintain current standards."
                ),
            });
        }
    }

    if report.anonymous_percentage > ANONYMOUS_TRUST_PCT {
        out.push(Recommendation {
            kind: RecommendationKind::TrustBuilding,
            message: format!(
                "{:.1}% of submissions are anonymous. Consider building more trust to encourage open feedback.",
                report.anonymous_percentage
            ),
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(stamp: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d %H:%M:%S").expect("valid timestamp")
    }

    fn submission(id: i64, text: &str, date: &str, anonymous: bool) -> Submission {
        Submission {
            id,
            student_id: format!("S{id}"),
            student_name: None,
            email: None,
            category: Category::Facilities,
            subject: None,
            feedback_text: text.to_string(),
            priority: Some(Priority::Low),
            is_anonymous: anonymous,
            submission_date: date.to_string(),
            status: Status::Pending,
            admin_notes: None,
        }
    }

    #[test]
    fn test_percentage_zero_total() {
        assert!(percentage(3, 0).abs() < f64::EPSILON);
        assert!((percentage(1, 4) - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_single_day_span_clamps_to_one() {
        let engine = FeedbackAnalytics::new().expect("Failed to create analytics");
        let subs = [
            submission(1, "Broken projector", "2024-03-01 09:00:00", false),
            submission(2, "Cold classroom", "2024-03-01 17:00:00", true),
        ];
        let report = engine.compute_analytics_at(&subs, at("2024-03-02 00:00:00"));
        assert_eq!(report.avg_submissions_per_day, Some(2.0));
        assert!((report.anonymous_percentage - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_recommendation_display() {
        let rec = Recommendation {
            kind: RecommendationKind::TrustBuilding,
            message: "60.0% of submissions are anonymous.".to_string(),
        };
        assert_eq!(rec.to_string(), "Trust Building: 60.0% of submissions are anonymous.");
    }
}
