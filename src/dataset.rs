//! Analysis of external review datasets.
//!
//! Runs the same text pipeline used for stored submissions over a CSV export
//! of course reviews (one review per row, free text in a `comments` column)
//! and saves the results as snapshots for the analytics views.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use csv::{Reader, StringRecord};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{FeedbackError, Result};
use crate::models::{CategoryTally, SentimentTally, ThemeEntry};
use crate::nlp::{CorpusAnalysis, TextAnalyzer, DEFAULT_TOP_THEMES};
use crate::snapshot::{write_snapshots, SnapshotPaths};

/// Default free-text column
pub const DEFAULT_TEXT_COLUMN: &str = "comments";
/// Default star rating column
pub const DEFAULT_RATING_COLUMN: &str = "star_rating";
/// Default difficulty column
pub const DEFAULT_DIFFICULTY_COLUMN: &str = "diff_index";

/// Themes kept in the JSON summary
const SUMMARY_THEMES: usize = 10;

/// One review row; blank cells are `None`
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewRecord {
    pub text: Option<String>,
    pub rating: Option<f64>,
    pub difficulty: Option<f64>,
}

/// Everything computed over a dataset
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetInsights {
    pub total_reviews: usize,
    /// Mean of the rating column, `None` if absent or empty
    pub avg_rating: Option<f64>,
    /// Mean of the difficulty column, `None` if absent or empty
    pub avg_difficulty: Option<f64>,
    /// Reviews per rating value as written in the file
    pub rating_distribution: BTreeMap<String, usize>,
    pub analysis: CorpusAnalysis,
}

#[derive(Debug, Serialize)]
struct DatasetSummary<'a> {
    total_reviews: usize,
    avg_rating: Option<f64>,
    avg_difficulty: Option<f64>,
    top_themes: &'a [ThemeEntry],
    category_distribution: &'a CategoryTally,
    sentiment_distribution: &'a SentimentTally,
    rating_distribution: &'a BTreeMap<String, usize>,
}

/// Analyzer for review datasets stored as CSV
pub struct DatasetAnalyzer {
    analyzer: TextAnalyzer,
    text_column: String,
    rating_column: String,
    difficulty_column: String,
    top_themes: usize,
}

impl DatasetAnalyzer {
    /// Analyzer reading the default column names
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            analyzer: TextAnalyzer::new()?,
            text_column: DEFAULT_TEXT_COLUMN.to_string(),
            rating_column: DEFAULT_RATING_COLUMN.to_string(),
            difficulty_column: DEFAULT_DIFFICULTY_COLUMN.to_string(),
            top_themes: DEFAULT_TOP_THEMES,
        })
    }

    /// Read free text from `column` instead
    #[must_use]
    pub fn with_text_column(mut self, column: impl Into<String>) -> Self {
        self.text_column = column.into();
        self
    }

    /// Keep `top_n` themes
    #[must_use]
    pub const fn with_top_themes(mut self, top_n: usize) -> Self {
        self.top_themes = top_n;
        self
    }

    /// Read every review from a CSV file with a header row
    pub fn load(&self, path: &Path) -> Result<Vec<ReviewRecord>> {
        let mut reader = Reader::from_path(path)?;
        let headers = reader.headers()?.clone();

        let text_idx = column_index(&headers, &self.text_column).ok_or_else(|| {
            FeedbackError::Validation(format!(
                "Column '{}' not found in {}",
                self.text_column,
                path.display()
            ))
        })?;
        let rating_idx = column_index(&headers, &self.rating_column);
        let difficulty_idx = column_index(&headers, &self.difficulty_column);

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            records.push(ReviewRecord {
                text: cell(&row, Some(text_idx)).map(str::to_string),
                rating: cell(&row, rating_idx).and_then(|v| v.parse().ok()),
                difficulty: cell(&row, difficulty_idx).and_then(|v| v.parse().ok()),
            });
        }

        debug!(path = %path.display(), rows = records.len(), "Loaded review dataset");
        Ok(records)
    }

    /// Analyze already loaded reviews
    #[must_use]
    pub fn analyze_records(&self, records: &[ReviewRecord]) -> DatasetInsights {
        let corpus: Vec<Option<&str>> = records.iter().map(|r| r.text.as_deref()).collect();
        let analysis = self.analyzer.analyze(&corpus, self.top_themes);

        let mut rating_distribution = BTreeMap::new();
        for rating in records.iter().filter_map(|r| r.rating) {
            *rating_distribution.entry(format_rating(rating)).or_insert(0) += 1;
        }

        DatasetInsights {
            total_reviews: records.len(),
            avg_rating: mean(records.iter().filter_map(|r| r.rating)),
            avg_difficulty: mean(records.iter().filter_map(|r| r.difficulty)),
            rating_distribution,
            analysis,
        }
    }

    /// Load and analyze a CSV file
    pub fn analyze_file(&self, path: &Path) -> Result<DatasetInsights> {
        let records = self.load(path)?;
        let insights = self.analyze_records(&records);
        info!(
            path = %path.display(),
            reviews = insights.total_reviews,
            "Analyzed review dataset"
        );
        Ok(insights)
    }

    /// Write the three CSV snapshots plus `<prefix>_summary.json` into `dir`
    pub fn save(&self, insights: &DatasetInsights, dir: &Path, prefix: &str) -> Result<SnapshotPaths> {
        let paths = write_snapshots(dir, prefix, &insights.analysis)?;

        let summary = DatasetSummary {
            total_reviews: insights.total_reviews,
            avg_rating: insights.avg_rating.map(round2),
            avg_difficulty: insights.avg_difficulty.map(round2),
            top_themes: &insights.analysis.themes[..insights.analysis.themes.len().min(SUMMARY_THEMES)],
            category_distribution: &insights.analysis.categories,
            sentiment_distribution: &insights.analysis.sentiment,
            rating_distribution: &insights.rating_distribution,
        };
        let summary_path = dir.join(format!("{prefix}_summary.json"));
        serde_json::to_writer_pretty(BufWriter::new(File::create(&summary_path)?), &summary)?;

        debug!(path = %summary_path.display(), "Wrote dataset summary");
        Ok(paths)
    }
}

fn column_index(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim() == name)
}

fn cell(row: &StringRecord, idx: Option<usize>) -> Option<&str> {
    idx.and_then(|i| row.get(i))
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn format_rating(rating: f64) -> String {
    if rating.fract().abs() < f64::EPSILON {
        format!("{rating:.1}")
    } else {
        rating.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_of_nothing_is_none() {
        assert_eq!(mean(std::iter::empty()), None);
        assert_eq!(mean([4.0, 5.0].into_iter()), Some(4.5));
    }

    #[test]
    fn test_round2() {
        assert!((round2(1.23456) - 1.23).abs() < f64::EPSILON);
    }

    #[test]
    fn test_format_rating() {
        assert_eq!(format_rating(5.0), "5.0");
        assert_eq!(format_rating(4.5), "4.5");
    }
}
