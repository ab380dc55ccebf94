//! CSV snapshots of analysis results.
//!
//! Each snapshot is a two-column CSV with a header row: `<prefix>_themes.csv`
//! (`Theme,Count`), `<prefix>_categories.csv` (`Category,Count`) and
//! `<prefix>_sentiment.csv` (`Sentiment,Count`). Rows follow the order of the
//! tally they were written from, so reading a snapshot back reproduces it.

use std::fs::{create_dir_all, File};
use std::path::{Path, PathBuf};

use csv::{Reader, Writer};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::models::{CategoryTally, SentimentTally, ThemeEntry};
use crate::nlp::CorpusAnalysis;

#[derive(Debug, Serialize, Deserialize)]
struct ThemeRow {
    #[serde(rename = "Theme")]
    theme: String,
    #[serde(rename = "Count")]
    count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
struct CategoryRow {
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "Count")]
    count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
struct SentimentRow {
    #[serde(rename = "Sentiment")]
    sentiment: String,
    #[serde(rename = "Count")]
    count: usize,
}

/// Locations of the three snapshot files for one prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotPaths {
    pub themes: PathBuf,
    pub categories: PathBuf,
    pub sentiment: PathBuf,
}

impl SnapshotPaths {
    /// Paths for `prefix` inside `dir`
    #[must_use]
    pub fn new(dir: &Path, prefix: &str) -> Self {
        Self {
            themes: dir.join(format!("{prefix}_themes.csv")),
            categories: dir.join(format!("{prefix}_categories.csv")),
            sentiment: dir.join(format!("{prefix}_sentiment.csv")),
        }
    }

    /// All three paths in write order
    #[must_use]
    pub fn all(&self) -> [&Path; 3] {
        [
            self.themes.as_path(),
            self.categories.as_path(),
            self.sentiment.as_path(),
        ]
    }
}

/// Write themes as `Theme,Count` rows
pub fn write_theme_snapshot(path: &Path, themes: &[ThemeEntry]) -> Result<()> {
    let mut writer = Writer::from_writer(File::create(path)?);
    // Header comes from the row struct, so write it explicitly for an empty list
    if themes.is_empty() {
        writer.write_record(["Theme", "Count"])?;
    }
    for entry in themes {
        writer.serialize(ThemeRow {
            theme: entry.token.clone(),
            count: entry.frequency,
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Write category counts as `Category,Count` rows in fixed category order
pub fn write_category_snapshot(path: &Path, categories: &CategoryTally) -> Result<()> {
    let mut writer = Writer::from_writer(File::create(path)?);
    for (category, count) in categories.iter() {
        writer.serialize(CategoryRow {
            category: category.label().to_string(),
            count,
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Write sentiment counts as `Sentiment,Count` rows
pub fn write_sentiment_snapshot(path: &Path, sentiment: &SentimentTally) -> Result<()> {
    let mut writer = Writer::from_writer(File::create(path)?);
    for (label, count) in sentiment.iter() {
        writer.serialize(SentimentRow {
            sentiment: label.label().to_string(),
            count,
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Write all three snapshots for `analysis` into `dir`
pub fn write_snapshots(dir: &Path, prefix: &str, analysis: &CorpusAnalysis) -> Result<SnapshotPaths> {
    create_dir_all(dir)?;
    let paths = SnapshotPaths::new(dir, prefix);

    write_theme_snapshot(&paths.themes, &analysis.themes)?;
    write_category_snapshot(&paths.categories, &analysis.categories)?;
    write_sentiment_snapshot(&paths.sentiment, &analysis.sentiment)?;

    info!(
        directory = %dir.display(),
        prefix,
        themes = analysis.themes.len(),
        "Wrote analysis snapshots"
    );
    Ok(paths)
}

/// Read a themes snapshot back into `(token, count)` entries in file order
pub fn read_theme_snapshot(path: &Path) -> Result<Vec<ThemeEntry>> {
    let mut reader = Reader::from_path(path)?;
    let mut themes = Vec::new();
    for row in reader.deserialize() {
        let row: ThemeRow = row?;
        themes.push(ThemeEntry {
            token: row.theme,
            frequency: row.count,
        });
    }
    Ok(themes)
}

/// Read a categories snapshot; unknown labels are an error
pub fn read_category_snapshot(path: &Path) -> Result<CategoryTally> {
    let mut reader = Reader::from_path(path)?;
    let mut tally = CategoryTally::default();
    for row in reader.deserialize() {
        let row: CategoryRow = row?;
        tally.add(row.category.parse()?, row.count);
    }
    Ok(tally)
}

/// Read a sentiment snapshot; unknown labels are an error
pub fn read_sentiment_snapshot(path: &Path) -> Result<SentimentTally> {
    let mut reader = Reader::from_path(path)?;
    let mut tally = SentimentTally::default();
    for row in reader.deserialize() {
        let row: SentimentRow = row?;
        tally.add(row.sentiment.parse()?, row.count);
    }
    Ok(tally)
}

/// Read all three snapshots for `prefix` in `dir`
pub fn read_snapshots(dir: &Path, prefix: &str) -> Result<CorpusAnalysis> {
    let paths = SnapshotPaths::new(dir, prefix);
    Ok(CorpusAnalysis {
        themes: read_theme_snapshot(&paths.themes)?,
        categories: read_category_snapshot(&paths.categories)?,
        sentiment: read_sentiment_snapshot(&paths.sentiment)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_theme_snapshot_has_header() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("empty_themes.csv");

        write_theme_snapshot(&path, &[]).expect("Failed to write snapshot");

        let contents = std::fs::read_to_string(&path).expect("Failed to read snapshot");
        assert_eq!(contents, "Theme,Count\n");
        assert!(read_theme_snapshot(&path).expect("Failed to read back").is_empty());
    }

    #[test]
    fn test_category_snapshot_keeps_zero_rows() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("c_categories.csv");

        write_category_snapshot(&path, &CategoryTally::default()).expect("Failed to write");

        let contents = std::fs::read_to_string(&path).expect("Failed to read snapshot");
        assert_eq!(contents.lines().count(), 5);
        assert_eq!(contents.lines().next(), Some("Category,Count"));
    }
}
