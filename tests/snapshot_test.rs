use feedback_insights::models::{Category, CategoryTally, Sentiment, SentimentTally, ThemeEntry};
use feedback_insights::nlp::{CorpusAnalysis, TextAnalyzer};
use feedback_insights::snapshot::{
    read_category_snapshot, read_sentiment_snapshot, read_snapshots, read_theme_snapshot,
    write_snapshots, write_theme_snapshot, SnapshotPaths,
};
use proptest::prelude::*;
use tempfile::TempDir;

fn theme(token: &str, frequency: usize) -> ThemeEntry {
    ThemeEntry {
        token: token.to_string(),
        frequency,
    }
}

#[test]
fn test_snapshot_file_names() {
    let paths = SnapshotPaths::new(std::path::Path::new("out"), "processed_data");
    let names: Vec<String> = paths
        .all()
        .iter()
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .collect();
    assert_eq!(
        names,
        vec![
            "out/processed_data_themes.csv",
            "out/processed_data_categories.csv",
            "out/processed_data_sentiment.csv",
        ]
    );
}

#[test]
fn test_write_snapshots_layout() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let out_dir = temp_dir.path().join("output");

    let mut categories = CategoryTally::default();
    categories.add(Category::AcademicIssues, 3);
    categories.add(Category::Facilities, 1);
    let mut sentiment = SentimentTally::default();
    sentiment.add(Sentiment::Positive, 2);
    sentiment.add(Sentiment::Neutral, 2);

    let analysis = CorpusAnalysis {
        themes: vec![theme("library", 4), theme("exam", 2)],
        categories,
        sentiment,
    };

    let paths = write_snapshots(&out_dir, "run", &analysis).expect("Failed to write snapshots");
    assert!(paths.all().iter().all(|p| p.exists()));

    let themes = std::fs::read_to_string(&paths.themes).expect("Failed to read themes");
    assert_eq!(themes, "Theme,Count\nlibrary,4\nexam,2\n");

    let categories = std::fs::read_to_string(&paths.categories).expect("Failed to read categories");
    assert_eq!(
        categories,
        "Category,Count\nAcademic Issues,3\nAdministrative Issues,0\nFacilities,1\nStudent Welfare,0\n"
    );

    let sentiment = std::fs::read_to_string(&paths.sentiment).expect("Failed to read sentiment");
    assert_eq!(sentiment, "Sentiment,Count\nPositive,2\nNegative,0\nNeutral,2\n");

    let restored = read_snapshots(&out_dir, "run").expect("Failed to read snapshots");
    assert_eq!(restored, analysis);
}

#[test]
fn test_pipeline_output_survives_snapshot() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let analyzer = TextAnalyzer::new().expect("Failed to create text analyzer");
    let corpus = [
        Some("The hostel wifi is terrible"),
        Some("Great professor, clear lectures"),
        None,
    ];
    let analysis = analyzer.analyze(&corpus, 20);

    write_snapshots(temp_dir.path(), "feedback", &analysis).expect("Failed to write snapshots");
    let restored = read_snapshots(temp_dir.path(), "feedback").expect("Failed to read snapshots");
    assert_eq!(restored, analysis);
    assert_eq!(restored.sentiment.total(), 3);
}

#[test]
fn test_unknown_label_is_rejected() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let categories = temp_dir.path().join("bad_categories.csv");
    std::fs::write(&categories, "Category,Count\nSports,4\n").expect("Failed to write file");
    assert!(read_category_snapshot(&categories).is_err());

    let sentiment = temp_dir.path().join("bad_sentiment.csv");
    std::fs::write(&sentiment, "Sentiment,Count\nMixed,1\n").expect("Failed to write file");
    assert!(read_sentiment_snapshot(&sentiment).is_err());
}

#[test]
fn test_missing_snapshot_is_an_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    assert!(read_theme_snapshot(&temp_dir.path().join("absent_themes.csv")).is_err());
    assert!(read_snapshots(temp_dir.path(), "absent").is_err());
}

proptest! {
    #[test]
    fn prop_theme_snapshot_preserves_order_and_counts(
        entries in prop::collection::vec(("[a-z]{2,12}", 1usize..10_000), 0..40)
    ) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("prop_themes.csv");
        let themes: Vec<ThemeEntry> = entries
            .iter()
            .map(|(token, count)| theme(token, *count))
            .collect();

        write_theme_snapshot(&path, &themes).expect("Failed to write snapshot");
        let restored = read_theme_snapshot(&path).expect("Failed to read snapshot");
        prop_assert_eq!(restored, themes);
    }
}
