use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use feedback_insights::analytics::{AnalyticsReport, FeedbackAnalytics};
use feedback_insights::auth::AdminAuth;
use feedback_insights::config::AppConfig;
use feedback_insights::dataset::{DatasetAnalyzer, DEFAULT_TEXT_COLUMN};
use feedback_insights::db::SubmissionStore;
use feedback_insights::logging::{init_logging, OperationTimer};
use feedback_insights::metrics::FeedbackMetrics;
use feedback_insights::models::{Category, NewSubmission, Priority, Status, Submission, SubmissionFilter};
use feedback_insights::nlp::CorpusAnalysis;
use feedback_insights::snapshot::{read_snapshots, write_snapshots};
use feedback_insights::validation::InputValidator;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database file (overrides configuration)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the submissions table
    Init,
    /// Submit a new piece of feedback
    Submit {
        /// Student identifier
        #[arg(long)]
        student_id: String,

        /// Display name
        #[arg(long)]
        name: Option<String>,

        /// Contact email
        #[arg(long)]
        email: Option<String>,

        /// Category ("Academic Issues", "Administrative Issues", "Facilities", "Student Welfare")
        #[arg(short, long)]
        category: String,

        /// Short subject line
        #[arg(short, long)]
        subject: Option<String>,

        /// Detailed feedback
        #[arg(short, long)]
        text: String,

        /// Priority (Low, Medium, High)
        #[arg(short, long, default_value = "Medium")]
        priority: String,

        /// Submit anonymously
        #[arg(long)]
        anonymous: bool,
    },
    /// List and search submissions (admin)
    List {
        /// Admin access code
        #[arg(long)]
        access_code: String,

        /// Text matched against feedback, subject and name
        #[arg(long)]
        search: Option<String>,

        /// Category filter
        #[arg(long)]
        category: Option<String>,

        /// Status filter
        #[arg(long)]
        status: Option<String>,

        /// Priority filter
        #[arg(long)]
        priority: Option<String>,

        /// Earliest submission day (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Latest submission day (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Only anonymous (true) or only named (false) submissions
        #[arg(long)]
        anonymous: Option<bool>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Change the status of a submission (admin)
    UpdateStatus {
        /// Admin access code
        #[arg(long)]
        access_code: String,

        /// Submission id
        #[arg(long)]
        id: i64,

        /// New status (Pending, "In Progress", Resolved, Closed)
        #[arg(long)]
        status: String,

        /// Admin notes; left unchanged when omitted or blank
        #[arg(long)]
        notes: Option<String>,
    },
    /// Show analytics over all stored submissions (admin)
    Analytics {
        /// Admin access code
        #[arg(long)]
        access_code: String,

        /// Number of themes to show
        #[arg(long)]
        top: Option<usize>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show store summaries by category, day, status and priority (admin)
    Stats {
        /// Admin access code
        #[arg(long)]
        access_code: String,

        /// Number of days of daily trends
        #[arg(long)]
        days: Option<usize>,
    },
    /// Write theme, category and sentiment snapshots of stored submissions
    Snapshot {
        /// Output directory
        #[arg(short, long)]
        output_dir: Option<String>,

        /// File name prefix
        #[arg(short, long)]
        prefix: Option<String>,
    },
    /// Analyze an external review dataset and save snapshots
    Dataset {
        /// CSV file with one review per row
        path: PathBuf,

        /// Column holding the review text
        #[arg(long, default_value = DEFAULT_TEXT_COLUMN)]
        column: String,

        /// Number of themes to keep
        #[arg(long)]
        top: Option<usize>,

        /// Output directory
        #[arg(short, long)]
        output_dir: Option<String>,

        /// File name prefix
        #[arg(short, long)]
        prefix: Option<String>,
    },
    /// Print previously saved snapshots
    Summary {
        /// Snapshot directory
        #[arg(short, long)]
        output_dir: Option<String>,

        /// File name prefix
        #[arg(short, long)]
        prefix: Option<String>,
    },
}

fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize logging; the guard keeps the file writer alive
    let log_file = config.logging.file_path.as_ref().map(PathBuf::from);
    let _log_guard = init_logging(Some(&config.get_log_level()), log_file.as_deref())?;

    if let Err(e) = FeedbackMetrics::init() {
        warn!("Metrics recorder not installed: {}", e);
    }

    info!("Starting feedback-insights");

    let db_path = cli
        .db
        .clone()
        .unwrap_or_else(|| PathBuf::from(config.get_database_path()));

    match cli.command {
        Commands::Init => init_store(&db_path)?,
        Commands::Submit {
            student_id,
            name,
            email,
            category,
            subject,
            text,
            priority,
            anonymous,
        } => {
            let submission = NewSubmission {
                student_id,
                student_name: name,
                email,
                category: category.parse::<Category>()?,
                subject,
                feedback_text: text,
                priority: Some(priority.parse::<Priority>()?),
                is_anonymous: anonymous,
            };
            submit_feedback(&db_path, &submission)?;
        }
        Commands::List {
            access_code,
            search,
            category,
            status,
            priority,
            from,
            to,
            anonymous,
            json,
        } => {
            authorize(&config, &access_code, "list submissions")?;
            let filter = SubmissionFilter {
                search_term: search,
                category: category.as_deref().map(str::parse).transpose()?,
                status: status.as_deref().map(str::parse).transpose()?,
                priority: priority.as_deref().map(str::parse).transpose()?,
                from: from.as_deref().map(InputValidator::parse_date).transpose()?,
                to: to.as_deref().map(InputValidator::parse_date).transpose()?,
                anonymous,
            };
            list_submissions(&db_path, &filter, json)?;
        }
        Commands::UpdateStatus {
            access_code,
            id,
            status,
            notes,
        } => {
            authorize(&config, &access_code, "update submissions")?;
            update_status(&db_path, id, status.parse::<Status>()?, notes.as_deref())?;
        }
        Commands::Analytics {
            access_code,
            top,
            json,
        } => {
            authorize(&config, &access_code, "view analytics")?;
            let mut analysis = config.analysis.clone();
            if let Some(top) = top {
                analysis.top_themes = top;
            }
            let engine = FeedbackAnalytics::from_config(&analysis)?;
            show_analytics(&db_path, &engine, json)?;
        }
        Commands::Stats { access_code, days } => {
            authorize(&config, &access_code, "view store summaries")?;
            let days = days.unwrap_or_else(|| {
                usize::try_from(config.analysis.trend_window_days).unwrap_or(30)
            });
            show_stats(&db_path, days)?;
        }
        Commands::Snapshot { output_dir, prefix } => {
            let dir = output_dir.unwrap_or_else(|| config.snapshot.output_directory.clone());
            let prefix = prefix.unwrap_or_else(|| config.snapshot.prefix.clone());
            let engine = FeedbackAnalytics::from_config(&config.analysis)?;
            snapshot_submissions(&db_path, &engine, Path::new(&dir), &prefix)?;
        }
        Commands::Dataset {
            path,
            column,
            top,
            output_dir,
            prefix,
        } => {
            let dir = output_dir.unwrap_or_else(|| config.snapshot.output_directory.clone());
            let prefix = prefix.unwrap_or_else(|| config.snapshot.prefix.clone());
            let analyzer = DatasetAnalyzer::new()?
                .with_text_column(column)
                .with_top_themes(top.unwrap_or(config.analysis.top_themes));
            analyze_dataset(&analyzer, &path, Path::new(&dir), &prefix)?;
        }
        Commands::Summary { output_dir, prefix } => {
            let dir = output_dir.unwrap_or_else(|| config.snapshot.output_directory.clone());
            let prefix = prefix.unwrap_or_else(|| config.snapshot.prefix.clone());
            show_summary(Path::new(&dir), &prefix)?;
        }
    }

    Ok(())
}

/// Verify the admin access code for one command
fn authorize(config: &AppConfig, code: &str, action: &str) -> Result<()> {
    let mut auth = AdminAuth::from_config(&config.admin);
    auth.verify(code);
    auth.require(action)?;
    Ok(())
}

/// Create the submissions table
fn init_store(db_path: &Path) -> Result<()> {
    let store = SubmissionStore::open(db_path)
        .with_context(|| format!("Failed to open database at {}", db_path.display()))?;
    println!("Database ready at {}", store.path().display());
    Ok(())
}

/// Validate and store a submission
fn submit_feedback(db_path: &Path, submission: &NewSubmission) -> Result<()> {
    let store = SubmissionStore::open(db_path)?;
    let id = store
        .try_insert(submission)
        .context("Feedback was not submitted")?;
    println!("Feedback submitted successfully (id {id}).");
    Ok(())
}

/// Print submissions matching a filter
fn list_submissions(db_path: &Path, filter: &SubmissionFilter, json: bool) -> Result<()> {
    let store = SubmissionStore::open(db_path)?;
    let submissions = store.try_search(filter)?;
    info!("Found {} submissions", submissions.len());

    if json {
        println!("{}", serde_json::to_string_pretty(&submissions)?);
        return Ok(());
    }

    if submissions.is_empty() {
        println!("No submissions found.");
        return Ok(());
    }

    for submission in &submissions {
        print_submission(submission);
    }
    Ok(())
}

fn print_submission(submission: &Submission) {
    let submitter = if submission.is_anonymous {
        "Anonymous".to_string()
    } else {
        submission
            .student_name
            .clone()
            .unwrap_or_else(|| submission.student_id.clone())
    };
    let priority = submission.priority.map_or("-", |p| p.label());

    println!(
        "#{} [{}] {} | {} | {} | {}",
        submission.id,
        submission.status,
        submission.submission_date,
        submission.category,
        priority,
        submitter
    );
    if let Some(subject) = &submission.subject {
        println!("    Subject: {subject}");
    }
    println!("    {}", submission.feedback_text);
    if let Some(notes) = &submission.admin_notes {
        println!("    Notes: {notes}");
    }
}

/// Move a submission through the admin workflow
fn update_status(db_path: &Path, id: i64, status: Status, notes: Option<&str>) -> Result<()> {
    let store = SubmissionStore::open(db_path)?;
    if store.try_update_status(id, status, notes)? {
        println!("Feedback {id} status updated to {status}.");
    } else {
        store.ensure_exists(id)?;
    }
    Ok(())
}

/// Compute and print analytics over every stored submission
fn show_analytics(db_path: &Path, engine: &FeedbackAnalytics, json: bool) -> Result<()> {
    let timer = OperationTimer::new("analytics");
    let store = SubmissionStore::open(db_path)?;
    let submissions = store.fetch_all();
    let report = engine.compute_analytics(&submissions);
    store
        .metrics()
        .record_analytics_run(submissions.len(), timer.elapsed());
    timer.finish();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &AnalyticsReport) {
    println!("Total feedback: {}", report.total_feedback);
    if report.total_feedback == 0 {
        println!("No feedback data available yet.");
        return;
    }

    println!("Anonymous: {:.1}%", report.anonymous_percentage);
    match report.avg_submissions_per_day {
        Some(avg) => println!("Average submissions per day: {avg:.2}"),
        None => println!("Average submissions per day: unavailable"),
    }

    println!("\nTop themes:");
    for entry in &report.themes {
        println!("  {:<20} {}", entry.token, entry.frequency);
    }

    println!("\nCategories (by keyword):");
    for (category, count) in report.categories.iter() {
        println!("  {:<22} {}", category.label(), count);
    }

    println!("\nSentiment:");
    for (sentiment, count) in report.sentiment.iter() {
        println!("  {:<22} {}", sentiment.label(), count);
    }

    println!("\nStatus:");
    for (status, count) in &report.status_distribution {
        println!("  {:<22} {}", status.label(), count);
    }

    if let Some(monthly) = &report.monthly_trends {
        println!("\nMonthly submissions:");
        for (month, count) in monthly {
            println!("  {month:<22} {count}");
        }
    }

    if !report.recommendations.is_empty() {
        println!("\nRecommendations:");
        for (i, rec) in report.recommendations.iter().enumerate() {
            println!("  {}. {}", i + 1, rec);
        }
    }
}

/// Print the relational summaries kept by the store
fn show_stats(db_path: &Path, days: usize) -> Result<()> {
    let store = SubmissionStore::open(db_path)?;

    println!("By category:");
    for row in store.category_summary()? {
        println!(
            "  {:<22} {:>4}  avg priority {:.2}",
            row.category, row.count, row.avg_priority_score
        );
    }

    println!("\nDaily (last {days} days):");
    for row in store.daily_trends(days)? {
        println!("  {}  {:>4}  high {}", row.date, row.submissions, row.high_priority);
    }

    println!("\nBy status:");
    for row in store.status_summary(Local::now().naive_local())? {
        println!(
            "  {:<22} {:>4}  avg {:.1} days open",
            row.status, row.count, row.avg_days_open
        );
    }

    println!("\nBy priority:");
    for row in store.priority_distribution()? {
        println!(
            "  {:<8} {:<22} {}",
            row.priority.as_deref().unwrap_or("-"),
            row.category,
            row.count
        );
    }
    Ok(())
}

/// Snapshot the analysis of stored submissions
fn snapshot_submissions(db_path: &Path, engine: &FeedbackAnalytics, dir: &Path, prefix: &str) -> Result<()> {
    let store = SubmissionStore::open(db_path)?;
    let submissions = store.fetch_all();
    let report = engine.compute_analytics(&submissions);

    let analysis = CorpusAnalysis {
        themes: report.themes,
        categories: report.categories,
        sentiment: report.sentiment,
    };
    let paths = write_snapshots(dir, prefix, &analysis)
        .with_context(|| format!("Failed to write snapshots to {}", dir.display()))?;
    store.metrics().record_snapshot_files(paths.all().len());

    for path in paths.all() {
        println!("Wrote {}", path.display());
    }
    Ok(())
}

/// Analyze an external dataset and save its snapshots
fn analyze_dataset(analyzer: &DatasetAnalyzer, path: &Path, dir: &Path, prefix: &str) -> Result<()> {
    let timer = OperationTimer::new("dataset_analysis");
    let insights = analyzer
        .analyze_file(path)
        .with_context(|| format!("Failed to analyze {}", path.display()))?;
    let paths = analyzer.save(&insights, dir, prefix)?;
    timer.finish();

    println!("Total reviews: {}", insights.total_reviews);
    if let Some(rating) = insights.avg_rating {
        println!("Average rating: {rating:.2}");
    }
    if let Some(difficulty) = insights.avg_difficulty {
        println!("Average difficulty: {difficulty:.2}");
    }
    print_analysis(&insights.analysis);
    for path in paths.all() {
        println!("Wrote {}", path.display());
    }
    Ok(())
}

/// Print snapshots saved by an earlier run
fn show_summary(dir: &Path, prefix: &str) -> Result<()> {
    let analysis = read_snapshots(dir, prefix).with_context(|| {
        format!(
            "No snapshots with prefix '{prefix}' in {}. Run the snapshot or dataset command first.",
            dir.display()
        )
    })?;
    print_analysis(&analysis);
    Ok(())
}

fn print_analysis(analysis: &CorpusAnalysis) {
    println!("\nTop themes:");
    for entry in &analysis.themes {
        println!("  {:<20} {}", entry.token, entry.frequency);
    }

    println!("\nCategories:");
    for (category, count) in analysis.categories.iter() {
        println!("  {:<22} {}", category.label(), count);
    }

    println!("\nSentiment:");
    for (sentiment, count) in analysis.sentiment.iter() {
        println!("  {:<22} {}", sentiment.label(), count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analytics_requires_access_code() {
        assert!(Cli::try_parse_from(["feedback-insights", "analytics"]).is_err());

        let cli = Cli::try_parse_from(["feedback-insights", "analytics", "--access-code", "admin123", "--json"])
            .expect("Failed to parse analytics command");
        assert!(matches!(
            cli.command,
            Commands::Analytics { ref access_code, json: true, .. } if access_code == "admin123"
        ));
    }

    #[test]
    fn test_analytics_access_code_is_checked() {
        let config = AppConfig::default();
        assert!(authorize(&config, "wrong", "view analytics").is_err());
        assert!(authorize(&config, "admin123", "view analytics").is_ok());
    }

    #[test]
    fn test_list_parses_anonymous_filter() {
        let cli = Cli::try_parse_from([
            "feedback-insights",
            "list",
            "--access-code",
            "admin123",
            "--anonymous",
            "true",
        ])
        .expect("Failed to parse list command");
        assert!(matches!(cli.command, Commands::List { anonymous: Some(true), .. }));

        let cli = Cli::try_parse_from(["feedback-insights", "list", "--access-code", "admin123"])
            .expect("Failed to parse list command");
        assert!(matches!(cli.command, Commands::List { anonymous: None, .. }));
    }
}
