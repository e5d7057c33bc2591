use clap::{Parser, ValueEnum};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::path::PathBuf;

use datapilot::client::ApiClient;
use datapilot::config::Config;
use datapilot::session::Session;
use datapilot::view::{preview_view, profile_view, PreviewView, ProfileView};
use tracing::debug;

/// Terminal frontend for the dataset session workflow: upload a CSV, then
/// fetch whichever derived views were requested.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// CSV file to upload
    file: PathBuf,
    /// Enable file logging at the given level (overrides RUST_LOG)
    #[arg(long = "logging", value_enum)]
    logging: Option<LogLevel>,
    /// Path to a config file (overrides default config discovery)
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf>,
    /// Backend base URL (overrides the configured endpoint)
    #[arg(long = "base-url", value_name = "URL")]
    base_url: Option<String>,
    /// Probe GET /health before uploading
    #[arg(long = "check-health")]
    check_health: bool,
    /// Fetch the row preview
    #[arg(long)]
    preview: bool,
    /// Fetch the statistical profile
    #[arg(long)]
    profile: bool,
    /// Request a natural-language explanation of the profile
    #[arg(long)]
    explain: bool,
    /// List the dataset's columns
    #[arg(long)]
    columns: bool,
    /// Request an explanation of one named column
    #[arg(long = "explain-column", value_name = "COLUMN")]
    explain_column: Option<String>,
    /// Request feature-engineering suggestions
    #[arg(long = "feature-ideas")]
    feature_ideas: bool,
    /// Print the unmodified JSON payload under each rendered view
    #[arg(long)]
    raw: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    datapilot::logging::init_with(None, args.logging.map(Into::into))?;

    let mut config = Config::from_path(args.config.as_ref())?;
    if let Some(base_url) = args.base_url.clone() {
        config.base_url = base_url;
    }
    let client = ApiClient::new(&config.base_url)?;
    debug!(base_url = %client.base_url(), "configuration loaded");

    if args.check_health {
        match client.health().await {
            Ok(health) => println!("backend health: {}", health.status),
            Err(err) => return Err(eyre!("{}", err.message())),
        }
    }

    let file_name = args
        .file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload.csv")
        .to_string();
    let bytes = tokio::fs::read(&args.file).await?;

    let session = Session::new(client, config.preview_rows);
    session.upload(&file_name, bytes).await;

    let snapshot = session.snapshot();
    let Some(dataset_id) = snapshot.dataset_id.clone() else {
        let message = snapshot.error.unwrap_or_else(|| "Upload failed".to_string());
        return Err(eyre!(message));
    };
    println!("dataset_id: {dataset_id}");

    if args.preview {
        session.preview().await;
        report_error(&session);
    }
    if args.profile {
        session.profile().await;
        report_error(&session);
    }
    if args.columns {
        session.columns().await;
        report_error(&session);
    }
    if args.explain {
        session.explain().await;
        report_error(&session);
    }
    if let Some(column) = &args.explain_column {
        session.explain_column(column).await;
        report_error(&session);
    }
    if args.feature_ideas {
        session.feature_ideas().await;
        report_error(&session);
    }

    render(&session, args.raw);
    Ok(())
}

/// Print the failure slot, if the last action set it.
fn report_error(session: &Session) {
    if let Some(error) = session.snapshot().error {
        eprintln!("error: {error}");
    }
}

fn render(session: &Session, raw: bool) {
    let snapshot = session.snapshot();

    if let Some(payload) = &snapshot.preview {
        print_preview(&preview_view(payload), raw);
    }
    if let Some(payload) = &snapshot.profile {
        print_profile(&profile_view(payload), raw);
    }
    if let Some(columns) = &snapshot.columns {
        println!("\n== Columns ==");
        for column in columns {
            println!("  {column}");
        }
    }
    if let Some(text) = &snapshot.explanation {
        println!("\n== Explanation ==");
        println!("{text}");
    }
    if let Some(explained) = &snapshot.column_explanation {
        println!("\n== Column: {} ==", explained.column);
        println!("{}", explained.text);
    }
    if let Some(payload) = &snapshot.feature_ideas {
        println!("\n== Feature ideas ==");
        for idea in &payload.data.ideas {
            println!("  - {idea}");
        }
        if raw {
            println!("{}", serde_json::to_string_pretty(&payload.raw).unwrap_or_default());
        }
    }
}

fn print_preview(view: &PreviewView, raw: bool) {
    println!("\n== Preview ==");
    println!("shape: {} x {}", view.shape.rows, view.shape.columns);
    let headers: Vec<&str> = view.columns.iter().map(String::as_str).collect();
    print_table(&headers, &view.rows);
    if raw {
        println!("{}", view.raw_json);
    }
}

fn print_profile(view: &ProfileView, raw: bool) {
    println!("\n== Profile ==");
    println!("rows: {}  columns: {}", view.shape.rows, view.shape.columns);

    println!("\nMissing values");
    let rows: Vec<Vec<String>> = view
        .missing
        .iter()
        .map(|r| vec![r.column.clone(), r.missing_count.clone(), r.missing_pct.clone()])
        .collect();
    print_table(&["Column", "Missing", "Missing %"], &rows);

    println!("\nNumeric summary");
    match view.numeric_placeholder() {
        Some(placeholder) => println!("{placeholder}"),
        None => {
            let rows: Vec<Vec<String>> = view
                .numeric
                .iter()
                .map(|r| {
                    vec![
                        r.column.clone(),
                        r.count.clone(),
                        r.mean.clone(),
                        r.std.clone(),
                        r.min.clone(),
                        r.max.clone(),
                    ]
                })
                .collect();
            print_table(&["Column", "Count", "Mean", "Std", "Min", "Max"], &rows);
        }
    }

    println!("\nTop values (categorical)");
    match view.categorical_placeholder() {
        Some(placeholder) => println!("{placeholder}"),
        None => {
            for panel in &view.categorical {
                println!("{}:", panel.column);
                for item in &panel.items {
                    println!("  {item}");
                }
            }
        }
    }

    if raw {
        println!("{}", view.raw_json);
    }
}

/// Fixed-width plain-text table.
fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let line = |cells: Vec<&str>| {
        let formatted: Vec<String> = cells
            .iter()
            .zip(widths.iter().copied())
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        formatted.join("  ")
    };

    println!("{}", line(headers.to_vec()));
    for row in rows {
        println!("{}", line(row.iter().map(String::as_str).collect()));
    }
}
