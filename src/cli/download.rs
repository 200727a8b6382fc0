//! Download command implementation

use crate::downloader::config::{RetryPolicy, DEFAULT_CONCURRENCY, MAX_CONCURRENCY};
use crate::downloader::{DownloadExecutor, DownloadRequest, FailurePolicy, RunSummary};
use crate::shutdown::SharedShutdown;
use crate::source::Source;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use super::CliError;

/// Parse and validate concurrency value (0 selects the default)
fn parse_concurrency(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if value > MAX_CONCURRENCY {
        return Err(format!(
            "concurrency {value} exceeds maximum of {MAX_CONCURRENCY}"
        ));
    }
    Ok(value)
}

/// BGP Archive Downloader CLI
#[derive(Parser, Debug)]
#[command(name = "bgp-archive-downloader")]
#[command(about = "Download BGP archive files from RIPE RIS and RouteViews", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (json or human)
    #[arg(long, global = true, default_value = "human")]
    pub output_format: OutputFormat,

    /// Attempts per file before giving up (default: 5, range: 1-20)
    #[arg(long, global = true, default_value = "5", value_parser = clap::value_parser!(u32).range(1..=20))]
    pub max_retries: u32,

    /// Delay after the first failed attempt, in milliseconds; doubles per failure
    #[arg(long, global = true, default_value = "1000")]
    pub retry_base_ms: u64,

    /// Upper bound on a single retry delay, in milliseconds (default: uncapped)
    #[arg(long, global = true)]
    pub max_backoff_ms: Option<u64>,

    /// Delete a file whose download failed after all attempts
    #[arg(long, global = true, default_value_t = false)]
    pub remove_partial: bool,

    /// Stop all remaining work after the first failed day
    #[arg(long, global = true, default_value_t = false)]
    pub fail_fast: bool,
}

impl Cli {
    /// Retry policy selected by the global flags
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::default()
            .with_max_attempts(self.max_retries)
            .with_base_delay(Duration::from_millis(self.retry_base_ms))
            .with_max_backoff(self.max_backoff_ms.map(Duration::from_millis))
            .with_remove_partial_on_failure(self.remove_partial)
    }

    /// Failure policy selected by `--fail-fast`
    pub fn failure_policy(&self) -> FailurePolicy {
        if self.fail_fast {
            FailurePolicy::AbortOnFirstError
        } else {
            FailurePolicy::Continue
        }
    }
}

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download archive files for a date range
    Download(DownloadArgs),

    /// List supported archives and their collectors
    Sources(super::SourcesCommand),
}

/// Download command arguments
#[derive(Parser, Debug)]
pub struct DownloadArgs {
    /// Archive to download from (ripe or routeviews)
    #[arg(short = 'S', long, default_value = "ripe")]
    pub source: String,

    /// Collector name (e.g., rrc00, chicago)
    #[arg(short, long, default_value = "rrc00")]
    pub collector: String,

    /// Data type: bview|updates|all for ripe, rib|updates|all for routeviews
    #[arg(short = 't', long = "type", default_value = "bview")]
    pub data_type: String,

    /// Start date (YYYY-MM-DD)
    #[arg(short, long)]
    pub start_date: String,

    /// End date, inclusive (YYYY-MM-DD)
    #[arg(short, long)]
    pub end_date: String,

    /// Output root directory
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Maximum concurrent day tasks (0 selects the default of 10, max 64)
    #[arg(short = 'n', long, default_value_t = DEFAULT_CONCURRENCY, value_parser = parse_concurrency)]
    pub concurrency: usize,
}

impl DownloadArgs {
    /// Build the library request from the parsed arguments
    pub fn to_request(&self) -> Result<DownloadRequest, CliError> {
        let source = Source::from_str(&self.source)?;
        Ok(DownloadRequest::new(
            source,
            self.collector.clone(),
            self.data_type.clone(),
            self.start_date.clone(),
            self.end_date.clone(),
        )
        .with_output_root(self.output.clone())
        .with_max_concurrency(self.concurrency))
    }

    /// Execute the download command
    pub async fn execute(&self, cli: &Cli, shutdown: SharedShutdown) -> Result<RunSummary, CliError> {
        let request = self.to_request()?;
        let progress = match cli.output_format {
            OutputFormat::Human => create_progress_bar(&request),
            OutputFormat::Json => ProgressBar::hidden(),
        };

        let executor = DownloadExecutor::new()
            .with_retry_policy(cli.retry_policy())
            .with_failure_policy(cli.failure_policy())
            .with_shutdown(shutdown)
            .with_progress(progress.clone());

        info!(
            "Starting {} download: {} {} from {} to {}",
            request.source, request.collector, request.data_type, request.start_date, request.end_date
        );
        let result = executor.run(&request).await;
        progress.finish_and_clear();

        match cli.output_format {
            OutputFormat::Json => output_json(&request, &result)?,
            OutputFormat::Human => output_human(&request, &result),
        }

        result.map_err(CliError::DownloadError)
    }
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Human-readable output
    Human,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "human" => Ok(OutputFormat::Human),
            _ => Err(format!("Invalid output format: {s}")),
        }
    }
}

fn output_json(
    request: &DownloadRequest,
    result: &Result<RunSummary, crate::downloader::DownloadError>,
) -> Result<(), CliError> {
    let (summary, err) = match result {
        Ok(summary) => (Some(summary), None),
        Err(e) => (None, Some(e.to_string())),
    };
    let output = serde_json::json!({
        "success": result.is_ok(),
        "source": request.source,
        "collector": request.collector,
        "data_type": request.data_type,
        "start_date": request.start_date,
        "end_date": request.end_date,
        "output": request.output_root.display().to_string(),
        "summary": summary,
        "error": err,
    });

    let line = serde_json::to_string(&output)?;
    println!("{line}");
    Ok(())
}

fn output_human(
    request: &DownloadRequest,
    result: &Result<RunSummary, crate::downloader::DownloadError>,
) {
    if let Ok(summary) = result {
        println!("\nDownload completed successfully!");
        println!(
            "Source: {} collector {} ({})",
            request.source, request.collector, request.data_type
        );
        println!("Output: {}", request.output_root.display());
        println!("Days: {}", summary.days);
        println!("Files downloaded: {}", summary.files_downloaded);
        println!("Files already present: {}", summary.files_skipped);
        println!("Bytes downloaded: {}", summary.bytes_downloaded);
    }
}

fn create_progress_bar(request: &DownloadRequest) -> ProgressBar {
    let pb = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} days {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb.set_message(format!("{} {}", request.source, request.collector));
    pb
}
