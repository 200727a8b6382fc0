//! Date-range download orchestration
//!
//! The downloader turns one [`DownloadRequest`] into one task per calendar day
//! and runs those tasks with bounded concurrency:
//!
//! 1. **Validation**: source, collector, data type and dates are checked
//!    before any network or filesystem activity
//! 2. **Planning**: one [`job::DayTask`] per day, inclusive on both ends
//! 3. **Execution**: [`executor::DownloadExecutor`] resolves each day's files
//!    through the shared listing cache and downloads them
//!
//! # Quick Start
//!
//! ```no_run
//! use bgp_archive_downloader::downloader::{DownloadExecutor, DownloadRequest};
//! use bgp_archive_downloader::source::Source;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let request = DownloadRequest::new(Source::Ripe, "rrc00", "bview", "2014-03-01", "2014-03-01")
//!     .with_output_root("./data")
//!     .with_max_concurrency(5);
//!
//! let summary = DownloadExecutor::new().run(&request).await?;
//! println!("{} files downloaded", summary.files_downloaded);
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! Every day task runs to completion; the first error by completion order is
//! returned once all tasks have settled. With
//! [`executor::FailurePolicy::AbortOnFirstError`] the first error also
//! cancels everything still in flight.

use chrono::NaiveDate;

use crate::fetcher::FetcherError;
use crate::source::SourceError;

pub mod config;
pub mod executor;
pub mod job;

pub use config::RetryPolicy;
pub use executor::{DownloadExecutor, FailurePolicy, RunSummary};
pub use job::{DayTask, DownloadRequest};

/// Download errors
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// Invalid source, collector or data type
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Unparseable dates, or start after end
    #[error("invalid date range: {0}")]
    InvalidDateRange(String),

    /// Output directory could not be created
    #[error("output directory error: {0}")]
    OutputDirError(String),

    /// Index page for a day could not be listed
    #[error("index error for {date}: {source}")]
    Index {
        /// Day being resolved
        date: NaiveDate,
        /// Underlying fetcher error
        source: FetcherError,
    },

    /// File transfer failed after all retries
    #[error("failed to download {file} for {date}: {cause}")]
    TransferError {
        /// File name
        file: String,
        /// Day being resolved
        date: NaiveDate,
        /// Underlying fetcher error
        cause: FetcherError,
    },

    /// Run was cancelled before this work completed
    #[error("download cancelled")]
    Cancelled,
}

impl DownloadError {
    /// Whether the error was produced by cancellation rather than a failure
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DownloadError::Cancelled)
    }
}
