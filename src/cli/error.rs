//! CLI error types and conversions

use crate::downloader::DownloadError;
use crate::source::SourceError;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Source, collector or data type error
    #[error("{0}")]
    SourceError(#[from] SourceError),

    /// Download error
    #[error("{0}")]
    DownloadError(#[from] DownloadError),

    /// Run report could not be rendered
    #[error("failed to serialize output: {0}")]
    OutputError(#[from] serde_json::Error),
}
