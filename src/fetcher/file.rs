//! Single-file downloader with retry and exponential backoff
//!
//! A file that already exists at the destination is treated as complete and
//! skipped without any network access. Otherwise the body is streamed to disk,
//! retrying transport, status and write failures according to a
//! [`RetryPolicy`].

use futures_util::StreamExt;
use std::io::SeekFrom;
use std::path::Path;
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use tracing::{debug, info, warn};

use super::{FetcherError, FetcherResult, HttpTransport};
use crate::downloader::config::RetryPolicy;
use crate::shutdown::{SharedShutdown, ShutdownCoordinator};

/// Result of a successful [`FileFetcher::download`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// File was transferred
    Downloaded {
        /// Bytes written to disk
        bytes: u64,
    },
    /// File already existed locally; nothing was requested
    Skipped,
}

/// Downloads one remote file to one local path
pub struct FileFetcher {
    transport: Arc<dyn HttpTransport>,
    policy: RetryPolicy,
    shutdown: SharedShutdown,
}

impl FileFetcher {
    /// Create a fetcher with the default retry policy
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            policy: RetryPolicy::default(),
            shutdown: ShutdownCoordinator::shared(),
        }
    }

    /// Override the retry policy
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Attach a shared shutdown handle for cancellation.
    pub fn with_shutdown(mut self, shutdown: SharedShutdown) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Download `url` to `path`, skipping if a regular file is already there
    pub async fn download(&self, url: &str, path: &Path) -> FetcherResult<DownloadOutcome> {
        if is_regular_file(path).await {
            debug!(path = %path.display(), "File already present, skipping");
            return Ok(DownloadOutcome::Skipped);
        }

        let mut file = File::create(path).await.map_err(|e| {
            FetcherError::WriteError(format!("Failed to create {}: {e}", path.display()))
        })?;

        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let result = self
                .shutdown
                .run_until_shutdown(self.attempt(url, &mut file))
                .await
                .unwrap_or(Err(FetcherError::Cancelled));

            match result {
                Ok(bytes) => {
                    info!("Successfully downloaded {}", path.display());
                    return Ok(DownloadOutcome::Downloaded { bytes });
                }
                Err(FetcherError::Cancelled) => {
                    // An interrupted file would be skipped as complete on the next run.
                    remove_file_quietly(path).await;
                    return Err(FetcherError::Cancelled);
                }
                Err(e) if attempt >= max_attempts => {
                    warn!(
                        url,
                        attempt,
                        max_attempts,
                        error = %e,
                        "Download failed, attempts exhausted"
                    );
                    if self.policy.remove_partial_on_failure {
                        remove_file_quietly(path).await;
                    }
                    return Err(e);
                }
                Err(e) => {
                    let delay = self.policy.backoff(attempt);
                    warn!(
                        "Download attempt {} failed: {}. Retrying in {:?}...",
                        attempt, e, delay
                    );
                    if self
                        .shutdown
                        .run_until_shutdown(tokio::time::sleep(delay))
                        .await
                        .is_none()
                    {
                        remove_file_quietly(path).await;
                        return Err(FetcherError::Cancelled);
                    }
                    attempt += 1;
                }
            }
        }
    }

    /// One transfer attempt into `file`, starting from an empty file
    async fn attempt(&self, url: &str, file: &mut File) -> FetcherResult<u64> {
        file.set_len(0).await.map_err(write_error)?;
        file.seek(SeekFrom::Start(0)).await.map_err(write_error)?;

        let mut response = self.transport.get(url).await?;
        if !response.status.is_success() {
            return Err(FetcherError::HttpStatus {
                url: url.to_string(),
                status: response.status,
            });
        }

        let mut written = 0u64;
        while let Some(chunk) = response.body.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await.map_err(write_error)?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(write_error)?;

        Ok(written)
    }
}

fn write_error(e: std::io::Error) -> FetcherError {
    FetcherError::WriteError(e.to_string())
}

async fn is_regular_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}

async fn remove_file_quietly(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        warn!(path = %path.display(), error = %e, "Failed to remove incomplete file");
    }
}
