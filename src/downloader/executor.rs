//! Range orchestrator: runs one task per day with bounded concurrency

use futures_util::stream::{self, StreamExt};
use indicatif::ProgressBar;
use serde::Serialize;
use std::path::Path;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};

use super::config::RetryPolicy;
use super::job::{plan_days, DayTask, DownloadRequest};
use super::DownloadError;
use crate::fetcher::{
    DownloadOutcome, FetcherError, FileFetcher, HttpTransport, IndexFetcher, ListingCache,
    ReqwestTransport,
};
use crate::output::{ensure_dir, OutputLayout};
use crate::shutdown::{SharedShutdown, ShutdownCoordinator};
use crate::source::{create_source, ArchiveSource};

/// What to do with the remaining days once one day has failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Let every day run to completion, report the first error afterwards
    #[default]
    Continue,
    /// Request shutdown on the first error so in-flight work stops early
    AbortOnFirstError,
}

/// Totals for a completed run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Day tasks executed
    pub days: usize,
    /// Files transferred
    pub files_downloaded: u64,
    /// Files already present locally
    pub files_skipped: u64,
    /// Bytes written across all transfers
    pub bytes_downloaded: u64,
    /// Highest number of day tasks running at the same time
    pub peak_concurrency: usize,
}

/// Counters shared by all day tasks of one run
#[derive(Debug, Default)]
struct RunStats {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    downloaded: AtomicU64,
    skipped: AtomicU64,
    bytes: AtomicU64,
}

impl RunStats {
    fn enter(&self) -> InFlightGuard<'_> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        InFlightGuard(&self.in_flight)
    }

    fn record(&self, outcome: DownloadOutcome) {
        match outcome {
            DownloadOutcome::Downloaded { bytes } => {
                self.downloaded.fetch_add(1, Ordering::Relaxed);
                self.bytes.fetch_add(bytes, Ordering::Relaxed);
            }
            DownloadOutcome::Skipped => {
                self.skipped.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    fn summary(&self, days: usize) -> RunSummary {
        RunSummary {
            days,
            files_downloaded: self.downloaded.load(Ordering::Relaxed),
            files_skipped: self.skipped.load(Ordering::Relaxed),
            bytes_downloaded: self.bytes.load(Ordering::Relaxed),
            peak_concurrency: self.peak.load(Ordering::SeqCst),
        }
    }
}

struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Per-run collaborators borrowed by every day task
struct RunContext<'a> {
    source: &'a dyn ArchiveSource,
    index: &'a IndexFetcher,
    files: &'a FileFetcher,
    stats: &'a RunStats,
}

/// Download executor orchestrating a date range
pub struct DownloadExecutor {
    transport: Arc<dyn HttpTransport>,
    cache: Arc<ListingCache>,
    retry_policy: RetryPolicy,
    failure_policy: FailurePolicy,
    shutdown: SharedShutdown,
    progress: Option<ProgressBar>,
}

impl DownloadExecutor {
    /// Create an executor using the shared reqwest client
    pub fn new() -> Self {
        Self::with_transport(Arc::new(ReqwestTransport::new()))
    }

    /// Create an executor on top of a custom transport
    pub fn with_transport(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            cache: ListingCache::shared(),
            retry_policy: RetryPolicy::default(),
            failure_policy: FailurePolicy::default(),
            shutdown: ShutdownCoordinator::shared(),
            progress: None,
        }
    }

    /// Set the per-file retry policy
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Set the behaviour after the first failed day
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Attach a shared shutdown handle for graceful cancellation.
    pub fn with_shutdown(mut self, shutdown: SharedShutdown) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Share a listing cache across runs
    pub fn with_cache(mut self, cache: Arc<ListingCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Advance `bar` by one for every finished day
    pub fn with_progress(mut self, bar: ProgressBar) -> Self {
        self.progress = Some(bar);
        self
    }

    /// Listing cache used by this executor
    pub fn cache(&self) -> &Arc<ListingCache> {
        &self.cache
    }

    /// Download every matching file for every day of `request`
    ///
    /// Validation happens before any network or filesystem activity. All day
    /// tasks are driven to completion; the first error by completion order is
    /// returned after the rest have settled.
    pub async fn run(&self, request: &DownloadRequest) -> Result<RunSummary, DownloadError> {
        let source = create_source(request.source)?;
        source.validate_collector(&request.collector)?;
        let data_type = source.parse_data_type(&request.data_type)?;
        let (start, end) = request.date_range()?;

        OutputLayout::new(&request.output_root)
            .ensure_root()
            .await
            .map_err(|e| DownloadError::OutputDirError(e.to_string()))?;

        let concurrency = request.effective_concurrency();
        let tasks = plan_days(&request.collector, data_type, start, end, &request.output_root);
        let days = tasks.len();

        info!(
            source = %request.source,
            collector = %request.collector,
            data_type = %request.data_type,
            %start,
            %end,
            days,
            concurrency,
            "Starting download"
        );

        if let Some(bar) = &self.progress {
            bar.set_length(days as u64);
        }

        let index = IndexFetcher::new(Arc::clone(&self.transport), source.extension())
            .with_shutdown(Arc::clone(&self.shutdown));
        let files = FileFetcher::new(Arc::clone(&self.transport))
            .with_policy(self.retry_policy.clone())
            .with_shutdown(Arc::clone(&self.shutdown));
        let stats = RunStats::default();
        let ctx = RunContext {
            source: source.as_ref(),
            index: &index,
            files: &files,
            stats: &stats,
        };

        let mut results = stream::iter(tasks.into_iter().map(|task| {
            let span = info_span!("day", date = %task.date);
            self.run_day(&ctx, task).instrument(span)
        }))
        .buffer_unordered(concurrency);

        let mut first_error: Option<DownloadError> = None;
        while let Some(result) = results.next().await {
            if let Some(bar) = &self.progress {
                bar.inc(1);
            }
            let Err(e) = result else { continue };

            if first_error.is_some() {
                debug!(error = %e, "Additional day failure");
                continue;
            }
            if !e.is_cancelled() {
                warn!(error = %e, "Day failed");
                if self.failure_policy == FailurePolicy::AbortOnFirstError {
                    self.shutdown.request_shutdown();
                }
            }
            first_error = Some(e);
        }
        drop(results);

        let summary = stats.summary(days);
        match first_error {
            Some(e) => Err(e),
            None => {
                info!(
                    days = summary.days,
                    downloaded = summary.files_downloaded,
                    skipped = summary.files_skipped,
                    bytes = summary.bytes_downloaded,
                    "Download complete"
                );
                Ok(summary)
            }
        }
    }

    /// Resolve and download one day's files
    async fn run_day(&self, ctx: &RunContext<'_>, task: DayTask) -> Result<(), DownloadError> {
        let _slot = ctx.stats.enter();
        if self.shutdown.is_shutdown_requested() {
            return Err(DownloadError::Cancelled);
        }

        let queries = ctx
            .source
            .index_queries(&task.collector, task.date, task.data_type);
        let mut listings = Vec::with_capacity(queries.len());
        for query in queries {
            let names = ctx
                .index
                .listing(&self.cache, &query.url)
                .await
                .map_err(|e| index_error(task.date, e))?;
            listings.push((query, names));
        }

        let selected = ctx.source.select_files(
            &listings,
            task.date,
            task.data_type,
            &task.collector,
            &task.output_root,
        );
        debug!(files = selected.len(), "Resolved files for day");

        for file in selected {
            let dir = file.local_path.parent().unwrap_or(Path::new("."));
            ensure_dir(dir)
                .await
                .map_err(|e| DownloadError::OutputDirError(e.to_string()))?;

            let outcome = ctx
                .files
                .download(&file.download_url, &file.local_path)
                .await
                .map_err(|cause| match cause {
                    FetcherError::Cancelled => DownloadError::Cancelled,
                    cause => DownloadError::TransferError {
                        file: file.file_name.clone(),
                        date: task.date,
                        cause,
                    },
                })?;

            if let DownloadOutcome::Downloaded { .. } = outcome {
                info!("Downloaded: {} to {}", file.file_name, dir.display());
            }
            ctx.stats.record(outcome);
        }

        Ok(())
    }
}

impl Default for DownloadExecutor {
    fn default() -> Self {
        Self::new()
    }
}

fn index_error(date: chrono::NaiveDate, error: FetcherError) -> DownloadError {
    match error {
        FetcherError::Cancelled => DownloadError::Cancelled,
        source => DownloadError::Index { date, source },
    }
}
