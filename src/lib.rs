//! # BGP Archive Downloader Library
//!
//! Mirrors BGP archive files (routing table snapshots and update streams)
//! published by RIPE RIS and RouteViews to local disk, for a collector and an
//! inclusive date range.
//!
//! ## Features
//!
//! - **Two archives**: RIPE RIS (`bview`/`updates`, `.gz`) and RouteViews
//!   (`rib`/`updates`, `.bz2`)
//! - **Bounded concurrency**: one task per day, at most `k` running at once
//! - **Listing cache**: each monthly index page is fetched once per run, even
//!   when many days of the same month resolve concurrently
//! - **Retry with exponential backoff** for every file transfer
//! - **Idempotent reruns**: files already on disk are skipped
//!
//! ## Quick Start
//!
//! ```no_run
//! use bgp_archive_downloader::downloader::{DownloadExecutor, DownloadRequest};
//! use bgp_archive_downloader::source::Source;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let request = DownloadRequest::new(Source::RouteViews, "chicago", "all", "2024-01-01", "2024-01-07")
//!     .with_output_root("./mrt");
//!
//! let summary = DownloadExecutor::new().run(&request).await?;
//! println!("{} files, {} bytes", summary.files_downloaded, summary.bytes_downloaded);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`source`] - Per-archive URL layout, collector allow-lists, file classification
//! - [`registry`] - Embedded registry of archives and collectors
//! - [`fetcher`] - HTTP transport, index page listing, cached listings, file transfers
//! - [`downloader`] - Request model and the date-range orchestrator
//! - [`output`] - On-disk directory layout
//! - [`shutdown`] - Cooperative cancellation

#![warn(missing_docs)]
#![warn(clippy::all)]

/// CLI command implementations
pub mod cli;

/// Date-range download orchestration
pub mod downloader;

/// HTTP fetching of index pages and archive files
pub mod fetcher;

/// Output directory layout
pub mod output;

/// Collector registry with archive metadata
pub mod registry;

/// Graceful shutdown coordination shared across modules
pub mod shutdown;

/// Archive source adapters
pub mod source;

// Re-export commonly used types
pub use downloader::{DownloadError, DownloadExecutor, DownloadRequest, RunSummary};
pub use source::{DataType, FileKind, Source};
