//! Remote index and file fetchers
//!
//! Everything that talks to the archives goes through the [`HttpTransport`]
//! trait. The production implementation is [`http::ReqwestTransport`]; tests
//! substitute an in-memory transport.

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::Stream;
use reqwest::StatusCode;
use std::pin::Pin;

pub mod file;
pub mod http;
pub mod index;
pub mod listing_cache;
pub mod shared_resources;

pub use file::{DownloadOutcome, FileFetcher};
pub use http::ReqwestTransport;
pub use index::IndexFetcher;
pub use listing_cache::ListingCache;

/// Fetcher errors
#[derive(Debug, thiserror::Error)]
pub enum FetcherError {
    /// Index page could not be requested or answered with a non-success status
    #[error("index unavailable at {url}: {reason}")]
    IndexUnavailable {
        /// Index page URL
        url: String,
        /// Transport error or HTTP status
        reason: String,
    },

    /// Index page body could not be read completely
    #[error("failed to read index body from {url}: {reason}")]
    IndexReadError {
        /// Index page URL
        url: String,
        /// Underlying read error
        reason: String,
    },

    /// Transport level failure (DNS, connect, TLS, timeout)
    #[error("network error: {0}")]
    NetworkError(String),

    /// Remote answered with a non-success status
    #[error("bad status for {url}: {status}")]
    HttpStatus {
        /// Requested URL
        url: String,
        /// Status returned by the server
        status: StatusCode,
    },

    /// Response body stream failed mid-transfer
    #[error("body error: {0}")]
    BodyError(String),

    /// Local file could not be created or written
    #[error("write error: {0}")]
    WriteError(String),

    /// Work abandoned because shutdown was requested
    #[error("cancelled")]
    Cancelled,
}

/// Result type for fetcher operations
pub type FetcherResult<T> = Result<T, FetcherError>;

/// Stream of body chunks from a transport
pub type BodyStream = Pin<Box<dyn Stream<Item = FetcherResult<Bytes>> + Send>>;

/// Response returned by an [`HttpTransport`]
pub struct HttpResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Streaming response body
    pub body: BodyStream,
}

impl std::fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Minimal HTTP GET abstraction used by the index and file fetchers
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Issue a GET request.
    ///
    /// Transport failures are reported as [`FetcherError::NetworkError`]; a
    /// response with any status is returned as `Ok` and interpreted by the
    /// caller.
    async fn get(&self, url: &str) -> FetcherResult<HttpResponse>;
}
