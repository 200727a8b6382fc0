//! Monthly index page fetcher
//!
//! Archives publish plain HTML directory listings. File names are recovered by
//! link-pattern matching on `href="..."` attributes rather than a full HTML
//! parser; only links ending in the archive's file extension are kept.

use futures_util::StreamExt;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::debug;

use super::listing_cache::ListingCache;
use super::{FetcherError, FetcherResult, HttpTransport};
use crate::shutdown::SharedShutdown;

static HREF_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"href="([^"]+)""#).expect("href pattern is a valid regex"));

/// Extract link targets ending in `.{extension}`, in document order
pub fn extract_links(body: &str, extension: &str) -> Vec<String> {
    let suffix = format!(".{extension}");
    HREF_PATTERN
        .captures_iter(body)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|target| target.ends_with(&suffix))
        .map(str::to_string)
        .collect()
}

/// Fetches an index page and extracts archive file names from it
pub struct IndexFetcher {
    transport: Arc<dyn HttpTransport>,
    extension: String,
    shutdown: Option<SharedShutdown>,
}

impl IndexFetcher {
    /// Create a fetcher keeping links that end in `.{extension}`
    pub fn new(transport: Arc<dyn HttpTransport>, extension: impl Into<String>) -> Self {
        Self {
            transport,
            extension: extension.into(),
            shutdown: None,
        }
    }

    /// Abandon in-flight requests when shutdown is requested
    pub fn with_shutdown(mut self, shutdown: SharedShutdown) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Fetch `index_url` and return every matching file name, unfiltered by date
    pub async fn fetch(&self, index_url: &str) -> FetcherResult<Vec<String>> {
        match &self.shutdown {
            Some(shutdown) => shutdown
                .run_until_shutdown(self.fetch_uncancelled(index_url))
                .await
                .unwrap_or(Err(FetcherError::Cancelled)),
            None => self.fetch_uncancelled(index_url).await,
        }
    }

    /// Cached variant of [`IndexFetcher::fetch`]
    ///
    /// Concurrent callers for the same URL share one request.
    pub async fn listing(
        &self,
        cache: &ListingCache,
        index_url: &str,
    ) -> FetcherResult<Arc<Vec<String>>> {
        cache.get_or_fetch(index_url, || self.fetch(index_url)).await
    }

    async fn fetch_uncancelled(&self, index_url: &str) -> FetcherResult<Vec<String>> {
        debug!("Fetching index page {}", index_url);

        let mut response =
            self.transport
                .get(index_url)
                .await
                .map_err(|e| FetcherError::IndexUnavailable {
                    url: index_url.to_string(),
                    reason: e.to_string(),
                })?;

        if !response.status.is_success() {
            return Err(FetcherError::IndexUnavailable {
                url: index_url.to_string(),
                reason: format!("HTTP {}", response.status),
            });
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.body.next().await {
            let chunk = chunk.map_err(|e| FetcherError::IndexReadError {
                url: index_url.to_string(),
                reason: e.to_string(),
            })?;
            body.extend_from_slice(&chunk);
        }

        let files = extract_links(&String::from_utf8_lossy(&body), &self.extension);
        debug!(url = index_url, files = files.len(), "Parsed index page");
        Ok(files)
    }
}
