//! Per-run memoization of index page listings
//!
//! Days in the same month share an index page. The cache keeps one async
//! once-cell per index URL, so concurrent first requests for a URL await a
//! single fetch instead of racing. Failed fetches are not stored; the next
//! caller for that URL tries again. Entries are never evicted.

use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;

use super::FetcherResult;

type Listing = Arc<Vec<String>>;

/// Cache of index URL to the unfiltered file names found on that page
#[derive(Debug, Default)]
pub struct ListingCache {
    entries: DashMap<String, Arc<OnceCell<Listing>>>,
}

impl ListingCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty cache wrapped in [`Arc`]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Return the cached listing for `index_url`, running `fetch` on first use
    pub async fn get_or_fetch<F, Fut>(&self, index_url: &str, fetch: F) -> FetcherResult<Listing>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = FetcherResult<Vec<String>>>,
    {
        // Clone the cell out so no map shard lock is held across the await.
        let cell = Arc::clone(&self.entries.entry(index_url.to_string()).or_default());

        if let Some(listing) = cell.get() {
            debug!(url = index_url, "Index listing cache hit");
            return Ok(Arc::clone(listing));
        }

        let listing = cell
            .get_or_try_init(|| async { fetch().await.map(Arc::new) })
            .await?;
        Ok(Arc::clone(listing))
    }

    /// Cached listing for `index_url`, if it has been fetched
    pub fn get(&self, index_url: &str) -> Option<Listing> {
        self.entries
            .get(index_url)
            .and_then(|entry| entry.value().get().cloned())
    }

    /// Number of index pages fetched and stored
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.value().initialized())
            .count()
    }

    /// Whether no listing has been stored yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
