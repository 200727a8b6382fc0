//! Shared resources for all fetcher instances
//!
//! A single HTTP client is shared by every index and file fetcher so that
//! connections to the two archive hosts are pooled across concurrent days.

use once_cell::sync::Lazy;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// HTTP connect timeout (seconds) - time to establish TCP connection
const HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Idle pooled connections are dropped after this many seconds
const HTTP_POOL_IDLE_TIMEOUT_SECS: u64 = 90;

/// User agent sent with every request
const USER_AGENT: &str = concat!("bgp-archive-downloader/", env!("CARGO_PKG_VERSION"));

/// Global HTTP client shared by all fetcher instances
///
/// Only the connect phase is bounded. Full-table snapshots run to hundreds of
/// megabytes, so an overall request timeout would cut off healthy transfers.
pub static GLOBAL_HTTP_CLIENT: Lazy<Arc<Client>> = Lazy::new(|| {
    Arc::new(
        Client::builder()
            .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
            .pool_idle_timeout(Duration::from_secs(HTTP_POOL_IDLE_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|e| {
                panic!("FATAL: Failed to build HTTP client: {}. Check system TLS configuration.", e);
            }),
    )
});

/// Get the global HTTP client
///
/// Returns a clone of the Arc, which is cheap (just increments ref count)
pub fn global_http_client() -> Arc<Client> {
    GLOBAL_HTTP_CLIENT.clone()
}
