//! reqwest-backed [`HttpTransport`]

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use std::sync::Arc;
use tracing::debug;

use super::shared_resources::global_http_client;
use super::{FetcherError, FetcherResult, HttpResponse, HttpTransport};

/// Production transport built on the shared reqwest client
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Arc<Client>,
}

impl ReqwestTransport {
    /// Create a transport using the global HTTP client
    pub fn new() -> Self {
        Self {
            client: global_http_client(),
        }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> FetcherResult<HttpResponse> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetcherError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| FetcherError::BodyError(e.to_string())))
            .boxed();

        Ok(HttpResponse { status, body })
    }
}
