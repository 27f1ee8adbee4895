use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::SearchConfig;

#[derive(Debug, Error)]
pub enum SearchClientError {
    #[error("search service unreachable: {0}")]
    Unreachable(String),
}

/// Upstream reply: HTTP status plus decoded JSON body. Non-2xx statuses are
/// still a `SearchResponse`, since the gateway passes them through verbatim.
#[derive(Debug, Clone)]
pub struct SearchResponse {
    pub status: u16,
    pub body: Value,
}

impl SearchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The external AI search collaborator.
#[async_trait]
pub trait SearchClient: Send + Sync {
    async fn search(&self, query: &str, filters: &Value)
        -> Result<SearchResponse, SearchClientError>;
}

pub struct HttpSearchClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpSearchClient {
    pub fn new(config: &SearchConfig) -> anyhow::Result<Self> {
        // Bound both phases so a stalled search service cannot pin the
        // gateway's requests indefinitely.
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl SearchClient for HttpSearchClient {
    #[instrument(skip(self, filters))]
    async fn search(
        &self,
        query: &str,
        filters: &Value,
    ) -> Result<SearchResponse, SearchClientError> {
        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .json(&json!({ "query": query, "filters": filters }))
            .send()
            .await
            .map_err(|e| SearchClientError::Unreachable(e.to_string()))?;

        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| SearchClientError::Unreachable(e.to_string()))?;
        let body = decode_body(&bytes);

        debug!(status, "search service responded");
        Ok(SearchResponse { status, body })
    }
}

// The service speaks JSON, but an error body from a proxy in front of it
// may not; wrap such bodies so passthrough still yields JSON.
fn decode_body(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| json!({ "message": String::from_utf8_lossy(bytes) }))
}
