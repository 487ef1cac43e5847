//! Google Custom Search JSON API client

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::config::SearchConfig;
use crate::search::{NO_RESULTS, SearchClient, SearchError, SearchItem, format_results};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

/// Keyed GET client for the Custom Search API
#[derive(Debug, Clone)]
pub struct GoogleSearchClient {
    base_url: String,
    api_key: String,
    engine_id: String,
    include_sources: bool,
    timeout_seconds: u64,
    client: Client,
}

impl GoogleSearchClient {
    /// Builds a client from the search section of the configuration
    ///
    /// The API key and engine id must both be present.
    pub fn try_from_config(config: &SearchConfig) -> Result<Self, SearchError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| SearchError::client("search API key is not configured"))?;
        let engine_id = config
            .engine_id
            .clone()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| SearchError::client("search engine id is not configured"))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| SearchError::client(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.base_url.clone(),
            api_key,
            engine_id,
            include_sources: config.include_sources,
            timeout_seconds: config.timeout_seconds,
            client,
        })
    }
}

#[async_trait::async_trait]
impl SearchClient for GoogleSearchClient {
    async fn search(&self, query: &str) -> Result<String, SearchError> {
        info!(query_length = query.len(), "Running web search");

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", query),
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Search request failed");
                if e.is_timeout() {
                    SearchError::timeout(self.timeout_seconds)
                } else {
                    SearchError::network(e.to_string())
                }
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(status = %status, "Search provider returned non-success status");
            return Ok(NO_RESULTS.to_string());
        }

        let body = response
            .json::<SearchResponse>()
            .await
            .map_err(|e| SearchError::decode(e.to_string()))?;

        debug!(item_count = body.items.len(), "Search provider returned items");
        Ok(format_results(&body.items, self.include_sources))
    }
}
