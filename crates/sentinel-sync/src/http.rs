//! HTTP client for the recent-posts search API.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use crate::ingest::{FeedbackSource, RawItem};
use crate::SearchError;

pub const DEFAULT_SEARCH_BASE: &str = "https://api.twitter.com";

#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Like `https://api.twitter.com` (no trailing slash needed).
    pub base_url: String,
    pub bearer_token: Option<String>,
    pub max_results: u8,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SEARCH_BASE.into(),
            bearer_token: None,
            max_results: 10,
        }
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    data: Option<Vec<RawItem>>,
}

/// Bearer-authenticated search client.
pub struct SearchClient {
    client: reqwest::Client,
    base_url: String,
    bearer_token: Option<String>,
    max_results: u8,
}

impl SearchClient {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            bearer_token: config.bearer_token.filter(|t| !t.trim().is_empty()),
            max_results: config.max_results,
        }
    }

    /// Recent posts matching `query`. A response without a `data` array
    /// means no matches.
    pub async fn search_recent(&self, query: &str) -> Result<Vec<RawItem>, SearchError> {
        let token = self
            .bearer_token
            .as_deref()
            .ok_or(SearchError::MissingCredential("SEARCH_BEARER_TOKEN"))?;

        let url = format!("{}/2/tweets/search/recent", self.base_url);
        let max_results = self.max_results.to_string();

        info!(url = %url, query, "searching recent posts");
        let resp = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&[
                ("query", query),
                ("max_results", max_results.as_str()),
                ("tweet.fields", "created_at,author_id"),
            ])
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SearchError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        let parsed: SearchResponse = serde_json::from_str(&body)?;
        let items = parsed.data.unwrap_or_default();
        info!(count = items.len(), "search complete");
        Ok(items)
    }
}

#[async_trait]
impl FeedbackSource for SearchClient {
    async fn search(&self, query: &str) -> Result<Vec<RawItem>, SearchError> {
        self.search_recent(query).await
    }
}
