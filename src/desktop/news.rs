//! Web content lookup behind the `fetch_news` skill.
//!
//! Unlike `search_web`, which only opens a browser, this returns the
//! actual result snippets so the model can build on them in the next turn
//! (e.g. "search X then turn it into a presentation").

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

use crate::config::NewsConfig;

/// A single search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct NewsItem {
    pub title: String,
    pub body: String,
    pub url: String,
}

#[async_trait]
pub trait NewsProvider: Send + Sync {
    async fn search(&self, query: &str, max_results: u8) -> anyhow::Result<Vec<NewsItem>>;

    fn provider_name(&self) -> &str;
}

/// Builds the provider named in the config.
pub fn from_config(config: &NewsConfig) -> anyhow::Result<Box<dyn NewsProvider>> {
    match config.provider.as_str() {
        "tavily" => Ok(Box::new(TavilyProvider::new(
            &config.api_key,
            Duration::from_secs(config.timeout_secs.max(1)),
        )?)),
        other => anyhow::bail!("Unsupported news provider: '{other}'. Supported: 'tavily'."),
    }
}

/// Collapses whitespace runs in the query.
pub fn clean_query(query: &str) -> String {
    query.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Drops repeated titles and caps the list at `max_results`.
pub fn dedup_results(items: Vec<NewsItem>, max_results: usize) -> Vec<NewsItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.title.clone()))
        .take(max_results)
        .collect()
}

/// `[n] title\nbody\nSource: url`, blank-line separated.
pub fn format_results(items: &[NewsItem]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("[{}] {}\n{}\nSource: {}", i + 1, item.title, item.body, item.url))
        .collect::<Vec<_>>()
        .join("\n\n")
}

// ── Tavily ───────────────────────────────────────────────

const TAVILY_SEARCH_URL: &str = "https://api.tavily.com/search";

#[derive(Serialize)]
struct TavilyRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: u8,
    topic: &'a str,
}

#[derive(Deserialize)]
struct TavilyApiResponse {
    #[serde(default)]
    results: Vec<TavilyApiResult>,
}

#[derive(Deserialize)]
struct TavilyApiResult {
    title: String,
    url: String,
    #[serde(default)]
    content: String,
}

pub struct TavilyProvider {
    client: Client,
    api_key: String,
    endpoint: String,
    timeout: Duration,
}

impl TavilyProvider {
    pub fn new(api_key: &str, timeout: Duration) -> anyhow::Result<Self> {
        Self::with_endpoint(api_key, TAVILY_SEARCH_URL, timeout)
    }

    pub fn with_endpoint(api_key: &str, endpoint: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.to_string(),
            endpoint: endpoint.to_string(),
            timeout,
        })
    }

    fn request_error(&self, e: reqwest::Error) -> anyhow::Error {
        if e.is_timeout() {
            anyhow::anyhow!("Tavily did not answer within {}s", self.timeout.as_secs())
        } else {
            e.into()
        }
    }
}

#[async_trait]
impl NewsProvider for TavilyProvider {
    async fn search(&self, query: &str, max_results: u8) -> anyhow::Result<Vec<NewsItem>> {
        let request = TavilyRequest {
            api_key: &self.api_key,
            query,
            max_results,
            topic: "general",
        };

        debug!("Tavily search: {query} (max {max_results})");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Tavily API returned {status}: {body}");
        }

        let tavily: TavilyApiResponse = response.json().await.map_err(|e| self.request_error(e))?;

        Ok(tavily
            .results
            .into_iter()
            .map(|r| NewsItem {
                title: r.title,
                body: r.content,
                url: r.url,
            })
            .collect())
    }

    fn provider_name(&self) -> &str {
        "tavily"
    }
}
