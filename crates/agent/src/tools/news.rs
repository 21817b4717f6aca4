//! Recent news articles via NewsAPI

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use researchdesk_config::NewsConfig;

use super::{clamp_limit, query_schema, ToolTrait, USER_AGENT};
use crate::invocation::{Record, ToolKind, ToolOutput};

pub const NO_RESULTS: &str = "❌ No articles found for this query.";

/// NewsAPI `/everything` search, English, most relevant first
pub struct NewsTool {
    client: Client,
    api_key: String,
    api_base: String,
    max_results: u32,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct NewsResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct Article {
    #[serde(default)]
    source: Option<Source>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Source {
    #[serde(default)]
    name: Option<String>,
}

impl Article {
    fn into_record(self) -> Record {
        let mut item = Record::new();
        item.insert(
            "source".to_string(),
            self.source.and_then(|s| s.name).unwrap_or_default(),
        );
        item.insert("title".to_string(), self.title.unwrap_or_default());
        item.insert("url".to_string(), self.url.unwrap_or_default());
        item
    }
}

impl NewsTool {
    pub fn new(api_key: impl Into<String>, api_base: impl Into<String>, max_results: u32) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            api_base: api_base.into(),
            max_results,
            timeout: Duration::from_secs(15),
        }
    }

    /// Build from config; `api_key` takes precedence over the configured key
    pub fn from_config(config: &NewsConfig, api_key: Option<String>) -> Self {
        let key = api_key.unwrap_or_else(|| config.api_key.clone());
        Self::new(key, config.api_base.clone(), config.max_results)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    async fn search(&self, query: &str, limit: u32) -> Result<Vec<Record>, String> {
        if !self.is_configured() {
            return Err("NEWS_API_KEY not configured".to_string());
        }

        let url = format!("{}/everything", self.api_base.trim_end_matches('/'));
        let page_size = limit.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", query),
                ("language", "en"),
                ("sortBy", "relevancy"),
                ("pageSize", page_size.as_str()),
            ])
            .header("X-Api-Key", &self.api_key)
            .header("User-Agent", USER_AGENT)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        let body = response.text().await.map_err(|e| e.to_string())?;

        let parsed: NewsResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => return Err(format!("NewsAPI returned {}", status)),
            Err(e) => return Err(format!("invalid response: {}", e)),
        };

        if !status.is_success() || parsed.status == "error" {
            return Err(parsed
                .message
                .unwrap_or_else(|| format!("NewsAPI returned {}", status)));
        }

        Ok(parsed
            .articles
            .into_iter()
            .take(limit as usize)
            .map(Article::into_record)
            .collect())
    }
}

#[async_trait]
impl ToolTrait for NewsTool {
    fn kind(&self) -> ToolKind {
        ToolKind::News
    }

    fn description(&self) -> &str {
        "Search recent news coverage. Returns source, title and URL of the most relevant English articles."
    }

    fn parameters(&self) -> Value {
        query_schema(
            "The news search query",
            "max_results",
            "Maximum number of articles to return",
        )
    }

    async fn invoke(&self, query: &str, limit: Option<u32>) -> ToolOutput {
        let limit = clamp_limit(limit, self.max_results);
        debug!("news search: {} (max {})", query, limit);

        match self.search(query, limit).await {
            Ok(articles) if articles.is_empty() => ToolOutput::text(NO_RESULTS),
            Ok(articles) => ToolOutput::Items(articles),
            Err(e) => {
                warn!("news search failed: {}", e);
                ToolOutput::Text(format!("❌ Error fetching from News API: {}", e))
            }
        }
    }
}
