//! Wikipedia background lookup

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::debug;

use researchdesk_config::WikipediaConfig;

use super::{query_schema, ToolTrait, USER_AGENT};
use crate::invocation::{ToolKind, ToolOutput};

pub const NOT_FOUND: &str = "❌ No Wikipedia page found for this query.";
/// Titles listed for a disambiguation page
const CANDIDATES: usize = 5;

/// Summary of the best-matching Wikipedia page
pub struct WikipediaTool {
    client: Client,
    endpoint: String,
    sentences: usize,
    timeout: Duration,
}

impl WikipediaTool {
    pub fn new(endpoint: impl Into<String>, sentences: usize) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            sentences,
            timeout: Duration::from_secs(15),
        }
    }

    pub fn from_config(config: &WikipediaConfig) -> Self {
        Self::new(config.endpoint(), config.sentences)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn lookup(&self, query: &str, sentences: usize) -> Result<String, reqwest::Error> {
        // One extra page: the disambiguation page itself is never listed.
        let limit = (CANDIDATES + 1).to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("formatversion", "2"),
                ("generator", "search"),
                ("gsrsearch", query),
                ("gsrlimit", limit.as_str()),
                ("prop", "extracts|pageprops"),
                ("ppprop", "disambiguation"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("exlimit", "max"),
                ("redirects", "1"),
            ])
            .header("User-Agent", USER_AGENT)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?;

        let body: SearchResponse = response.json().await?;
        Ok(summarize(body, sentences))
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    title: String,
    #[serde(default)]
    index: u32,
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    pageprops: Option<Value>,
}

impl Page {
    fn is_disambiguation(&self) -> bool {
        self.pageprops
            .as_ref()
            .map(|p| p.get("disambiguation").is_some())
            .unwrap_or(false)
    }
}

fn summarize(body: SearchResponse, sentences: usize) -> String {
    let mut pages = body.query.map(|q| q.pages).unwrap_or_default();
    pages.sort_by_key(|p| p.index);

    let Some(best) = pages.first() else {
        return NOT_FOUND.to_string();
    };

    if best.is_disambiguation() {
        let mut options: Vec<&str> = pages
            .iter()
            .skip(1)
            .map(|p| p.title.as_str())
            .take(CANDIDATES)
            .collect();
        if options.is_empty() {
            options.push(best.title.as_str());
        }
        return format!("⚠️ Multiple results found: {}...", options.join(", "));
    }

    match best.extract.as_deref().map(str::trim) {
        Some(extract) if !extract.is_empty() => first_sentences(extract, sentences),
        _ => NOT_FOUND.to_string(),
    }
}

fn sentence_end() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"([.!?]+["')\]]*)\s+"#).expect("sentence regex is valid"))
}

/// Keep the first `count` sentences of `text`; zero keeps everything
pub fn first_sentences(text: &str, count: usize) -> String {
    let text = text.trim();
    if count == 0 {
        return text.to_string();
    }

    sentence_end()
        .captures_iter(text)
        .filter_map(|cap| cap.get(1))
        .nth(count - 1)
        .map(|end| text[..end.end()].to_string())
        .unwrap_or_else(|| text.to_string())
}

#[async_trait]
impl ToolTrait for WikipediaTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Wikipedia
    }

    fn description(&self) -> &str {
        "Look up background information and definitions on Wikipedia. Returns a short summary of the best-matching page."
    }

    fn parameters(&self) -> Value {
        query_schema(
            "Topic to look up",
            "sentences",
            "Number of summary sentences to return",
        )
    }

    async fn invoke(&self, query: &str, limit: Option<u32>) -> ToolOutput {
        let sentences = limit.map(|n| n as usize).unwrap_or(self.sentences);
        debug!("wikipedia lookup: {}", query);

        match self.lookup(query, sentences).await {
            Ok(summary) => ToolOutput::Text(summary),
            Err(e) => ToolOutput::Text(format!("❌ Error fetching from Wikipedia: {}", e)),
        }
    }
}
