//! arXiv paper search over the Atom export API

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::debug;

use researchdesk_config::ArxivConfig;

use super::{clamp_limit, query_schema, ToolTrait, USER_AGENT};
use crate::invocation::{Record, ToolKind, ToolOutput};

pub const NO_RESULTS: &str = "❌ No papers found for this query.";

/// Relevance-ranked arXiv search
pub struct ArxivTool {
    client: Client,
    api_base: String,
    max_results: u32,
    timeout: Duration,
}

impl ArxivTool {
    pub fn new(api_base: impl Into<String>, max_results: u32) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.into(),
            max_results,
            timeout: Duration::from_secs(15),
        }
    }

    pub fn from_config(config: &ArxivConfig) -> Self {
        Self::new(config.api_base.clone(), config.max_results)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn search(&self, query: &str, limit: u32) -> Result<Vec<Record>, String> {
        let search_query = format!("all:{}", query);
        let max_results = limit.to_string();

        let response = self
            .client
            .get(&self.api_base)
            .query(&[
                ("search_query", search_query.as_str()),
                ("start", "0"),
                ("max_results", max_results.as_str()),
                ("sortBy", "relevance"),
                ("sortOrder", "descending"),
            ])
            .header("User-Agent", USER_AGENT)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("arXiv returned {}", status));
        }

        let feed = response.text().await.map_err(|e| e.to_string())?;
        let mut papers = parse_feed(&feed)?;
        papers.truncate(limit as usize);
        Ok(papers)
    }
}

struct FeedSelectors {
    entry: Selector,
    title: Selector,
    summary: Selector,
    pdf_link: Selector,
    id: Selector,
}

impl FeedSelectors {
    fn new() -> Result<Self, String> {
        let parse = |css: &str| Selector::parse(css).map_err(|e| format!("bad selector {}: {}", css, e));
        Ok(Self {
            entry: parse("entry")?,
            title: parse("title")?,
            summary: parse("summary")?,
            pdf_link: parse(r#"link[title="pdf"]"#)?,
            id: parse("id")?,
        })
    }
}

fn whitespace() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex is valid"))
}

fn element_text(entry: &ElementRef<'_>, selector: &Selector) -> String {
    entry
        .select(selector)
        .next()
        .map(|el| el.text().collect::<String>())
        .map(|text| whitespace().replace_all(text.trim(), " ").into_owned())
        .unwrap_or_default()
}

/// Parse an arXiv Atom feed into {title, summary, url} records.
///
/// The url is the PDF link, falling back to the entry id.
pub fn parse_feed(feed: &str) -> Result<Vec<Record>, String> {
    let selectors = FeedSelectors::new()?;
    let document = Html::parse_document(feed);

    let papers = document
        .select(&selectors.entry)
        .map(|entry| {
            let url = entry
                .select(&selectors.pdf_link)
                .next()
                .and_then(|link| link.value().attr("href"))
                .map(str::to_string)
                .unwrap_or_else(|| element_text(&entry, &selectors.id));

            let mut paper = Record::new();
            paper.insert("title".to_string(), element_text(&entry, &selectors.title));
            paper.insert(
                "summary".to_string(),
                element_text(&entry, &selectors.summary),
            );
            paper.insert("url".to_string(), url);
            paper
        })
        .collect();

    Ok(papers)
}

#[async_trait]
impl ToolTrait for ArxivTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Arxiv
    }

    fn description(&self) -> &str {
        "Find academic papers on arXiv. Returns titles, summaries and PDF URLs."
    }

    fn parameters(&self) -> Value {
        query_schema(
            "The search query for academic papers",
            "max_results",
            "Maximum number of papers to return",
        )
    }

    async fn invoke(&self, query: &str, limit: Option<u32>) -> ToolOutput {
        let limit = clamp_limit(limit, self.max_results);
        debug!("arxiv search: {} (max {})", query, limit);

        match self.search(query, limit).await {
            Ok(papers) if papers.is_empty() => ToolOutput::text(NO_RESULTS),
            Ok(papers) => ToolOutput::Items(papers),
            Err(e) => ToolOutput::Text(format!("❌ Error fetching from arXiv: {}", e)),
        }
    }
}
