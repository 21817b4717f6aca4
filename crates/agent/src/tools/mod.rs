//! Research lookup tools

pub mod arxiv;
pub mod news;
pub mod wikipedia;

pub use arxiv::ArxivTool;
pub use news::NewsTool;
pub use wikipedia::WikipediaTool;

use async_trait::async_trait;
use researchdesk_config::ToolsConfig;
use researchdesk_provider::Tool;
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;

use crate::invocation::{ToolKind, ToolOutput};
use crate::{AgentError, Result};

pub(crate) const USER_AGENT: &str = concat!(
    "researchdesk/",
    env!("CARGO_PKG_VERSION"),
    " (research assistant)"
);

/// Upper bound on any result-count argument coming from the model
pub const MAX_LIMIT: u32 = 20;

/// A read-only lookup source.
///
/// `invoke` never fails: transport and parse problems come back as
/// descriptive `ToolOutput::Text`.
#[async_trait]
pub trait ToolTrait: Send + Sync {
    fn kind(&self) -> ToolKind;

    fn name(&self) -> &'static str {
        self.kind().name()
    }

    fn description(&self) -> &str;
    fn parameters(&self) -> Value;
    async fn invoke(&self, query: &str, limit: Option<u32>) -> ToolOutput;
}

pub fn to_provider_tool(tool: &dyn ToolTrait) -> Tool {
    Tool::new(tool.name(), tool.description(), tool.parameters())
}

/// JSON schema shared by the tools: a query plus one optional count
pub(crate) fn query_schema(query_desc: &str, limit_name: &str, limit_desc: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "query": { "type": "string", "description": query_desc },
            limit_name: {
                "type": "integer",
                "description": limit_desc,
                "minimum": 1,
                "maximum": MAX_LIMIT
            }
        },
        "required": ["query"]
    })
}

/// Arguments as sent by the model
#[derive(Debug, Deserialize)]
struct ToolArgs {
    query: String,
    #[serde(
        default,
        alias = "sentences",
        alias = "limit",
        deserialize_with = "lenient_limit"
    )]
    max_results: Option<u32>,
}

/// Accept `3`, `3.0` or `"3"` for a count. Anything unusable falls back to
/// the tool default instead of failing the call.
fn lenient_limit<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_limit))
}

fn parse_limit(value: &Value) -> Option<u32> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if n.is_finite() && n >= 0.0 && n.fract() == 0.0 {
        Some(n.min(u32::MAX as f64) as u32)
    } else {
        None
    }
}

pub(crate) fn clamp_limit(limit: Option<u32>, default: u32) -> u32 {
    limit.unwrap_or(default).clamp(1, MAX_LIMIT)
}

type BoxedTool = Box<dyn ToolTrait + Send + Sync>;

/// Registry of the tools exposed to the model, in registration order
pub struct ToolRegistry {
    tools: HashMap<ToolKind, BoxedTool>,
    order: Vec<ToolKind>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn register<T: ToolTrait + 'static>(&mut self, tool: T) {
        let kind = tool.kind();
        if self.tools.insert(kind, Box::new(tool)).is_none() {
            self.order.push(kind);
        }
    }

    pub fn get(&self, name: &str) -> Option<&(dyn ToolTrait + Send + Sync)> {
        let kind = ToolKind::from_name(name)?;
        self.tools.get(&kind).map(|t| t.as_ref())
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Tool definitions for the model, in registration order
    pub fn definitions(&self) -> Vec<Tool> {
        self.order
            .iter()
            .filter_map(|kind| self.tools.get(kind))
            .map(|t| to_provider_tool(t.as_ref()))
            .collect()
    }

    /// Run a tool by the name the model used
    pub async fn execute(&self, name: &str, args: Value) -> Result<ToolOutput> {
        let tool = self
            .get(name)
            .ok_or_else(|| AgentError::ToolNotFound(name.to_string()))?;
        // Only a missing or non-string query rejects the call.
        let args: ToolArgs = serde_json::from_value(args)
            .map_err(|e| AgentError::InvalidArguments(format!("{}: {}", name, e)))?;
        Ok(tool.invoke(&args.query, args.max_results).await)
    }

    pub fn names(&self) -> Vec<String> {
        self.order.iter().map(|k| k.name().to_string()).collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Register Wikipedia, arXiv and NewsAPI tools from config
pub fn register_default_tools(
    registry: &mut ToolRegistry,
    config: &ToolsConfig,
    news_api_key: Option<String>,
) {
    let timeout = Duration::from_secs(config.timeout_secs);

    registry.register(WikipediaTool::from_config(&config.wikipedia).with_timeout(timeout));
    registry.register(ArxivTool::from_config(&config.arxiv).with_timeout(timeout));
    registry.register(NewsTool::from_config(&config.news, news_api_key).with_timeout(timeout));
}
