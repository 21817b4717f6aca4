//! Tool identities and the shape of their outputs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use researchdesk_provider::Message;

/// One structured result item (paper, article, ...)
pub type Record = BTreeMap<String, String>;

/// The three lookup tools the research agent may call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    Wikipedia,
    Arxiv,
    News,
}

impl ToolKind {
    /// Priority order the agent is instructed to follow
    pub const ALL: [ToolKind; 3] = [ToolKind::Wikipedia, ToolKind::Arxiv, ToolKind::News];

    /// Function name advertised to the model
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Wikipedia => "wikipedia",
            ToolKind::Arxiv => "arxiv_papers",
            ToolKind::News => "news_search",
        }
    }

    /// Human-facing label
    pub fn label(self) -> &'static str {
        match self {
            ToolKind::Wikipedia => "Wikipedia",
            ToolKind::Arxiv => "ArXiv Papers",
            ToolKind::News => "News Search",
        }
    }

    /// Resolve a model-supplied tool name. Labels are accepted too.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == name || kind.label() == name)
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raw output of a tool.
///
/// `Text` carries summaries and failure messages alike; the two are not
/// distinguished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolOutput {
    Text(String),
    Items(Vec<Record>),
}

impl ToolOutput {
    pub fn text(s: impl Into<String>) -> Self {
        ToolOutput::Text(s.into())
    }

    pub fn is_text(&self) -> bool {
        matches!(self, ToolOutput::Text(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ToolOutput::Text(s) => Some(s),
            ToolOutput::Items(_) => None,
        }
    }

    pub fn items(&self) -> Option<&[Record]> {
        match self {
            ToolOutput::Items(items) => Some(items),
            ToolOutput::Text(_) => None,
        }
    }

    /// Content placed in the tool message sent back to the model
    pub fn to_content(&self) -> String {
        match self {
            ToolOutput::Text(s) => s.clone(),
            ToolOutput::Items(items) => {
                serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
            }
        }
    }

    /// Recover an output from tool message content.
    ///
    /// A JSON array of flat objects becomes `Items` (null values become
    /// empty strings); anything else is kept verbatim as `Text`.
    pub fn from_content(content: &str) -> Self {
        match serde_json::from_str::<Vec<BTreeMap<String, Option<String>>>>(content) {
            Ok(items) => ToolOutput::Items(
                items
                    .into_iter()
                    .map(|item| {
                        item.into_iter()
                            .map(|(k, v)| (k, v.unwrap_or_default()))
                            .collect()
                    })
                    .collect(),
            ),
            Err(_) => ToolOutput::Text(content.to_string()),
        }
    }
}

/// A tool that ran during one orchestration step, with what it returned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocationRecord {
    pub tool: ToolKind,
    pub output: ToolOutput,
}

impl ToolInvocationRecord {
    pub fn new(tool: ToolKind, output: ToolOutput) -> Self {
        Self { tool, output }
    }

    /// Read a record from a tool-role transcript message.
    ///
    /// Only paper and news content is parsed for a list; encyclopedia
    /// content is kept verbatim. Returns `None` for other roles and for
    /// tools outside the three known ones.
    pub fn from_message(message: &Message) -> Option<Self> {
        if !message.is_tool() {
            return None;
        }
        let tool = ToolKind::from_name(message.name.as_deref()?)?;
        let content = message.content.as_deref().unwrap_or_default();
        let output = match tool {
            ToolKind::Wikipedia => ToolOutput::text(content),
            ToolKind::Arxiv | ToolKind::News => ToolOutput::from_content(content),
        };
        Some(Self::new(tool, output))
    }
}
