//! Language-model provider interface
//!
//! Chat-completions message types shared by the research engine and a
//! provider for OpenAI-compatible endpoints (Groq by default).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use thiserror::Error;
use tracing::{debug, trace};

pub mod groq;

pub use groq::GroqProvider;

/// Provider errors.
///
/// Display strings are surfaced verbatim to API callers, so they stay plain.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid JSON from provider: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Api(String),

    #[error("no API key configured")]
    NoApiKey,

    #[error("invalid response from provider")]
    InvalidResponse,

    #[error("rate limit exceeded")]
    RateLimited,
}

pub type Result<T> = std::result::Result<T, ProviderError>;

/// Tool invocation requested by the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

/// One completion from the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default)]
    pub finish_reason: String,
}

impl ChatResponse {
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// The completion stopped at `max_tokens`
    pub fn is_truncated(&self) -> bool {
        self.finish_reason == "length"
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            tool_calls: Vec::new(),
            finish_reason: "stop".to_string(),
        }
    }

    /// Response that asks for the given tool calls
    pub fn with_tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            content: None,
            tool_calls,
            finish_reason: "tool_calls".to_string(),
        }
    }
}

/// Chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCallDef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Message {
    fn with_role(role: &str, content: String) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content),
            tool_calls: None,
            tool_call_id: None,
            name: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role("system", content.into())
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role("user", content.into())
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role("assistant", content.into())
    }

    pub fn tool(
        call_id: impl Into<String>,
        name: impl Into<String>,
        result: impl Into<String>,
    ) -> Self {
        Self {
            role: "tool".to_string(),
            content: Some(result.into()),
            tool_calls: None,
            tool_call_id: Some(call_id.into()),
            name: Some(name.into()),
        }
    }

    pub fn is_tool(&self) -> bool {
        self.role == "tool"
    }
}

/// Tool call as echoed back in an assistant message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallDef {
    pub id: String,
    #[serde(rename = "type")]
    pub call_type: String,
    pub function: FunctionCall,
}

impl ToolCallDef {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            call_type: "function".to_string(),
            function: FunctionCall {
                name: name.into(),
                arguments,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: Value,
}

/// Tool advertised to the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: FunctionDef,
}

impl Tool {
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            tool_type: "function".to_string(),
            function: FunctionDef {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDef {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Request parameters. Tools, when present, are offered with `tool_choice: auto`.
#[derive(Debug, Clone)]
pub struct ChatParams {
    pub model: String,
    pub messages: Vec<Message>,
    pub tools: Vec<Tool>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for ChatParams {
    fn default() -> Self {
        Self {
            model: String::new(),
            messages: Vec::new(),
            tools: Vec::new(),
            max_tokens: 4096,
            temperature: 0.1,
        }
    }
}

/// Chat-completions backend
#[async_trait]
pub trait Provider: Send + Sync {
    async fn chat(&self, params: ChatParams) -> Result<ChatResponse>;
    fn default_model(&self) -> String;
    fn is_configured(&self) -> bool;
}

/// Log a summary of an outgoing request
pub(crate) fn trace_params(params: &ChatParams) {
    trace!(
        "chat request: model={} messages={} tools={}",
        params.model,
        params.messages.len(),
        params.tools.len()
    );
    if let Some(last) = params.messages.last() {
        debug!("last message role: {}", last.role);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_provider_error_display() {
        assert_eq!(ProviderError::RateLimited.to_string(), "rate limit exceeded");
        assert_eq!(
            ProviderError::Api("model overloaded".to_string()).to_string(),
            "model overloaded"
        );
        assert_eq!(ProviderError::NoApiKey.to_string(), "no API key configured");
        assert_eq!(
            ProviderError::InvalidResponse.to_string(),
            "invalid response from provider"
        );
    }

    #[test]
    fn test_chat_response_text_builder() {
        let response = ChatResponse::text("Hello, world!");
        assert_eq!(response.content, Some("Hello, world!".to_string()));
        assert!(!response.has_tool_calls());
        assert_eq!(response.finish_reason, "stop");
        assert!(!response.is_truncated());
    }

    #[test]
    fn test_chat_response_with_tool_calls() {
        let response = ChatResponse::with_tool_calls(vec![ToolCall {
            id: "call_1".to_string(),
            name: "Wikipedia".to_string(),
            arguments: json!({"query": "rust"}),
        }]);
        assert!(response.has_tool_calls());
        assert!(response.content.is_none());
        assert_eq!(response.finish_reason, "tool_calls");
    }

    #[test]
    fn test_message_constructors() {
        let msg = Message::user("What is CRISPR?");
        assert_eq!(msg.role, "user");
        assert_eq!(msg.content.as_deref(), Some("What is CRISPR?"));
        assert!(!msg.is_tool());

        let msg = Message::tool("call_9", "News Search", "[]");
        assert_eq!(msg.role, "tool");
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_9"));
        assert_eq!(msg.name.as_deref(), Some("News Search"));
        assert!(msg.is_tool());
    }

    #[test]
    fn test_message_serialization_skips_empty_fields() {
        let json_str = serde_json::to_string(&Message::system("be brief")).unwrap();
        assert!(json_str.contains("\"role\":\"system\""));
        assert!(!json_str.contains("tool_call_id"));
        assert!(!json_str.contains("tool_calls"));
    }

    #[test]
    fn test_tool_call_def_new() {
        let def = ToolCallDef::new("call_1", "ArXiv Papers", json!({"query": "qubits"}));
        assert_eq!(def.call_type, "function");
        assert_eq!(def.function.name, "ArXiv Papers");
        assert_eq!(def.function.arguments["query"], "qubits");
    }

    #[test]
    fn test_tool_serialization() {
        let tool = Tool::new("Wikipedia", "Background lookups", json!({}));
        let json_str = serde_json::to_string(&tool).unwrap();
        assert!(json_str.contains("\"type\":\"function\""));
        assert!(json_str.contains("\"name\":\"Wikipedia\""));
    }

    #[test]
    fn test_chat_params_default() {
        let params = ChatParams::default();
        assert!(params.model.is_empty());
        assert_eq!(params.max_tokens, 4096);
        assert!(params.tools.is_empty());
    }
}
