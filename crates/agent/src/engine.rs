//! Agent execution engine: the tool-calling loop

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use researchdesk_config::AgentSettings;
use researchdesk_provider::{ChatParams, Message, Provider, ProviderError, ToolCallDef};

use crate::invocation::ToolInvocationRecord;
use crate::prompt::PromptConfig;
use crate::tools::ToolRegistry;

/// Engine failures. Display text is what callers see in the envelope.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("tool loop exceeded {0} iterations")]
    MaxIterations(u32),

    #[error("{0}")]
    Failed(String),
}

/// Every message exchanged during one run, in order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    pub messages: Vec<Message>,
}

impl Transcript {
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    /// Last non-empty assistant text, if the model produced one
    pub fn final_answer(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .filter(|m| m.role == "assistant")
            .filter_map(|m| m.content.as_deref())
            .find(|c| !c.trim().is_empty())
    }

    /// Tool outputs in the order the tools ran
    pub fn invocations(&self) -> Vec<ToolInvocationRecord> {
        self.messages
            .iter()
            .filter_map(ToolInvocationRecord::from_message)
            .collect()
    }
}

/// Runs a conversation to completion, calling tools as the model asks
#[async_trait]
pub trait ResearchEngine: Send + Sync {
    async fn run(&self, messages: Vec<Message>) -> Result<Transcript, EngineError>;
}

/// Chat-completions tool loop over a [`Provider`]
pub struct AgentEngine<P: Provider> {
    provider: Arc<P>,
    tools: ToolRegistry,
    prompt: PromptConfig,
    model: String,
    temperature: f32,
    max_tokens: u32,
    max_iterations: u32,
}

impl<P: Provider> AgentEngine<P> {
    pub fn new(provider: P, tools: ToolRegistry) -> Self {
        let defaults = ChatParams::default();
        Self {
            provider: Arc::new(provider),
            tools,
            prompt: PromptConfig::default(),
            model: String::new(),
            temperature: defaults.temperature,
            max_tokens: defaults.max_tokens,
            max_iterations: 10,
        }
    }

    /// Engine with persona, model and limits taken from settings
    pub fn from_settings(provider: P, tools: ToolRegistry, settings: &AgentSettings) -> Self {
        Self::new(provider, tools)
            .with_prompt(PromptConfig::from(settings))
            .with_model(settings.model.clone())
            .with_sampling(settings.temperature, settings.max_tokens)
            .with_max_iterations(settings.max_tool_iterations)
    }

    pub fn with_prompt(mut self, prompt: PromptConfig) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    fn model(&self) -> String {
        if self.model.is_empty() {
            self.provider.default_model()
        } else {
            self.model.clone()
        }
    }
}

#[async_trait]
impl<P: Provider> ResearchEngine for AgentEngine<P> {
    async fn run(&self, input: Vec<Message>) -> Result<Transcript, EngineError> {
        let mut messages = Vec::with_capacity(input.len() + 8);
        messages.push(Message::system(self.prompt.system_prompt()));
        messages.extend(input);

        let model = self.model();
        let definitions = self.tools.definitions();
        let mut iteration = 0;

        loop {
            iteration += 1;
            if iteration > self.max_iterations {
                warn!("giving up after {} iterations", self.max_iterations);
                return Err(EngineError::MaxIterations(self.max_iterations));
            }

            debug!("engine iteration {}", iteration);

            let params = ChatParams {
                model: model.clone(),
                messages: messages.clone(),
                tools: definitions.clone(),
                max_tokens: self.max_tokens,
                temperature: self.temperature,
            };

            let response = self.provider.chat(params).await?;
            if response.is_truncated() {
                warn!("completion hit max_tokens ({}) and was cut off", self.max_tokens);
            }

            if !response.has_tool_calls() {
                messages.push(Message::assistant(response.content.unwrap_or_default()));
                info!("research run finished after {} iteration(s)", iteration);
                return Ok(Transcript::new(messages));
            }

            let calls: Vec<ToolCallDef> = response
                .tool_calls
                .iter()
                .map(|tc| ToolCallDef::new(&tc.id, &tc.name, tc.arguments.clone()))
                .collect();

            let mut assistant = Message::assistant(response.content.clone().unwrap_or_default());
            assistant.tool_calls = Some(calls);
            messages.push(assistant);

            for call in &response.tool_calls {
                debug!("executing tool: {}", call.name);

                let content = match self.tools.execute(&call.name, call.arguments.clone()).await {
                    Ok(output) => output.to_content(),
                    Err(e) => {
                        warn!("tool call {} failed: {}", call.name, e);
                        format!("Error: {}", e)
                    }
                };

                messages.push(Message::tool(&call.id, &call.name, content));
            }
        }
    }
}
