//! Research entry point: query validation, engine run, result envelope

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

use researchdesk_config::Config;
use researchdesk_provider::GroqProvider;

use crate::aggregate::{aggregate, AggregatedResult};
use crate::engine::{AgentEngine, ResearchEngine};
use crate::prompt::research_message;
use crate::tools::{register_default_tools, ToolRegistry};

pub const ERR_NOT_INITIALIZED: &str = "not initialized";
pub const ERR_EMPTY_QUERY: &str = "empty query";
pub const UNAVAILABLE_ANSWER: &str = "Research service unavailable.";
pub const ERROR_ANSWER_PREFIX: &str = "Research error: ";
pub const MISSING_QUERY_ANSWER: &str = "Please provide a research question.";

/// Query used by [`ResearchFacade::health_check`]
pub const HEALTH_QUERY: &str = "What is artificial intelligence?";
/// A healthy answer serializes to more than this many characters
pub const MIN_ANSWER_LEN: usize = 50;

/// Why the research service could not be built
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InitError {
    #[error("GROQ_API_KEY not found")]
    MissingCredential,

    #[error("no research tools registered")]
    NoTools,

    #[error("failed to build research agent: {0}")]
    Construction(String),
}

/// `answer` of an envelope: the research result, or a message on failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Answer {
    Result(AggregatedResult),
    Message(String),
}

/// Outcome of one `search` call.
///
/// A failed envelope never carries a research result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseEnvelope {
    success: bool,
    query: String,
    answer: Answer,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ResponseEnvelope {
    pub fn success(query: impl Into<String>, result: AggregatedResult) -> Self {
        Self {
            success: true,
            query: query.into(),
            answer: Answer::Result(result),
            error: None,
        }
    }

    pub fn failure(
        query: impl Into<String>,
        error: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            query: query.into(),
            answer: Answer::Message(answer.into()),
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn answer(&self) -> &Answer {
        &self.answer
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn result(&self) -> Option<&AggregatedResult> {
        match &self.answer {
            Answer::Result(result) => Some(result),
            Answer::Message(_) => None,
        }
    }
}

/// A built research service: engine plus the envelope contract
pub struct ResearchService {
    engine: Box<dyn ResearchEngine>,
}

impl ResearchService {
    pub fn new<E: ResearchEngine + 'static>(engine: E) -> Self {
        Self {
            engine: Box::new(engine),
        }
    }

    /// Groq-backed service with the three default tools
    pub fn from_config(config: &Config) -> Result<Self, InitError> {
        let api_key = config.api_key().ok_or(InitError::MissingCredential)?;

        if config.agent.max_tool_iterations == 0 {
            return Err(InitError::Construction(
                "max_tool_iterations must be at least 1".to_string(),
            ));
        }

        let provider = GroqProvider::new(api_key, config.api_base(), Some(config.default_model()));

        let mut tools = ToolRegistry::new();
        register_default_tools(&mut tools, &config.tools, config.news_api_key());
        if tools.is_empty() {
            return Err(InitError::NoTools);
        }
        info!("loaded {} research tools: {}", tools.len(), tools.names().join(", "));

        Ok(Self::new(AgentEngine::from_settings(
            provider,
            tools,
            &config.agent,
        )))
    }

    pub async fn search(&self, query: &str) -> ResponseEnvelope {
        let query = query.trim();
        if query.is_empty() {
            return ResponseEnvelope::failure(query, ERR_EMPTY_QUERY, MISSING_QUERY_ANSWER);
        }

        info!("research query: {}", query);

        match self.engine.run(vec![research_message(query)]).await {
            Ok(transcript) => {
                let records = transcript.invocations();
                ResponseEnvelope::success(query, aggregate(&records))
            }
            Err(e) => {
                let message = e.to_string();
                error!("research run failed: {}", message);
                let answer = format!("{}{}", ERROR_ANSWER_PREFIX, message);
                ResponseEnvelope::failure(query, message, answer)
            }
        }
    }
}

/// Result of a health check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub healthy: bool,
    pub answer_len: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Long-lived handle shared by every request.
///
/// Construction failure is kept, not retried: an `Unavailable` facade
/// stays unavailable for the life of the process.
pub enum ResearchFacade {
    Ready(ResearchService),
    Unavailable(InitError),
}

impl ResearchFacade {
    pub fn from_init(init: Result<ResearchService, InitError>) -> Self {
        match init {
            Ok(service) => {
                info!("research service ready");
                ResearchFacade::Ready(service)
            }
            Err(e) => {
                warn!("research service unavailable: {}", e);
                ResearchFacade::Unavailable(e)
            }
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::from_init(ResearchService::from_config(config))
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ResearchFacade::Ready(_))
    }

    pub fn init_error(&self) -> Option<&InitError> {
        match self {
            ResearchFacade::Ready(_) => None,
            ResearchFacade::Unavailable(e) => Some(e),
        }
    }

    pub async fn search(&self, query: &str) -> ResponseEnvelope {
        match self {
            ResearchFacade::Ready(service) => service.search(query).await,
            ResearchFacade::Unavailable(_) => {
                ResponseEnvelope::failure(query.trim(), ERR_NOT_INITIALIZED, UNAVAILABLE_ANSWER)
            }
        }
    }

    /// Run one canned research query and judge the answer by its size
    pub async fn health_check(&self) -> HealthReport {
        let envelope = self.search(HEALTH_QUERY).await;
        let answer_len = serde_json::to_string(envelope.answer())
            .map(|s| s.chars().count())
            .unwrap_or(0);

        HealthReport {
            healthy: envelope.is_success() && answer_len > MIN_ANSWER_LEN,
            answer_len,
            error: envelope.error().map(str::to_string),
        }
    }
}
