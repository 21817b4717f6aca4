//! Research agent core
//!
//! Three lookup tools (Wikipedia, arXiv, NewsAPI), the tool-calling engine
//! that drives them, and the facade that turns one query into one
//! [`ResponseEnvelope`].

use thiserror::Error;

pub mod aggregate;
pub mod engine;
pub mod facade;
pub mod invocation;
pub mod prompt;
pub mod tools;

pub use aggregate::{aggregate, AggregatedResult, BACKGROUND_PLACEHOLDER};
pub use engine::{AgentEngine, EngineError, ResearchEngine, Transcript};
pub use facade::{
    Answer, HealthReport, InitError, ResearchFacade, ResearchService, ResponseEnvelope,
};
pub use invocation::{Record, ToolInvocationRecord, ToolKind, ToolOutput};
pub use prompt::PromptConfig;
pub use tools::{ToolRegistry, ToolTrait};

/// Tool dispatch errors
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("unknown tool: {0}")]
    ToolNotFound(String),

    #[error("invalid arguments for {0}")]
    InvalidArguments(String),
}

pub type Result<T> = std::result::Result<T, AgentError>;
