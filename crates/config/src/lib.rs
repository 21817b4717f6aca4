//! Configuration management for researchdesk
//!
//! Settings come from three layers, lowest priority first: built-in
//! defaults, the JSON config file, then process environment (which
//! includes anything loaded from `.env` files).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod paths;

pub use paths::{config_path, data_dir, dotenv_candidates};

/// Errors raised while loading or saving configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

pub const ENV_API_KEY: &str = "GROQ_API_KEY";
pub const ENV_API_BASE: &str = "GROQ_API_BASE";
pub const ENV_MODEL: &str = "RESEARCHDESK_MODEL";
pub const ENV_NEWS_API_KEY: &str = "NEWS_API_KEY";
pub const ENV_HOST: &str = "RESEARCHDESK_HOST";
pub const ENV_PORT: &str = "RESEARCHDESK_PORT";

/// Language-model endpoint credentials
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LlmConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
}

/// Research agent persona and sampling parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSettings {
    #[serde(default = "default_agent_name")]
    pub name: String,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_max_iterations")]
    pub max_tool_iterations: u32,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            role: default_role(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            max_tool_iterations: default_max_iterations(),
        }
    }
}

fn default_agent_name() -> String {
    "3aref".to_string()
}

fn default_role() -> String {
    "professional research assistant".to_string()
}

fn default_model() -> String {
    "meta-llama/llama-4-scout-17b-16e-instruct".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_max_iterations() -> u32 {
    10
}

/// Wikipedia lookup settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WikipediaConfig {
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_sentences")]
    pub sentences: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
}

impl Default for WikipediaConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            sentences: default_sentences(),
            api_base: None,
        }
    }
}

impl WikipediaConfig {
    /// MediaWiki API endpoint, derived from the language unless overridden
    pub fn endpoint(&self) -> String {
        self.api_base
            .clone()
            .unwrap_or_else(|| format!("https://{}.wikipedia.org/w/api.php", self.language))
    }
}

fn default_language() -> String {
    "en".to_string()
}

fn default_sentences() -> usize {
    3
}

/// arXiv search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArxivConfig {
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    #[serde(default = "default_arxiv_base")]
    pub api_base: String,
}

impl Default for ArxivConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            api_base: default_arxiv_base(),
        }
    }
}

fn default_arxiv_base() -> String {
    "https://export.arxiv.org/api/query".to_string()
}

/// NewsAPI search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    #[serde(default = "default_news_base")]
    pub api_base: String,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            max_results: default_max_results(),
            api_base: default_news_base(),
        }
    }
}

fn default_news_base() -> String {
    "https://newsapi.org/v2".to_string()
}

fn default_max_results() -> u32 {
    5
}

/// Lookup tool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub wikipedia: WikipediaConfig,
    #[serde(default)]
    pub arxiv: ArxivConfig,
    #[serde(default)]
    pub news: NewsConfig,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            wikipedia: WikipediaConfig::default(),
            arxiv: ArxivConfig::default(),
            news: NewsConfig::default(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    15
}

/// HTTP server bind settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub agent: AgentSettings,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Load dotenv files, the config file and environment overrides
    pub async fn load() -> Result<Self> {
        if let Ok(cwd) = std::env::current_dir() {
            load_dotenv(&cwd);
        }
        let mut config = Self::load_from(&config_path()).await?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load from a specific file; a missing file yields defaults
    pub async fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("no config found at {:?}, using defaults", path);
            return Ok(Config::default());
        }

        debug!("loading config from {:?}", path);
        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save to the default location
    pub async fn save(&self) -> Result<()> {
        self.save_to(&config_path()).await
    }

    /// Save to a specific file, creating parent directories
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        debug!("writing config to {:?}", path);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }

    /// Apply environment overrides through `lookup`.
    ///
    /// Empty values are treated as unset.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(ENV_API_KEY) {
            self.llm.api_key = key;
        }
        if let Some(base) = get(ENV_API_BASE) {
            self.llm.api_base = Some(base);
        }
        if let Some(model) = get(ENV_MODEL) {
            self.agent.model = model;
        }
        if let Some(key) = get(ENV_NEWS_API_KEY) {
            self.tools.news.api_key = key;
        }
        if let Some(host) = get(ENV_HOST) {
            self.server.host = host;
        }
        if let Some(port) = get(ENV_PORT) {
            self.server.port = port.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_PORT.to_string(),
                value: port.clone(),
            })?;
        }
        Ok(())
    }

    /// Language-model credential, if configured
    pub fn api_key(&self) -> Option<String> {
        let key = self.llm.api_key.trim();
        if key.is_empty() {
            None
        } else {
            Some(key.to_string())
        }
    }

    pub fn api_base(&self) -> Option<String> {
        self.llm.api_base.clone().filter(|b| !b.is_empty())
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key().is_some()
    }

    pub fn default_model(&self) -> String {
        self.agent.model.clone()
    }

    /// NewsAPI key, if configured
    pub fn news_api_key(&self) -> Option<String> {
        let key = &self.tools.news.api_key;
        if key.is_empty() {
            None
        } else {
            Some(key.clone())
        }
    }
}

/// Load `.env` files under `base` into the process environment.
///
/// Returns the files that were actually read.
pub fn load_dotenv(base: &Path) -> Vec<PathBuf> {
    let mut loaded = Vec::new();
    for path in dotenv_candidates(base) {
        if !path.exists() {
            continue;
        }
        match dotenvy::from_path(&path) {
            Ok(()) => {
                debug!("loaded environment from {:?}", path);
                loaded.push(path);
            }
            Err(e) => warn!("failed to read {:?}: {}", path, e),
        }
    }
    loaded
}

/// Write a default config file unless one already exists
pub async fn init() -> Result<Config> {
    let path = config_path();

    if path.exists() {
        warn!("config already exists at {:?}", path);
    } else {
        Config::default().save_to(&path).await?;
        info!("created config at {:?}", path);
    }

    Config::load_from(&path).await
}
