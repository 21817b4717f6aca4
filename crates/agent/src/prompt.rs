//! Prompts sent to the research agent

use chrono::Local;

use researchdesk_config::AgentSettings;
use researchdesk_provider::Message;

use crate::invocation::ToolKind;

/// Persona of the research agent
#[derive(Debug, Clone, PartialEq)]
pub struct PromptConfig {
    pub agent_name: String,
    pub role: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            agent_name: "3aref".to_string(),
            role: "professional research assistant".to_string(),
        }
    }
}

impl From<&AgentSettings> for PromptConfig {
    fn from(settings: &AgentSettings) -> Self {
        Self {
            agent_name: settings.name.clone(),
            role: settings.role.clone(),
        }
    }
}

impl PromptConfig {
    /// System prompt that pushes the model through all three tools
    pub fn system_prompt(&self) -> String {
        let [wiki, papers, news] = ToolKind::ALL.map(ToolKind::name);
        let today = Local::now().format("%Y-%m-%d (%A)");

        format!(
            r#"You are {name}, a {role}.
Today is {today}.

CRITICAL INSTRUCTION: Use MULTIPLE research tools for EVERY query to provide comprehensive results.

MANDATORY RESEARCH PROTOCOL:
1. First, use the `{wiki}` tool for background and definitions
2. Second, use the `{papers}` tool for scientific papers (if relevant)
3. Third, use the `{news}` tool for recent developments
4. Finally, order and format your findings clearly

TOOL USAGE REQUIREMENTS:
- Call the tools in the order given above
- Include the results from each tool you used

RESPONSE FORMAT: a JSON object with
- the background from Wikipedia
- a list of relevant arXiv papers with title, URL and summary
- a list of recent news articles with headline, source and URL

Only return the JSON. Never return any other text, including code fences around the JSON."#,
            name = self.agent_name,
            role = self.role,
        )
    }
}

/// Wrap a trimmed query in the fixed research instructions
pub fn research_instructions(query: &str) -> String {
    format!(
        "Research Query: {}

RESEARCH INSTRUCTIONS:
1. First, Use Wikipedia tool to get background information
2. Then, Use ArXiv tool to find relevant research papers
3. Next, Use News tool to find recent articles and developments
4. Format your response clearly with sections for each tool's findings

Provide a comprehensive response using multiple research tools.",
        query
    )
}

/// The single user message that starts a research run
pub fn research_message(query: &str) -> Message {
    Message::user(research_instructions(query))
}
