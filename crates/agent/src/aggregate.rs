//! Merge tool invocations into a fixed-shape research result

use serde::Serialize;
use tracing::{debug, trace};

use crate::invocation::{ToolInvocationRecord, ToolKind, ToolOutput};

/// Background value used when the encyclopedia tool did not run
pub const BACKGROUND_PLACEHOLDER: &str = "...";

/// Normalized research result.
///
/// All three fields are always present. `background` is always a string.
/// A list field whose tool did not run keeps its default; a tool that
/// returned a message instead of a list stores that message as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatedResult {
    pub background: String,
    pub papers: ToolOutput,
    pub news: ToolOutput,
}

impl Default for AggregatedResult {
    fn default() -> Self {
        Self {
            background: BACKGROUND_PLACEHOLDER.to_string(),
            papers: ToolOutput::Items(Vec::new()),
            news: ToolOutput::Items(Vec::new()),
        }
    }
}

impl AggregatedResult {
    fn apply(&mut self, record: &ToolInvocationRecord) {
        match record.tool {
            ToolKind::Wikipedia => self.background = record.output.to_content(),
            ToolKind::Arxiv => self.papers = record.output.clone(),
            ToolKind::News => self.news = record.output.clone(),
        }
    }
}

/// Build the result from invocation records in the order they ran.
///
/// The order is whatever the engine produced; a later record for the
/// same tool replaces an earlier one.
pub fn aggregate<'a, I>(records: I) -> AggregatedResult
where
    I: IntoIterator<Item = &'a ToolInvocationRecord>,
{
    let mut result = AggregatedResult::default();
    let mut seen = 0usize;

    for record in records {
        trace!("aggregating {} output", record.tool);
        result.apply(record);
        seen += 1;
    }

    debug!("aggregated {} tool invocation(s)", seen);
    result
}
