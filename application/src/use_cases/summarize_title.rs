//! Summarize Title use case.
//!
//! Auxiliary side-task that condenses the user's question into a short
//! conversation title. Runs concurrently with the pipeline; its failure
//! is never fatal to the run.

use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use council_domain::{Message, Model, PromptTemplate};
use std::sync::Arc;
use tracing::debug;

const MAX_TITLE_LEN: usize = 80;
const FALLBACK_TITLE: &str = "New Conversation";

/// Use case for generating a conversation title
pub struct SummarizeTitleUseCase {
    gateway: Arc<dyn LlmGateway>,
}

impl SummarizeTitleUseCase {
    pub fn new(gateway: Arc<dyn LlmGateway>) -> Self {
        Self { gateway }
    }

    pub async fn execute(&self, model: &Model, question: &str) -> Result<String, GatewayError> {
        let messages = vec![
            Message::system(PromptTemplate::title_system()),
            Message::user(PromptTemplate::title_query(question)),
        ];

        let raw = self.gateway.complete(model, &messages).await?;
        let title = clean_title(&raw);
        debug!("Generated title: {}", title);
        Ok(title)
    }
}

/// Normalize a model-produced title: first line, quotes stripped,
/// length-capped on a character boundary.
fn clean_title(raw: &str) -> String {
    let first_line = raw.trim().lines().next().unwrap_or_default();
    let cleaned = first_line.trim().trim_matches(['"', '\'']).trim();

    if cleaned.is_empty() {
        return FALLBACK_TITLE.to_string();
    }

    cleaned.chars().take(MAX_TITLE_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_title_strips_quotes_and_extra_lines() {
        assert_eq!(
            clean_title("\"Rust Ownership Basics\"\n\nHere is why I chose it..."),
            "Rust Ownership Basics"
        );
    }

    #[test]
    fn test_clean_title_caps_length() {
        let long = "x".repeat(200);
        assert_eq!(clean_title(&long).chars().count(), MAX_TITLE_LEN);
    }

    #[test]
    fn test_clean_title_falls_back_when_empty() {
        assert_eq!(clean_title("  \n"), FALLBACK_TITLE);
        assert_eq!(clean_title("\"\""), FALLBACK_TITLE);
    }
}
