//! Model value object representing an LLM backend

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Available LLM backends (Value Object)
///
/// This is a domain concept representing the different AI models
/// that can sit on the council. Identifiers are provider-prefixed,
/// matching the chat-completions routing convention.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Model {
    // Google models
    Gemini3Pro,
    // OpenAI models
    Gpt51,
    // Anthropic models
    ClaudeOpus45,
    ClaudeSonnet45,
    // xAI models
    Grok4,
    // DeepSeek models
    DeepseekV3,
    // Custom
    Custom(String),
}

impl Model {
    /// Get the string identifier for this model
    pub fn as_str(&self) -> &str {
        match self {
            Model::Gemini3Pro => "google/gemini-3-pro-preview",
            Model::Gpt51 => "openai/gpt-5.1",
            Model::ClaudeOpus45 => "anthropic/claude-opus-4.5",
            Model::ClaudeSonnet45 => "anthropic/claude-sonnet-4.5",
            Model::Grok4 => "x-ai/grok-4",
            Model::DeepseekV3 => "deepseek/deepseek-chat-v3-0324",
            Model::Custom(s) => s,
        }
    }

    /// Default council membership.
    ///
    /// Gemini is placed first to avoid issues with concurrent streams.
    pub fn default_council() -> Vec<Model> {
        vec![
            Model::Gemini3Pro,
            Model::Gpt51,
            Model::ClaudeOpus45,
            Model::Grok4,
            Model::DeepseekV3,
        ]
    }

    /// Default chairman for the synthesis stage
    pub fn default_chairman() -> Model {
        Model::ClaudeOpus45
    }

    /// Provider segment of the identifier ("google", "openai", ...)
    pub fn provider(&self) -> &str {
        self.as_str().split('/').next().unwrap_or("")
    }

    /// Identifier without the provider prefix, for compact display
    pub fn short_name(&self) -> &str {
        match self.as_str().split_once('/') {
            Some((_, name)) => name,
            None => self.as_str(),
        }
    }
}

impl Default for Model {
    /// Returns the default model (Claude Opus 4.5)
    fn default() -> Self {
        Model::ClaudeOpus45
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Model {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "google/gemini-3-pro-preview" => Model::Gemini3Pro,
            "openai/gpt-5.1" => Model::Gpt51,
            "anthropic/claude-opus-4.5" => Model::ClaudeOpus45,
            "anthropic/claude-sonnet-4.5" => Model::ClaudeSonnet45,
            "x-ai/grok-4" => Model::Grok4,
            "deepseek/deepseek-chat-v3-0324" => Model::DeepseekV3,
            other => Model::Custom(other.to_string()),
        })
    }
}

impl Serialize for Model {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Model {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(s.parse().unwrap())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_roundtrip() {
        for model in Model::default_council() {
            let s = model.to_string();
            let parsed: Model = s.parse().unwrap();
            assert_eq!(model, parsed);
        }
    }

    #[test]
    fn test_custom_model() {
        let model: Model = "mistralai/mistral-large".parse().unwrap();
        assert_eq!(model, Model::Custom("mistralai/mistral-large".to_string()));
        assert_eq!(model.to_string(), "mistralai/mistral-large");
    }

    #[test]
    fn test_provider_and_short_name() {
        assert_eq!(Model::Gpt51.provider(), "openai");
        assert_eq!(Model::Gpt51.short_name(), "gpt-5.1");
        assert_eq!(Model::Custom("plain-model".into()).short_name(), "plain-model");
    }

    #[test]
    fn test_default_chairman_is_council_member() {
        assert!(Model::default_council().contains(&Model::default_chairman()));
    }
}
