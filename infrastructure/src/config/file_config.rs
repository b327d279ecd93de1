//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//!
//! Example configuration:
//!
//! ```toml
//! [council]
//! models = ["google/gemini-3-pro-preview", "openai/gpt-5.1"]
//! chairman = "anthropic/claude-opus-4.5"
//! generate_title = true
//!
//! [api]
//! base_url = "https://openrouter.ai/api/v1"
//! timeout_secs = 120
//! key_env = "OPENROUTER_API_KEY"
//! ```

use council_domain::Model;
use serde::{Deserialize, Serialize};

/// Council membership and chairman configuration (`[council]` section)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCouncilConfig {
    /// Models participating in stage 1 (judges are drawn from this set)
    pub models: Vec<String>,
    /// Fixed synthesis model; defaults to the built-in chairman
    pub chairman: Option<String>,
    /// Run the auxiliary title summarization side-task
    pub generate_title: bool,
}

impl Default for FileCouncilConfig {
    fn default() -> Self {
        Self {
            models: Model::default_council()
                .iter()
                .map(|m| m.to_string())
                .collect(),
            chairman: None,
            generate_title: true,
        }
    }
}

impl FileCouncilConfig {
    /// Parse the configured model list into domain models
    pub fn parse_models(&self) -> Vec<Model> {
        self.models.iter().filter_map(|s| s.parse().ok()).collect()
    }

    /// Parse the chairman, defaulting to the built-in choice
    pub fn parse_chairman(&self) -> Model {
        self.chairman
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Model::default_chairman)
    }
}

/// Backend endpoint configuration (`[api]` section)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileApiConfig {
    /// Base URL of the chat-completions endpoint
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Environment variable holding the API key
    pub key_env: String,
}

impl Default for FileApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1".to_string(),
            timeout_secs: 120,
            key_env: "OPENROUTER_API_KEY".to_string(),
        }
    }
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Council membership and chairman
    pub council: FileCouncilConfig,
    /// Backend endpoint settings
    pub api: FileApiConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FileConfig::default();
        assert_eq!(config.council.models.len(), 5);
        assert!(config.council.chairman.is_none());
        assert!(config.council.generate_title);
        assert_eq!(config.api.timeout_secs, 120);
        assert_eq!(config.api.key_env, "OPENROUTER_API_KEY");
    }

    #[test]
    fn test_deserialize_toml() {
        let toml_str = r#"
[council]
models = ["openai/gpt-5.1", "x-ai/grok-4"]
chairman = "anthropic/claude-opus-4.5"
generate_title = false

[api]
timeout_secs = 30
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.council.parse_models(), vec![Model::Gpt51, Model::Grok4]);
        assert_eq!(config.council.parse_chairman(), Model::ClaudeOpus45);
        assert!(!config.council.generate_title);
        assert_eq!(config.api.timeout_secs, 30);
        // Untouched section keeps its defaults
        assert_eq!(config.api.base_url, "https://openrouter.ai/api/v1");
    }

    #[test]
    fn test_chairman_defaults_when_absent() {
        let config = FileConfig::default();
        assert_eq!(config.council.parse_chairman(), Model::default_chairman());
    }

    #[test]
    fn test_unknown_model_ids_parse_as_custom() {
        let council = FileCouncilConfig {
            models: vec!["acme/secret-model".to_string()],
            ..Default::default()
        };
        assert_eq!(
            council.parse_models(),
            vec![Model::Custom("acme/secret-model".to_string())]
        );
    }
}
