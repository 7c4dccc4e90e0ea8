//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted to domain types on demand.

mod conversation;
mod model;
mod output;
mod retry;

pub use conversation::{DEFAULT_TOPIC, FileConversationConfig};
pub use model::{DEFAULT_API_KEY_ENV, FileModelConfig};
pub use output::FileOutputConfig;
pub use retry::FileRetryConfig;

use duel_application::RetryPolicy;
use duel_domain::{ConfigIssue, ConversationConfig, Speaker};
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Topic, limits and prompt
    pub conversation: FileConversationConfig,
    /// First speaker
    pub model_a: FileModelConfig,
    /// Second speaker
    pub model_b: FileModelConfig,
    /// Model Client retry behavior
    pub retry: FileRetryConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Build the domain configuration, reading API keys from the process
    /// environment where needed.
    pub fn to_conversation_config(&self) -> (ConversationConfig, Vec<ConfigIssue>) {
        self.to_conversation_config_with(&|name: &str| std::env::var(name).ok())
    }

    /// Like [`to_conversation_config`](Self::to_conversation_config) with an
    /// explicit environment lookup.
    pub fn to_conversation_config_with(
        &self,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> (ConversationConfig, Vec<ConfigIssue>) {
        let conversation = &self.conversation;
        let (system_prompt, issues) = conversation.load_system_prompt();

        let model_a = self.model_a.resolve(Speaker::A, env);
        let mut model_b = self.model_b.resolve(Speaker::B, env);
        if conversation.same_model {
            model_b = model_b.sharing_endpoint();
        }

        let config = ConversationConfig::new(conversation.topic.clone(), model_a, model_b)
            .with_max_turns(conversation.max_turns)
            .with_temperature(conversation.temperature)
            .with_turn_delay_secs(conversation.turn_delay_secs)
            .with_request_timeout_secs(conversation.request_timeout_secs)
            .with_max_tokens(conversation.max_tokens)
            .with_system_prompt(system_prompt);
        (config, issues)
    }

    pub fn to_retry_policy(&self) -> (RetryPolicy, Vec<ConfigIssue>) {
        self.retry.to_retry_policy()
    }

    /// Validate the file-level configuration, returning all detected issues.
    ///
    /// Covers what only exists at this level:
    /// 1. Retry values that cannot become a [`RetryPolicy`]
    /// 2. `[model_b]` endpoint fields that `same_model` makes dead
    ///
    /// The `system_prompt_file` is only read by
    /// [`to_conversation_config`](Self::to_conversation_config), which
    /// reports its issues. Value ranges of the run itself are checked by
    /// [`ConversationConfig::validate`].
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        issues.extend(self.retry.to_retry_policy().1);

        if self.conversation.same_model {
            for field in self.model_b.endpoint_fields() {
                issues.push(ConfigIssue::ignored_field(
                    format!("model_b.{}", field),
                    "conversation.same_model is enabled",
                ));
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duel_domain::ExportFormat;

    fn env(name: &str) -> Option<String> {
        (name == "OPENAI_API_KEY").then(|| "sk-shared".to_string())
    }

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[conversation]
topic = "Tabs versus spaces"
max_turns = 6
temperature = 1.1
turn_delay_secs = 0.0

[model_a]
api_key = "sk-a"
nickname = "Ada"

[model_b]
base_url = "http://localhost:11434/v1"
name = "llama3.1"
api_key_env = "OLLAMA_KEY"

[retry]
max_retries = 1

[output]
export = ["markdown"]
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.conversation.max_turns, 6);
        assert_eq!(config.model_a.nickname.as_deref(), Some("Ada"));
        assert_eq!(config.model_b.api_key_env, "OLLAMA_KEY");
        assert_eq!(config.retry.max_retries, 1);
        assert_eq!(config.output.export, vec![ExportFormat::Markdown]);
        assert!(config.validate().is_empty());

        let (conversation, issues) = config.to_conversation_config_with(&env);
        assert!(issues.is_empty());
        assert_eq!(conversation.topic, "Tabs versus spaces");
        assert_eq!(conversation.temperature, 1.1);
        assert_eq!(conversation.model_a.api_key, "sk-a");
        // OLLAMA_KEY is not set
        assert_eq!(conversation.model_b.api_key, "");
        assert_eq!(conversation.model_b.model, "llama3.1");
        assert_eq!(conversation.errors().len(), 1);
    }

    #[test]
    fn test_default_config() {
        let config = FileConfig::default();
        assert_eq!(config.conversation.topic, DEFAULT_TOPIC);
        assert_eq!(config.conversation.max_turns, 10);
        assert!(config.output.color);
        assert!(config.validate().is_empty());

        let (conversation, _) = config.to_conversation_config_with(&env);
        assert!(conversation.errors().is_empty());
        assert_eq!(conversation.model_a.api_key, "sk-shared");
        assert_eq!(conversation.model_b.api_key, "sk-shared");
    }

    #[test]
    fn test_same_model_shares_endpoint_and_flags_dead_fields() {
        let toml_str = r#"
[conversation]
same_model = true

[model_a]
name = "gpt-4.1"

[model_b]
name = "ignored-model"
persona = "You are blunt."
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();

        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("model_b.name"));

        let (conversation, _) = config.to_conversation_config_with(&env);
        let b = conversation.model(Speaker::B);
        assert_eq!(b.model, "gpt-4.1");
        assert_eq!(b.persona, "You are blunt.");
        assert_eq!(b.nickname, "Bob");
    }

    #[test]
    fn test_unreadable_prompt_file_reported_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = FileConfig::default();
        config.conversation.system_prompt_file = Some(dir.path().join("missing.txt"));

        assert!(config.validate().is_empty());

        let (conversation, issues) = config.to_conversation_config_with(&env);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("conversation.system_prompt_file"));
        assert_eq!(conversation.system_prompt, duel_domain::SystemPromptTemplate::default());
    }

    #[test]
    fn test_out_of_range_values_surface_in_domain_validation() {
        let toml_str = r#"
[conversation]
max_turns = 80
temperature = 3.0
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let (conversation, _) = config.to_conversation_config_with(&env);
        assert_eq!(conversation.errors().len(), 2);
    }
}
