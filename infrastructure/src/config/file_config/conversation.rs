//! Conversation configuration from TOML (`[conversation]` section)

use duel_domain::config::{
    DEFAULT_MAX_TURNS, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_TEMPERATURE, DEFAULT_TURN_DELAY_SECS,
};
use duel_domain::{ConfigIssue, SystemPromptTemplate};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

pub const DEFAULT_TOPIC: &str = "The impact of artificial intelligence on society";

/// Raw conversation settings
///
/// # Example
///
/// ```toml
/// [conversation]
/// topic = "Is mathematics discovered or invented?"
/// max_turns = 6
/// temperature = 0.9
/// turn_delay_secs = 0.5
/// system_prompt_file = "prompts/debate.txt"
/// same_model = true   # Model B reuses Model A's endpoint, key and model
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConversationConfig {
    pub topic: String,
    pub max_turns: u32,
    pub temperature: f32,
    pub turn_delay_secs: f64,
    pub request_timeout_secs: f64,
    pub max_tokens: Option<u32>,
    /// Template file with a `{topic}` placeholder
    pub system_prompt_file: Option<PathBuf>,
    /// Two personas on one model
    pub same_model: bool,
}

impl Default for FileConversationConfig {
    fn default() -> Self {
        Self {
            topic: DEFAULT_TOPIC.to_string(),
            max_turns: DEFAULT_MAX_TURNS,
            temperature: DEFAULT_TEMPERATURE,
            turn_delay_secs: DEFAULT_TURN_DELAY_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_tokens: None,
            system_prompt_file: None,
            same_model: false,
        }
    }
}

impl FileConversationConfig {
    /// Load the system prompt template, falling back to the built-in one.
    pub fn load_system_prompt(&self) -> (SystemPromptTemplate, Vec<ConfigIssue>) {
        let Some(path) = &self.system_prompt_file else {
            return (SystemPromptTemplate::default(), Vec::new());
        };

        match std::fs::read_to_string(path) {
            Ok(text) if !text.trim().is_empty() => (SystemPromptTemplate::new(text), Vec::new()),
            Ok(_) => {
                warn!("System prompt file {} is empty, using default", path.display());
                (
                    SystemPromptTemplate::default(),
                    vec![ConfigIssue::unreadable_file(
                        "conversation.system_prompt_file",
                        path.display().to_string(),
                        "file is empty",
                    )],
                )
            }
            Err(e) => {
                warn!(
                    "Could not load system prompt file {}: {}, using default",
                    path.display(),
                    e
                );
                (
                    SystemPromptTemplate::default(),
                    vec![ConfigIssue::unreadable_file(
                        "conversation.system_prompt_file",
                        path.display().to_string(),
                        e,
                    )],
                )
            }
        }
    }
}
