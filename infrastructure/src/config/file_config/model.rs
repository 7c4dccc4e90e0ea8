//! Participant configuration from TOML (`[model_a]` / `[model_b]` sections)

use duel_domain::{ModelConfig, Speaker};
use serde::{Deserialize, Serialize};

/// Environment variable consulted when no `api_key` is set.
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

const MODEL_A_NAME: &str = "gpt-4.1-mini";
const MODEL_A_NICKNAME: &str = "Alice";
const MODEL_A_PERSONA: &str =
    "You are a thoughtful and analytical assistant who enjoys exploring ideas in depth.";

const MODEL_B_NAME: &str = "gpt-4.1-nano";
const MODEL_B_NICKNAME: &str = "Bob";
const MODEL_B_PERSONA: &str = "You are a creative and curious assistant who likes to ask questions and challenge assumptions.";

/// Raw participant settings
///
/// Unset fields fall back to per-participant defaults, so a section only needs
/// the values that differ.
///
/// # Example
///
/// ```toml
/// [model_b]
/// base_url = "http://localhost:11434/v1"   # any OpenAI-compatible endpoint
/// name = "llama3.1"
/// api_key = "ollama"
/// nickname = "Llama"
/// persona = "You are a contrarian who enjoys poking holes in arguments."
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModelConfig {
    /// Direct API key (prefer `api_key_env`)
    pub api_key: Option<String>,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub base_url: Option<String>,
    /// Model name sent to the endpoint
    pub name: Option<String>,
    pub nickname: Option<String>,
    pub persona: Option<String>,
}

impl Default for FileModelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            base_url: None,
            name: None,
            nickname: None,
            persona: None,
        }
    }
}

impl FileModelConfig {
    /// Build the domain config for `speaker`, reading the API key from the
    /// environment through `env` when none is set directly.
    pub fn resolve(&self, speaker: Speaker, env: &dyn Fn(&str) -> Option<String>) -> ModelConfig {
        let (name, nickname, persona) = match speaker {
            Speaker::A => (MODEL_A_NAME, MODEL_A_NICKNAME, MODEL_A_PERSONA),
            Speaker::B => (MODEL_B_NAME, MODEL_B_NICKNAME, MODEL_B_PERSONA),
        };

        let api_key = self
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| env(&self.api_key_env))
            .unwrap_or_default();

        let mut config = ModelConfig::new(
            api_key,
            self.name.clone().unwrap_or_else(|| name.to_string()),
            self.nickname.clone().unwrap_or_else(|| nickname.to_string()),
            self.persona.clone().unwrap_or_else(|| persona.to_string()),
        );
        if let Some(url) = self.base_url.as_deref().filter(|u| !u.trim().is_empty()) {
            config = config.with_base_url(url);
        }
        config
    }

    /// Endpoint fields set in this section (used to flag dead settings).
    pub fn endpoint_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.api_key.is_some() {
            fields.push("api_key");
        }
        if self.api_key_env != DEFAULT_API_KEY_ENV {
            fields.push("api_key_env");
        }
        if self.base_url.is_some() {
            fields.push("base_url");
        }
        if self.name.is_some() {
            fields.push("name");
        }
        fields
    }
}
