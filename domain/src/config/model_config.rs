//! Per-model endpoint and persona configuration.

use super::validation::ConfigIssue;

/// Base URL used when a model does not specify one.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Static description of one conversation participant.
///
/// Read-only after validation. `Debug` redacts the API key.
#[derive(Clone, PartialEq)]
pub struct ModelConfig {
    pub api_key: String,
    /// OpenAI-compatible base URL; `None` means [`DEFAULT_BASE_URL`]
    pub base_url: Option<String>,
    pub model: String,
    pub persona: String,
    pub nickname: String,
    /// Take API key, base URL and model name from the partner model
    /// ("same model, two personas")
    pub share_endpoint: bool,
}

impl ModelConfig {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        nickname: impl Into<String>,
        persona: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
            model: model.into(),
            persona: persona.into(),
            nickname: nickname.into(),
            share_endpoint: false,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn sharing_endpoint(mut self) -> Self {
        self.share_endpoint = true;
        self
    }

    /// Effective base URL, without a trailing slash.
    pub fn endpoint(&self) -> &str {
        self.base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }

    /// Copy of this config using `source`'s credentials, endpoint and model
    /// name when `share_endpoint` is set; otherwise an unchanged copy.
    pub fn resolve_against(&self, source: &ModelConfig) -> ModelConfig {
        if !self.share_endpoint {
            return self.clone();
        }
        ModelConfig {
            api_key: source.api_key.clone(),
            base_url: source.base_url.clone(),
            model: source.model.clone(),
            persona: self.persona.clone(),
            nickname: self.nickname.clone(),
            share_endpoint: true,
        }
    }

    /// Validate required fields. `prefix` names the config section (e.g. `model_a`).
    pub fn validate(&self, prefix: &str) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        let required = [
            ("api_key", &self.api_key),
            ("name", &self.model),
            ("persona", &self.persona),
            ("nickname", &self.nickname),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                issues.push(ConfigIssue::empty_field(format!("{}.{}", prefix, field)));
            }
        }
        issues
    }
}

impl std::fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("persona", &self.persona)
            .field("nickname", &self.nickname)
            .field("share_endpoint", &self.share_endpoint)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> ModelConfig {
        ModelConfig::new("sk-alice", "gpt-4.1-mini", "Alice", "You are analytical.")
    }

    #[test]
    fn test_endpoint_defaults_and_trims() {
        assert_eq!(alice().endpoint(), DEFAULT_BASE_URL);
        let local = alice().with_base_url("http://localhost:11434/v1/");
        assert_eq!(local.endpoint(), "http://localhost:11434/v1");
        let blank = alice().with_base_url("  ");
        assert_eq!(blank.endpoint(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let debug = format!("{:?}", alice());
        assert!(!debug.contains("sk-alice"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_validate_reports_every_empty_field() {
        let config = ModelConfig::new("", " ", "Bob", "");
        let issues = config.validate("model_b");
        let messages: Vec<_> = issues.iter().map(|i| i.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "model_b.api_key is required",
                "model_b.name is required",
                "model_b.persona is required",
            ]
        );
    }

    #[test]
    fn test_resolve_against_shares_endpoint_keeps_persona() {
        let bob = ModelConfig::new("", "", "Bob", "You are curious.").sharing_endpoint();
        let resolved = bob.resolve_against(&alice().with_base_url("http://local/v1"));
        assert_eq!(resolved.api_key, "sk-alice");
        assert_eq!(resolved.model, "gpt-4.1-mini");
        assert_eq!(resolved.endpoint(), "http://local/v1");
        assert_eq!(resolved.nickname, "Bob");
        assert_eq!(resolved.persona, "You are curious.");
    }

    #[test]
    fn test_resolve_against_without_sharing_is_identity() {
        let bob = ModelConfig::new("sk-bob", "gpt-4.1-nano", "Bob", "curious");
        assert_eq!(bob.resolve_against(&alice()), bob);
    }
}
