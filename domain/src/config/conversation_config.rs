//! Immutable input bundle for one conversation run.

use super::model_config::ModelConfig;
use super::validation::ConfigIssue;
use crate::conversation::value_objects::Speaker;
use crate::prompt::SystemPromptTemplate;
use std::ops::RangeInclusive;
use std::time::Duration;

/// Allowed range for `max_turns`.
pub const TURN_LIMITS: RangeInclusive<u32> = 2..=50;
/// Allowed range for `temperature`.
pub const TEMPERATURE_LIMITS: RangeInclusive<f32> = 0.0..=2.0;

pub const DEFAULT_MAX_TURNS: u32 = 10;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TURN_DELAY_SECS: f64 = 1.0;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: f64 = 60.0;

/// Configuration of a run: topic, limits and both participants.
///
/// Validated once with [`ConversationConfig::validate`] before a run starts.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationConfig {
    pub topic: String,
    pub max_turns: u32,
    pub temperature: f32,
    /// Pause between turns, in seconds
    pub turn_delay_secs: f64,
    /// Per-request timeout, in seconds
    pub request_timeout_secs: f64,
    /// Optional cap on generated tokens per turn
    pub max_tokens: Option<u32>,
    pub system_prompt: SystemPromptTemplate,
    pub model_a: ModelConfig,
    pub model_b: ModelConfig,
}

impl ConversationConfig {
    pub fn new(topic: impl Into<String>, model_a: ModelConfig, model_b: ModelConfig) -> Self {
        Self {
            topic: topic.into(),
            max_turns: DEFAULT_MAX_TURNS,
            temperature: DEFAULT_TEMPERATURE,
            turn_delay_secs: DEFAULT_TURN_DELAY_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_tokens: None,
            system_prompt: SystemPromptTemplate::default(),
            model_a,
            model_b,
        }
    }

    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_turn_delay_secs(mut self, secs: f64) -> Self {
        self.turn_delay_secs = secs;
        self
    }

    pub fn with_request_timeout_secs(mut self, secs: f64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_system_prompt(mut self, template: SystemPromptTemplate) -> Self {
        self.system_prompt = template;
        self
    }

    /// Pause between turns. Only meaningful after validation.
    pub fn turn_delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.turn_delay_secs).unwrap_or(Duration::ZERO)
    }

    /// Per-request timeout. Only meaningful after validation.
    pub fn request_timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.request_timeout_secs)
            .unwrap_or(Duration::from_secs_f64(DEFAULT_REQUEST_TIMEOUT_SECS))
    }

    /// Effective configuration of `speaker`, with endpoint sharing applied.
    pub fn model(&self, speaker: Speaker) -> ModelConfig {
        match speaker {
            Speaker::A => self.model_a.clone(),
            Speaker::B => self.model_b.resolve_against(&self.model_a),
        }
    }

    pub fn nickname(&self, speaker: Speaker) -> &str {
        match speaker {
            Speaker::A => &self.model_a.nickname,
            Speaker::B => &self.model_b.nickname,
        }
    }

    /// Collect every issue with this configuration.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.topic.trim().is_empty() {
            issues.push(ConfigIssue::empty_field("topic"));
        }

        if !TURN_LIMITS.contains(&self.max_turns) {
            issues.push(ConfigIssue::out_of_range(
                "max_turns",
                self.max_turns,
                format!("{}..={}", TURN_LIMITS.start(), TURN_LIMITS.end()),
            ));
        }

        if !TEMPERATURE_LIMITS.contains(&self.temperature) {
            issues.push(ConfigIssue::out_of_range(
                "temperature",
                self.temperature,
                format!("{:.1}..={:.1}", TEMPERATURE_LIMITS.start(), TEMPERATURE_LIMITS.end()),
            ));
        }

        if !(self.turn_delay_secs.is_finite() && self.turn_delay_secs >= 0.0) {
            issues.push(ConfigIssue::out_of_range(
                "turn_delay_secs",
                self.turn_delay_secs,
                ">= 0",
            ));
        }

        if !(self.request_timeout_secs.is_finite() && self.request_timeout_secs > 0.0) {
            issues.push(ConfigIssue::out_of_range(
                "request_timeout_secs",
                self.request_timeout_secs,
                "> 0",
            ));
        }

        if self.max_tokens == Some(0) {
            issues.push(ConfigIssue::out_of_range("max_tokens", 0, ">= 1"));
        }

        issues.extend(self.model(Speaker::A).validate("model_a"));
        issues.extend(self.model(Speaker::B).validate("model_b"));

        if !self.system_prompt.contains_placeholder() {
            issues.push(ConfigIssue::missing_placeholder("system_prompt"));
        }

        issues
    }

    /// Error-severity issues only; empty means the run may start.
    pub fn errors(&self) -> Vec<ConfigIssue> {
        self.validate().into_iter().filter(|i| i.is_error()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::validation::ConfigIssueCode;

    fn config() -> ConversationConfig {
        ConversationConfig::new(
            "AI ethics",
            ModelConfig::new("sk-a", "gpt-4.1-mini", "Alice", "skeptic"),
            ModelConfig::new("sk-b", "gpt-4.1-nano", "Bob", "optimist"),
        )
    }

    #[test]
    fn test_valid_config_has_no_issues() {
        assert!(config().validate().is_empty());
    }

    #[test]
    fn test_blank_topic_is_error() {
        let issues = config().errors();
        assert!(issues.is_empty());
        let mut cfg = config();
        cfg.topic = "   ".to_string();
        let errors = cfg.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].code,
            ConfigIssueCode::EmptyField {
                field: "topic".to_string()
            }
        );
    }

    #[test]
    fn test_turn_bounds() {
        assert_eq!(config().with_max_turns(1).errors().len(), 1);
        assert_eq!(config().with_max_turns(51).errors().len(), 1);
        assert!(config().with_max_turns(2).errors().is_empty());
        assert!(config().with_max_turns(50).errors().is_empty());
    }

    #[test]
    fn test_temperature_bounds() {
        assert!(config().with_temperature(0.0).errors().is_empty());
        assert!(config().with_temperature(2.0).errors().is_empty());
        assert_eq!(config().with_temperature(2.5).errors().len(), 1);
        assert_eq!(config().with_temperature(f32::NAN).errors().len(), 1);
    }

    #[test]
    fn test_negative_delay_and_zero_timeout() {
        let cfg = config()
            .with_turn_delay_secs(-1.0)
            .with_request_timeout_secs(0.0);
        assert_eq!(cfg.errors().len(), 2);
        assert!(config().with_turn_delay_secs(0.0).errors().is_empty());
    }

    #[test]
    fn test_missing_model_b_key_reported() {
        let mut cfg = config();
        cfg.model_b.api_key = String::new();
        let errors = cfg.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "model_b.api_key is required");
    }

    #[test]
    fn test_shared_endpoint_satisfies_model_b_credentials() {
        let mut cfg = config();
        cfg.model_b = ModelConfig::new("", "", "Bob", "optimist").sharing_endpoint();
        assert!(cfg.errors().is_empty());
        assert_eq!(cfg.model(Speaker::B).model, "gpt-4.1-mini");
        assert_eq!(cfg.nickname(Speaker::B), "Bob");
    }

    #[test]
    fn test_template_without_placeholder_is_warning_only() {
        let cfg = config().with_system_prompt(SystemPromptTemplate::new("Just chat."));
        assert_eq!(cfg.validate().len(), 1);
        assert!(cfg.errors().is_empty());
    }

    #[test]
    fn test_durations() {
        let cfg = config()
            .with_turn_delay_secs(0.25)
            .with_request_timeout_secs(30.0);
        assert_eq!(cfg.turn_delay(), Duration::from_millis(250));
        assert_eq!(cfg.request_timeout(), Duration::from_secs(30));
    }
}
