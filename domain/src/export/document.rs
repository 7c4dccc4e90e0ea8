//! Serializable export of a run.
//!
//! [`ConversationExport`] is a pure projection of config + run state. It holds
//! no wall-clock "generated at" value, so exporting the same state twice is
//! byte-identical. API keys never enter the export.

use super::format::ExportFormat;
use super::markdown;
use crate::config::ConversationConfig;
use crate::conversation::entities::Turn;
use crate::conversation::run_state::{RunFailure, RunState, RunStatus};
use crate::conversation::value_objects::{Speaker, TokenUsage};
use crate::core::error::FailureKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Public description of one participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub nickname: String,
    pub model: String,
    pub base_url: String,
    pub persona: String,
}

/// Configuration header of an export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSummary {
    pub topic: String,
    pub max_turns: u32,
    pub temperature: f32,
    pub turn_delay_secs: f64,
    pub model_a: ModelSummary,
    pub model_b: ModelSummary,
}

/// One turn as exported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub turn: u32,
    pub speaker: Speaker,
    pub nickname: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub latency_secs: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Terminal error of a failed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureSummary {
    pub turn: u32,
    pub speaker: Speaker,
    pub kind: FailureKind,
    pub message: String,
    pub hint: String,
}

/// Aggregate statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationStats {
    pub total_turns: usize,
    pub model_a_messages: usize,
    pub model_b_messages: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_latency_secs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u32>,
}

/// Complete export record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationExport {
    pub config: ConfigSummary,
    pub status: RunStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    pub turns: Vec<TurnRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureSummary>,
    pub stats: ConversationStats,
}

impl ConversationExport {
    /// Project the current state of a run.
    pub fn new(config: &ConversationConfig, state: &RunState) -> Self {
        let transcript = state.transcript();

        let turns = transcript
            .turns()
            .iter()
            .map(|turn| TurnRecord::from_turn(turn, config.nickname(turn.speaker())))
            .collect();

        Self {
            config: ConfigSummary::from_config(config),
            status: state.status(),
            started_at: state.started_at(),
            turns,
            failure: state.failure().map(FailureSummary::from_failure),
            stats: ConversationStats {
                total_turns: transcript.len(),
                model_a_messages: transcript.count_for(Speaker::A),
                model_b_messages: transcript.count_for(Speaker::B),
                average_latency_secs: transcript.average_latency().map(|d| d.as_secs_f64()),
                total_tokens: transcript.total_tokens(),
            },
        }
    }

    pub fn render(&self, format: ExportFormat) -> String {
        match format {
            ExportFormat::Json => self.to_json(),
            ExportFormat::Markdown => markdown::render(self),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

impl ModelSummary {
    fn from_config(config: &crate::config::ModelConfig) -> Self {
        Self {
            nickname: config.nickname.clone(),
            model: config.model.clone(),
            base_url: config.endpoint().to_string(),
            persona: config.persona.clone(),
        }
    }
}

impl ConfigSummary {
    fn from_config(config: &ConversationConfig) -> Self {
        Self {
            topic: config.topic.clone(),
            max_turns: config.max_turns,
            temperature: config.temperature,
            turn_delay_secs: config.turn_delay_secs,
            model_a: ModelSummary::from_config(&config.model(Speaker::A)),
            model_b: ModelSummary::from_config(&config.model(Speaker::B)),
        }
    }

    pub fn model(&self, speaker: Speaker) -> &ModelSummary {
        match speaker {
            Speaker::A => &self.model_a,
            Speaker::B => &self.model_b,
        }
    }
}

impl TurnRecord {
    fn from_turn(turn: &Turn, nickname: &str) -> Self {
        Self {
            turn: turn.number(),
            speaker: turn.speaker(),
            nickname: nickname.to_string(),
            content: turn.content().to_string(),
            timestamp: turn.timestamp(),
            latency_secs: turn.latency().as_secs_f64(),
            usage: turn.usage().copied(),
            finish_reason: turn.finish_reason().map(str::to_string),
        }
    }
}

impl FailureSummary {
    fn from_failure(failure: &RunFailure) -> Self {
        Self {
            turn: failure.turn,
            speaker: failure.speaker,
            kind: failure.kind,
            message: failure.message.clone(),
            hint: failure.class().hint().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use std::time::Duration;

    fn config() -> ConversationConfig {
        ConversationConfig::new(
            "AI ethics",
            ModelConfig::new("sk-secret-a", "gpt-4.1-mini", "Alice", "skeptic"),
            ModelConfig::new("sk-secret-b", "gpt-4.1-nano", "Bob", "optimist")
                .with_base_url("http://localhost:8080/v1"),
        )
        .with_max_turns(4)
    }

    fn state_with_turns(n: u32) -> RunState {
        let mut state = RunState::new();
        state.begin().unwrap();
        for i in 1..=n {
            state
                .record_turn(
                    Turn::new(
                        i,
                        Speaker::for_turn(i),
                        format!("point {}", i),
                        Duration::from_secs(i as u64),
                    )
                    .with_usage(Some(TokenUsage::new(10, 10, 20))),
                )
                .unwrap();
        }
        state
    }

    #[test]
    fn test_export_stats() {
        let export = ConversationExport::new(&config(), &state_with_turns(3));
        assert_eq!(export.stats.total_turns, 3);
        assert_eq!(export.stats.model_a_messages, 2);
        assert_eq!(export.stats.model_b_messages, 1);
        assert_eq!(export.stats.average_latency_secs, Some(2.0));
        assert_eq!(export.stats.total_tokens, Some(60));
        assert_eq!(export.turns[1].nickname, "Bob");
        assert_eq!(export.status, RunStatus::Running);
    }

    #[test]
    fn test_json_never_contains_api_keys() {
        let json = ConversationExport::new(&config(), &state_with_turns(2)).to_json();
        assert!(!json.contains("sk-secret"));
        assert!(json.contains("http://localhost:8080/v1"));
        assert!(json.contains("https://api.openai.com/v1"));
    }

    #[test]
    fn test_json_is_idempotent() {
        let config = config();
        let state = state_with_turns(2);
        let first = ConversationExport::new(&config, &state).render(ExportFormat::Json);
        let second = ConversationExport::new(&config, &state).render(ExportFormat::Json);
        assert_eq!(first, second);
    }

    #[test]
    fn test_failure_is_exported_with_hint() {
        let mut state = state_with_turns(1);
        state
            .fail(RunFailure::new(
                2,
                Speaker::B,
                FailureKind::Authentication,
                "Incorrect API key provided",
            ))
            .unwrap();
        let export = ConversationExport::new(&config(), &state);
        let value: serde_json::Value = serde_json::from_str(&export.to_json()).unwrap();
        assert_eq!(value["status"], "failed");
        assert_eq!(value["failure"]["kind"], "authentication");
        assert_eq!(value["failure"]["turn"], 2);
        assert_eq!(value["turns"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_empty_export_has_no_average() {
        let export = ConversationExport::new(&config(), &RunState::new());
        assert_eq!(export.stats.total_turns, 0);
        assert!(export.stats.average_latency_secs.is_none());
        assert_eq!(export.status, RunStatus::Idle);
    }
}
