//! Port for the structured transcript log.
//!
//! Separate from `tracing`: tracing carries diagnostics for humans, this port
//! records every run lifecycle event as machine-readable data (JSONL).

use duel_domain::{ConversationConfig, RunFailure, RunState, Speaker, Turn};
use serde_json::{Value, json};

/// One transcript log record: an event type plus a JSON payload.
///
/// The timestamp is added by the writer.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationEvent {
    /// `run_started`, `turn_completed`, `turn_failed` or `run_finished`
    pub event_type: &'static str,
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }

    /// Run accepted and about to take its first turn. Never contains API keys.
    pub fn run_started(config: &ConversationConfig) -> Self {
        let model_a = config.model(Speaker::A);
        let model_b = config.model(Speaker::B);
        Self::new(
            "run_started",
            json!({
                "topic": config.topic,
                "max_turns": config.max_turns,
                "temperature": config.temperature,
                "model_a": { "nickname": model_a.nickname, "model": model_a.model, "base_url": model_a.endpoint() },
                "model_b": { "nickname": model_b.nickname, "model": model_b.model, "base_url": model_b.endpoint() },
            }),
        )
    }

    pub fn turn_completed(turn: &Turn, nickname: &str, attempts: u32) -> Self {
        Self::new(
            "turn_completed",
            json!({
                "turn": turn.number(),
                "speaker": turn.speaker(),
                "nickname": nickname,
                "content": turn.content(),
                "latency_secs": turn.latency().as_secs_f64(),
                "usage": turn.usage(),
                "finish_reason": turn.finish_reason(),
                "attempts": attempts,
            }),
        )
    }

    pub fn turn_failed(failure: &RunFailure) -> Self {
        Self::new(
            "turn_failed",
            json!({
                "turn": failure.turn,
                "speaker": failure.speaker,
                "kind": failure.kind,
                "message": failure.message,
            }),
        )
    }

    pub fn run_finished(state: &RunState) -> Self {
        Self::new(
            "run_finished",
            json!({
                "status": state.status(),
                "turns": state.turn_count(),
            }),
        )
    }
}

/// Port for writing transcript events to a structured log.
///
/// `log` is synchronous and infallible; a writer that cannot persist an event
/// drops it rather than disturbing the run.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// Logger used when no transcript log is configured.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use duel_domain::{FailureKind, ModelConfig};
    use std::time::Duration;

    #[test]
    fn test_run_started_omits_api_keys() {
        let config = ConversationConfig::new(
            "AI ethics",
            ModelConfig::new("sk-secret-a", "gpt-4.1-mini", "Alice", "skeptic"),
            ModelConfig::new("sk-secret-b", "gpt-4.1-nano", "Bob", "optimist"),
        );
        let event = ConversationEvent::run_started(&config);
        let text = event.payload.to_string();
        assert_eq!(event.event_type, "run_started");
        assert!(!text.contains("sk-secret"));
        assert_eq!(event.payload["model_b"]["nickname"], "Bob");
    }

    #[test]
    fn test_turn_events() {
        let turn = Turn::new(2, Speaker::B, "Indeed.", Duration::from_millis(500));
        let event = ConversationEvent::turn_completed(&turn, "Bob", 2);
        assert_eq!(event.payload["turn"], 2);
        assert_eq!(event.payload["speaker"], "B");
        assert_eq!(event.payload["attempts"], 2);

        let failure = RunFailure::new(3, Speaker::A, FailureKind::Timeout, "timed out");
        let event = ConversationEvent::turn_failed(&failure);
        assert_eq!(event.event_type, "turn_failed");
        assert_eq!(event.payload["kind"], "timeout");
    }
}
