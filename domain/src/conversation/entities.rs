//! Conversation entities: [`Turn`] and the append-only [`Transcript`].

use super::value_objects::{Speaker, TokenUsage, duration_secs};
use crate::core::error::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One message produced by one model.
///
/// Fields are private: a Turn is never changed after it is appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    turn: u32,
    speaker: Speaker,
    content: String,
    timestamp: DateTime<Utc>,
    #[serde(rename = "latency_secs", with = "duration_secs")]
    latency: Duration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    usage: Option<TokenUsage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    finish_reason: Option<String>,
}

impl Turn {
    /// Creates a turn stamped with the current wall-clock time.
    pub fn new(turn: u32, speaker: Speaker, content: impl Into<String>, latency: Duration) -> Self {
        Self {
            turn,
            speaker,
            content: content.into(),
            timestamp: Utc::now(),
            latency,
            usage: None,
            finish_reason: None,
        }
    }

    pub fn with_usage(mut self, usage: Option<TokenUsage>) -> Self {
        self.usage = usage;
        self
    }

    pub fn with_finish_reason(mut self, finish_reason: Option<String>) -> Self {
        self.finish_reason = finish_reason;
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// 1-based sequence number.
    pub fn number(&self) -> u32 {
        self.turn
    }

    pub fn speaker(&self) -> Speaker {
        self.speaker
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    pub fn usage(&self) -> Option<&TokenUsage> {
        self.usage.as_ref()
    }

    pub fn finish_reason(&self) -> Option<&str> {
        self.finish_reason.as_deref()
    }
}

/// Ordered, append-only record of the turns of one run.
///
/// Invariants enforced by [`Transcript::append`]:
/// - turn numbers are contiguous starting at 1
/// - consecutive turns never share a speaker
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn, rejecting it if it would break sequence or alternation.
    pub fn append(&mut self, turn: Turn) -> Result<(), DomainError> {
        let expected = self.next_turn_number();
        if turn.number() != expected {
            return Err(DomainError::TranscriptViolation(format!(
                "expected turn {}, got turn {}",
                expected,
                turn.number()
            )));
        }

        if let Some(last) = self.turns.last()
            && last.speaker() == turn.speaker()
        {
            return Err(DomainError::TranscriptViolation(format!(
                "{} spoke twice in a row (turns {} and {})",
                turn.speaker(),
                last.number(),
                turn.number()
            )));
        }

        self.turns.push(turn);
        Ok(())
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Sequence number the next appended turn must carry.
    pub fn next_turn_number(&self) -> u32 {
        self.turns.len() as u32 + 1
    }

    pub fn next_speaker(&self) -> Speaker {
        Speaker::for_turn(self.next_turn_number())
    }

    /// Number of turns produced by `speaker`.
    pub fn count_for(&self, speaker: Speaker) -> usize {
        self.turns.iter().filter(|t| t.speaker() == speaker).count()
    }

    /// Mean response latency, `None` for an empty transcript.
    pub fn average_latency(&self) -> Option<Duration> {
        if self.turns.is_empty() {
            return None;
        }
        let total: Duration = self.turns.iter().map(Turn::latency).sum();
        Some(total / self.turns.len() as u32)
    }

    /// Sum of reported total tokens, `None` when no turn reported usage.
    pub fn total_tokens(&self) -> Option<u32> {
        self.turns
            .iter()
            .filter_map(|t| t.usage().map(|u| u.total_tokens))
            .reduce(|a, b| a + b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(n: u32) -> Turn {
        Turn::new(n, Speaker::for_turn(n), format!("message {}", n), Duration::from_millis(500))
    }

    #[test]
    fn test_append_contiguous_alternating_turns() {
        let mut transcript = Transcript::new();
        for n in 1..=4 {
            transcript.append(turn(n)).unwrap();
        }
        assert_eq!(transcript.len(), 4);
        assert_eq!(transcript.next_turn_number(), 5);
        assert_eq!(transcript.next_speaker(), Speaker::A);
        assert_eq!(transcript.count_for(Speaker::A), 2);
        assert_eq!(transcript.count_for(Speaker::B), 2);
    }

    #[test]
    fn test_append_rejects_gap() {
        let mut transcript = Transcript::new();
        transcript.append(turn(1)).unwrap();
        let err = transcript.append(turn(3)).unwrap_err();
        assert!(matches!(err, DomainError::TranscriptViolation(_)));
        assert_eq!(transcript.len(), 1);
    }

    #[test]
    fn test_append_rejects_repeated_speaker() {
        let mut transcript = Transcript::new();
        transcript.append(turn(1)).unwrap();
        let same_speaker = Turn::new(2, Speaker::A, "again", Duration::ZERO);
        assert!(transcript.append(same_speaker).is_err());
        assert_eq!(transcript.len(), 1);
    }

    #[test]
    fn test_first_turn_must_be_one() {
        let mut transcript = Transcript::new();
        assert!(transcript.append(turn(2)).is_err());
        assert!(transcript.is_empty());
    }

    #[test]
    fn test_average_latency_and_tokens() {
        let mut transcript = Transcript::new();
        assert_eq!(transcript.average_latency(), None);
        assert_eq!(transcript.total_tokens(), None);

        transcript
            .append(
                Turn::new(1, Speaker::A, "a", Duration::from_secs(1))
                    .with_usage(Some(TokenUsage::new(10, 5, 15))),
            )
            .unwrap();
        transcript
            .append(Turn::new(2, Speaker::B, "b", Duration::from_secs(3)))
            .unwrap();

        assert_eq!(transcript.average_latency(), Some(Duration::from_secs(2)));
        assert_eq!(transcript.total_tokens(), Some(15));
    }

    #[test]
    fn test_turn_serializes_latency_as_seconds() {
        let turn = Turn::new(1, Speaker::A, "hello", Duration::from_millis(1500));
        let value = serde_json::to_value(&turn).unwrap();
        assert_eq!(value["turn"], 1);
        assert_eq!(value["speaker"], "A");
        assert_eq!(value["latency_secs"], 1.5);
        assert!(value.get("usage").is_none());
    }
}
