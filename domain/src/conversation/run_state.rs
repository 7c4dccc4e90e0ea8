//! Mutable state of a single conversation run.
//!
//! A [`RunState`] is owned by exactly one run. It starts `Idle`, moves to
//! `Running` via [`RunState::begin`], and ends in one terminal status:
//!
//! ```text
//! Idle ──begin──▶ Running ──┬──complete──▶ Completed
//!                           ├──fail──────▶ Failed
//!                           └──stop──────▶ StoppedByUser
//! ```
//!
//! Terminal states are final; a new run needs a fresh `RunState`.

use super::entities::{Transcript, Turn};
use super::value_objects::Speaker;
use crate::core::error::{DomainError, ErrorClass, FailureKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    #[default]
    Idle,
    Running,
    StoppedByUser,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Idle => "idle",
            RunStatus::Running => "running",
            RunStatus::StoppedByUser => "stopped_by_user",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::StoppedByUser | RunStatus::Completed | RunStatus::Failed
        )
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a run ended in `Failed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunFailure {
    /// The turn that could not be produced
    pub turn: u32,
    pub speaker: Speaker,
    pub kind: FailureKind,
    pub message: String,
}

impl RunFailure {
    pub fn new(turn: u32, speaker: Speaker, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            turn,
            speaker,
            kind,
            message: message.into(),
        }
    }

    pub fn class(&self) -> ErrorClass {
        self.kind.class()
    }
}

impl std::fmt::Display for RunFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Turn {} ({}) failed: {} ({})",
            self.turn,
            self.speaker,
            self.message,
            self.class().hint()
        )
    }
}

/// State of one run: status, transcript and terminal error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunState {
    status: RunStatus,
    transcript: Transcript,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    failure: Option<RunFailure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    finished_at: Option<DateTime<Utc>>,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn failure(&self) -> Option<&RunFailure> {
        self.failure.as_ref()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Number of turns produced so far.
    pub fn turn_count(&self) -> u32 {
        self.transcript.len() as u32
    }

    /// Speaker who acts next.
    pub fn current_speaker(&self) -> Speaker {
        self.transcript.next_speaker()
    }

    /// `Idle → Running`, seeding an empty transcript.
    pub fn begin(&mut self) -> Result<(), DomainError> {
        self.expect_status(RunStatus::Idle, RunStatus::Running)?;
        self.transcript = Transcript::new();
        self.status = RunStatus::Running;
        self.started_at = Some(Utc::now());
        Ok(())
    }

    /// Append a produced turn. Only valid while running.
    pub fn record_turn(&mut self, turn: Turn) -> Result<(), DomainError> {
        if self.status != RunStatus::Running {
            return Err(DomainError::TranscriptViolation(format!(
                "cannot append turn {} to a {} run",
                turn.number(),
                self.status
            )));
        }
        self.transcript.append(turn)
    }

    pub fn complete(&mut self) -> Result<(), DomainError> {
        self.finish(RunStatus::Completed)
    }

    pub fn stop_by_user(&mut self) -> Result<(), DomainError> {
        self.finish(RunStatus::StoppedByUser)
    }

    /// `Running → Failed`, keeping the transcript accumulated so far.
    pub fn fail(&mut self, failure: RunFailure) -> Result<(), DomainError> {
        self.finish(RunStatus::Failed)?;
        self.failure = Some(failure);
        Ok(())
    }

    fn finish(&mut self, to: RunStatus) -> Result<(), DomainError> {
        self.expect_status(RunStatus::Running, to)?;
        self.status = to;
        self.finished_at = Some(Utc::now());
        Ok(())
    }

    fn expect_status(&self, expected: RunStatus, to: RunStatus) -> Result<(), DomainError> {
        if self.status != expected {
            return Err(DomainError::InvalidTransition {
                from: self.status.to_string(),
                to: to.to_string(),
            });
        }
        Ok(())
    }
}
