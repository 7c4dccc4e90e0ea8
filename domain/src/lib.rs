//! Domain layer for llm-duel
//!
//! This crate contains the core entities and value objects of a two-model
//! conversation. It has no dependencies on infrastructure or presentation
//! concerns.
//!
//! # Core Concepts
//!
//! - **Turn**: one immutable message produced by Model A or Model B
//! - **Transcript**: the append-only, strictly alternating record of turns
//! - **RunState**: the lifecycle of one run (`Idle → Running → Completed | Failed | StoppedByUser`)
//! - **ConversationConfig**: the validated, immutable input of a run

pub mod config;
pub mod conversation;
pub mod core;
pub mod export;
pub mod prompt;
pub mod util;

// Re-export commonly used types
pub use config::{ConfigIssue, ConfigIssueCode, ConversationConfig, ModelConfig, Severity};
pub use conversation::{
    entities::{Transcript, Turn},
    run_state::{RunFailure, RunState, RunStatus},
    value_objects::{Speaker, TokenUsage},
};
pub use core::error::{DomainError, ErrorClass, FailureKind};
pub use export::{ConversationExport, ConversationStats, ExportFormat};
pub use prompt::{PromptTemplate, SystemPromptTemplate};
