//! Prompt templates.
//!
//! - [`template::SystemPromptTemplate`] — the shared system prompt with a `{topic}` placeholder
//! - [`template::PromptTemplate`] — fixed opening / continuation prompts

pub mod template;

pub use template::{PromptTemplate, SystemPromptTemplate, TOPIC_PLACEHOLDER};
