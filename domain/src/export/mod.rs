//! Transcript export.
//!
//! - [`format::ExportFormat`] — JSON or Markdown
//! - [`document::ConversationExport`] — pure projection of config + run state

pub mod document;
pub mod format;
mod markdown;

pub use document::{
    ConfigSummary, ConversationExport, ConversationStats, FailureSummary, ModelSummary, TurnRecord,
};
pub use format::ExportFormat;
