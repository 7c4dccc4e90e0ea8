//! Presentation layer for llm-duel
//!
//! This crate contains the CLI definition, console formatting of turns and
//! statistics, the "is thinking" spinner, and transcript export files.

pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::{Cli, ExportArg};
pub use output::console::{ConsoleFormatter, TurnPrinter};
pub use output::export_writer::ExportWriter;
pub use progress::reporter::ProgressReporter;
