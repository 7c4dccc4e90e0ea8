//! Infrastructure layer for llm-duel
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, plus configuration file loading.

pub mod config;
pub mod logging;
pub mod providers;

// Re-export commonly used types
pub use config::{
    ConfigLoadError, ConfigLoader, FileConfig, FileConversationConfig, FileModelConfig,
    FileOutputConfig, FileRetryConfig,
};
pub use logging::JsonlConversationLogger;
pub use providers::OpenAiCompatibleGateway;
