//! Configuration file loading for llm-duel
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment variables: `DUEL_<SECTION>__<KEY>`
//! 2. `--config <path>` specified file
//! 3. Project root: `./duel.toml` or `./.duel.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/llm-duel/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    DEFAULT_API_KEY_ENV, DEFAULT_TOPIC, FileConfig, FileConversationConfig, FileModelConfig,
    FileOutputConfig, FileRetryConfig,
};
pub use loader::{ConfigLoadError, ConfigLoader, ENV_PREFIX};
