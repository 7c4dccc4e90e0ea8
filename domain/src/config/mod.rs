//! Configuration value objects for the domain layer
//!
//! These are the validated inputs of a run, independent of where they were
//! loaded from (TOML, environment, CLI flags).

mod conversation_config;
mod model_config;
pub mod validation;

pub use conversation_config::{
    ConversationConfig, DEFAULT_MAX_TURNS, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_TEMPERATURE,
    DEFAULT_TURN_DELAY_SECS, TEMPERATURE_LIMITS, TURN_LIMITS,
};
pub use model_config::{DEFAULT_BASE_URL, ModelConfig};
pub use validation::{ConfigIssue, ConfigIssueCode, Severity};
