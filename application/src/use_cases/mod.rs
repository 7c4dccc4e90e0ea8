//! Use cases (application services)

pub mod model_client;
pub mod run_conversation;
