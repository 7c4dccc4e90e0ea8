//! Application layer for llm-duel
//!
//! This crate contains the Model Client, the conversation orchestrator, port
//! definitions and retry configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use config::RetryPolicy;
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    llm_gateway::{
        ChatCompletion, ChatCompletionGateway, ChatMessage, ChatRequest, ChatRole, GatewayError,
    },
    progress::{CompositeProgress, ConversationProgressNotifier, NoProgress},
};
pub use use_cases::model_client::{ModelClient, TurnResult, participant_name};
pub use use_cases::run_conversation::{
    ConnectionCheck, RunConversationError, RunConversationUseCase, RunHandle,
};
