//! LLM provider adapters implementing the chat-completion gateway port.

pub mod openai;

pub use openai::OpenAiCompatibleGateway;
