//! LLM Gateway port
//!
//! Defines the single capability the Model Client consumes from the outside
//! world: send one chat-completion request, get a completion or a classified
//! error. Adapters for concrete providers live in the infrastructure layer.

use async_trait::async_trait;
use duel_domain::{ErrorClass, FailureKind, TokenUsage};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during a chat-completion call.
///
/// Every variant maps to one [`FailureKind`], which decides retry eligibility
/// and the user-facing hint.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limited: {message}")]
    RateLimited {
        message: String,
        retry_after: Option<Duration>,
    },

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Model returned an empty response")]
    EmptyResponse,

    #[error("Request rejected (HTTP {status}): {message}")]
    RequestRejected { status: u16, message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl GatewayError {
    pub fn kind(&self) -> FailureKind {
        match self {
            GatewayError::Authentication(_) => FailureKind::Authentication,
            GatewayError::RateLimited { .. } => FailureKind::RateLimited,
            GatewayError::Timeout(_) => FailureKind::Timeout,
            GatewayError::Network(_) => FailureKind::Network,
            GatewayError::InvalidResponse(_) => FailureKind::InvalidResponse,
            GatewayError::EmptyResponse => FailureKind::EmptyResponse,
            GatewayError::RequestRejected { .. } => FailureKind::RequestRejected,
            GatewayError::InvalidInput(_) => FailureKind::InvalidInput,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }

    pub fn class(&self) -> ErrorClass {
        self.kind().class()
    }

    /// Provider-suggested delay before retrying, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            GatewayError::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One message of a chat-completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    /// Participant name (OpenAI `name` field)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
            name: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            name: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A fully-specified chat-completion request.
///
/// `Debug` redacts the API key.
#[derive(Clone, PartialEq)]
pub struct ChatRequest {
    /// OpenAI-compatible base URL, without trailing slash
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub timeout: Duration,
}

impl std::fmt::Debug for ChatRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatRequest")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("messages", &self.messages.len())
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Successful completion as returned by the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatCompletion {
    pub text: String,
    pub usage: Option<TokenUsage>,
    pub finish_reason: Option<String>,
}

impl ChatCompletion {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: None,
            finish_reason: None,
        }
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = Some(usage);
        self
    }

    pub fn with_finish_reason(mut self, reason: impl Into<String>) -> Self {
        self.finish_reason = Some(reason.into());
        self
    }
}

/// Gateway for chat-completion calls
///
/// This port defines how the application layer reaches an LLM provider.
/// One call is exactly one outbound request; retries are the caller's concern.
#[async_trait]
pub trait ChatCompletionGateway: Send + Sync {
    async fn send_chat_completion(
        &self,
        request: &ChatRequest,
    ) -> Result<ChatCompletion, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            GatewayError::Authentication("bad key".into()).kind(),
            FailureKind::Authentication
        );
        assert_eq!(
            GatewayError::Timeout(Duration::from_secs(60)).kind(),
            FailureKind::Timeout
        );
        assert!(GatewayError::Network("reset".into()).is_retryable());
        assert!(!GatewayError::EmptyResponse.is_retryable());
        assert!(
            !GatewayError::RequestRejected {
                status: 404,
                message: "model not found".into()
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_retry_after_only_for_rate_limit() {
        let limited = GatewayError::RateLimited {
            message: "slow down".into(),
            retry_after: Some(Duration::from_secs(2)),
        };
        assert_eq!(limited.retry_after(), Some(Duration::from_secs(2)));
        assert_eq!(GatewayError::Network("x".into()).retry_after(), None);
    }

    #[test]
    fn test_message_serialization_omits_empty_name() {
        let json = serde_json::to_value(ChatMessage::user("hi")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "user", "content": "hi"}));

        let named = serde_json::to_value(ChatMessage::assistant("yo").with_name("Bob")).unwrap();
        assert_eq!(named["role"], "assistant");
        assert_eq!(named["name"], "Bob");
    }

    #[test]
    fn test_request_debug_redacts_key() {
        let request = ChatRequest {
            base_url: "https://api.openai.com/v1".into(),
            api_key: "sk-very-secret".into(),
            model: "gpt-4.1-mini".into(),
            messages: vec![],
            temperature: 0.7,
            max_tokens: None,
            timeout: Duration::from_secs(60),
        };
        assert!(!format!("{:?}", request).contains("sk-very-secret"));
    }
}
