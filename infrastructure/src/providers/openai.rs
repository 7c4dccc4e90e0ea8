//! OpenAI-compatible chat-completion gateway.
//!
//! Works with any endpoint that implements `POST {base_url}/chat/completions`
//! (OpenAI, Azure-style proxies, Ollama, vLLM, LM Studio, ...).

use async_trait::async_trait;
use duel_application::ports::llm_gateway::{
    ChatCompletion, ChatCompletionGateway, ChatMessage, ChatRequest, GatewayError,
};
use duel_domain::TokenUsage;
use reqwest::{Client, StatusCode, header::HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// [`ChatCompletionGateway`] over HTTP using `reqwest`.
///
/// Stateless apart from the connection pool; one instance serves both models.
#[derive(Debug, Clone, Default)]
pub struct OpenAiCompatibleGateway {
    client: Client,
}

impl OpenAiCompatibleGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured client (proxy, TLS settings, ...).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn endpoint(base_url: &str) -> String {
        format!("{}/chat/completions", base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ChatCompletionGateway for OpenAiCompatibleGateway {
    async fn send_chat_completion(
        &self,
        request: &ChatRequest,
    ) -> Result<ChatCompletion, GatewayError> {
        let url = Self::endpoint(&request.base_url);
        let body = ChatCompletionRequest {
            model: &request.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };
        debug!("POST {} (model: {})", url, request.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&request.api_key)
            .timeout(request.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|err| map_transport_error(err, request.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = parse_retry_after(response.headers().get("retry-after"));
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(map_http_error(status, body_text, retry_after));
        }

        let body_text = response
            .text()
            .await
            .map_err(|err| map_transport_error(err, request.timeout))?;
        let parsed: ChatCompletionResponse = serde_json::from_str(&body_text)
            .map_err(|err| GatewayError::InvalidResponse(format!("Failed to parse response: {err}")))?;

        extract_completion(parsed)
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// First choice as a completion. A missing `content` yields empty text,
/// which the Model Client reports as an empty response.
fn extract_completion(response: ChatCompletionResponse) -> Result<ChatCompletion, GatewayError> {
    let usage = response
        .usage
        .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens, u.total_tokens));
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| GatewayError::InvalidResponse("response contained no choices".into()))?;

    Ok(ChatCompletion {
        text: choice.message.content.unwrap_or_default(),
        usage,
        finish_reason: choice.finish_reason,
    })
}

fn map_transport_error(err: reqwest::Error, timeout: Duration) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Timeout(timeout)
    } else if err.is_decode() {
        GatewayError::InvalidResponse(format!("Failed to read response: {err}"))
    } else {
        GatewayError::Network(format!("Request failed: {err}"))
    }
}

fn map_http_error(status: StatusCode, body: String, retry_after: Option<Duration>) -> GatewayError {
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or(body);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GatewayError::Authentication(message),
        StatusCode::TOO_MANY_REQUESTS => GatewayError::RateLimited {
            message,
            retry_after,
        },
        StatusCode::REQUEST_TIMEOUT => GatewayError::Network(format!("HTTP {}: {}", status, message)),
        s if s.is_server_error() => GatewayError::Network(format!("HTTP {}: {}", status, message)),
        s if s.is_client_error() => GatewayError::RequestRejected {
            status: s.as_u16(),
            message,
        },
        s => GatewayError::InvalidResponse(format!("unexpected HTTP {}: {}", s, message)),
    }
}

fn parse_retry_after(header: Option<&HeaderValue>) -> Option<Duration> {
    let value = header?.to_str().ok()?.trim();
    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }
    // Some providers send fractional seconds
    value
        .parse::<f64>()
        .ok()
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
}
