//! Model Client
//!
//! Wraps one model endpoint: builds the chat context for a turn, sends it
//! through the [`ChatCompletionGateway`], and retries transient failures with
//! bounded exponential backoff. The orchestrator never retries on its own.

use crate::config::RetryPolicy;
use crate::ports::llm_gateway::{
    ChatCompletion, ChatCompletionGateway, ChatMessage, ChatRequest, GatewayError,
};
use duel_domain::util::preview;
use duel_domain::{
    ConversationConfig, FailureKind, ModelConfig, PromptTemplate, Speaker, SystemPromptTemplate,
    TokenUsage, Turn,
};
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

const TEMPERATURE_RANGE: RangeInclusive<f32> = 0.0..=2.0;
const NAME_MAX_LEN: usize = 64;
const CONNECTION_CHECK_MAX_TOKENS: u32 = 10;
const CONNECTION_CHECK_TEMPERATURE: f32 = 0.7;

/// Successful outcome of [`ModelClient::generate`].
#[derive(Debug, Clone, PartialEq)]
pub struct TurnResult {
    pub text: String,
    /// Time from the start of the successful attempt until its response arrived
    pub latency: Duration,
    pub usage: Option<TokenUsage>,
    pub finish_reason: Option<String>,
    /// Number of requests sent, including the successful one
    pub attempts: u32,
}

/// Callback invoked before sleeping for a retry: `(attempt, delay, error)`.
pub type RetryHook<'a> = &'a (dyn Fn(u32, Duration, &GatewayError) + Send + Sync);

/// Client for one conversation participant.
pub struct ModelClient {
    gateway: Arc<dyn ChatCompletionGateway>,
    speaker: Speaker,
    model: ModelConfig,
    partner_nickname: String,
    template: SystemPromptTemplate,
    request_timeout: Duration,
    max_tokens: Option<u32>,
    retry: RetryPolicy,
}

impl ModelClient {
    pub fn new(
        gateway: Arc<dyn ChatCompletionGateway>,
        speaker: Speaker,
        model: ModelConfig,
        partner_nickname: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            speaker,
            model,
            partner_nickname: partner_nickname.into(),
            template: SystemPromptTemplate::default(),
            request_timeout: Duration::from_secs(60),
            max_tokens: None,
            retry: RetryPolicy::default(),
        }
    }

    /// Client for `speaker`, with every per-run setting taken from `config`.
    pub fn for_speaker(
        gateway: Arc<dyn ChatCompletionGateway>,
        config: &ConversationConfig,
        speaker: Speaker,
        retry: RetryPolicy,
    ) -> Self {
        Self::new(
            gateway,
            speaker,
            config.model(speaker),
            config.nickname(speaker.other()),
        )
        .with_template(config.system_prompt.clone())
        .with_request_timeout(config.request_timeout())
        .with_max_tokens(config.max_tokens)
        .with_retry_policy(retry)
    }

    pub fn with_template(mut self, template: SystemPromptTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn speaker(&self) -> Speaker {
        self.speaker
    }

    pub fn nickname(&self) -> &str {
        &self.model.nickname
    }

    pub fn model_name(&self) -> &str {
        &self.model.model
    }

    /// Produce the next message for this participant.
    pub async fn generate(
        &self,
        history: &[Turn],
        persona: &str,
        topic: &str,
        temperature: f32,
    ) -> Result<TurnResult, GatewayError> {
        self.generate_with_retry_hook(history, persona, topic, temperature, &|_, _, _| {})
            .await
    }

    /// Like [`generate`](Self::generate), reporting each retry to `on_retry`.
    pub async fn generate_with_retry_hook(
        &self,
        history: &[Turn],
        persona: &str,
        topic: &str,
        temperature: f32,
        on_retry: RetryHook<'_>,
    ) -> Result<TurnResult, GatewayError> {
        if persona.trim().is_empty() {
            return Err(GatewayError::InvalidInput("persona must not be empty".into()));
        }
        if topic.trim().is_empty() {
            return Err(GatewayError::InvalidInput("topic must not be empty".into()));
        }
        if !TEMPERATURE_RANGE.contains(&temperature) {
            return Err(GatewayError::InvalidInput(format!(
                "temperature {} outside {:.1}..={:.1}",
                temperature,
                TEMPERATURE_RANGE.start(),
                TEMPERATURE_RANGE.end()
            )));
        }

        let messages = self.build_messages(history, persona, topic);
        let request = self.request(messages, temperature, self.max_tokens);

        let mut attempt = 0u32;
        let mut transient_retries = 0u32;
        let mut timeout_retries = 0u32;

        loop {
            attempt += 1;
            debug!(
                "{} ({}) attempt {}: {} messages, last: {}",
                self.model.nickname,
                self.model.model,
                attempt,
                request.messages.len(),
                request
                    .messages
                    .last()
                    .map(|m| preview(&m.content, 80))
                    .unwrap_or_default()
            );

            let started = Instant::now();
            let error = match self.send_once(&request).await {
                Ok(completion) => {
                    let latency = started.elapsed();
                    return Self::into_turn_result(completion, latency, attempt);
                }
                Err(error) => error,
            };

            let used = match error.kind() {
                FailureKind::Timeout => &mut timeout_retries,
                _ => &mut transient_retries,
            };
            if *used >= self.retry.retries_for(error.kind()) {
                return Err(error);
            }
            *used += 1;

            let delay = self.retry.backoff(*used, error.retry_after());
            warn!(
                "{} attempt {} failed ({}), retrying in {:.1}s",
                self.model.nickname,
                attempt,
                error,
                delay.as_secs_f64()
            );
            on_retry(attempt, delay, &error);
            tokio::time::sleep(delay).await;
        }
    }

    /// Send a minimal "Hello" request, without retries.
    pub async fn check_connection(&self) -> Result<(), GatewayError> {
        let request = self.request(
            vec![ChatMessage::user(PromptTemplate::connection_check())],
            CONNECTION_CHECK_TEMPERATURE,
            Some(CONNECTION_CHECK_MAX_TOKENS),
        );
        self.send_once(&request).await.map(|_| ())
    }

    /// Build the chat context for this participant's next turn.
    ///
    /// Own turns become `assistant` messages, the partner's become `user`
    /// messages, and the request always ends on a `user` message.
    pub fn build_messages(&self, history: &[Turn], persona: &str, topic: &str) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(PromptTemplate::system_message(
            persona,
            &self.template,
            topic,
        )));

        if history.is_empty() {
            messages.push(ChatMessage::user(PromptTemplate::opening(topic)));
            return messages;
        }

        for turn in history {
            let message = if turn.speaker() == self.speaker {
                Self::named(ChatMessage::assistant(turn.content()), &self.model.nickname)
            } else {
                Self::named(ChatMessage::user(turn.content()), &self.partner_nickname)
            };
            messages.push(message);
        }

        if history.last().map(Turn::speaker) == Some(self.speaker) {
            messages.push(ChatMessage::user(PromptTemplate::continue_prompt()));
        }

        messages
    }

    fn named(message: ChatMessage, nickname: &str) -> ChatMessage {
        match participant_name(nickname) {
            Some(name) => message.with_name(name),
            None => message,
        }
    }

    fn request(
        &self,
        messages: Vec<ChatMessage>,
        temperature: f32,
        max_tokens: Option<u32>,
    ) -> ChatRequest {
        ChatRequest {
            base_url: self.model.endpoint().to_string(),
            api_key: self.model.api_key.clone(),
            model: self.model.model.clone(),
            messages,
            temperature,
            max_tokens,
            timeout: self.request_timeout,
        }
    }

    async fn send_once(&self, request: &ChatRequest) -> Result<ChatCompletion, GatewayError> {
        match tokio::time::timeout(
            self.request_timeout,
            self.gateway.send_chat_completion(request),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(GatewayError::Timeout(self.request_timeout)),
        }
    }

    fn into_turn_result(
        completion: ChatCompletion,
        latency: Duration,
        attempts: u32,
    ) -> Result<TurnResult, GatewayError> {
        let text = completion.text.trim();
        if text.is_empty() {
            return Err(GatewayError::EmptyResponse);
        }
        Ok(TurnResult {
            text: text.to_string(),
            latency,
            usage: completion.usage,
            finish_reason: completion.finish_reason,
            attempts,
        })
    }
}

/// Nickname as an OpenAI `name` field: `[A-Za-z0-9_-]{1,64}`.
///
/// Other characters become `_`; a nickname with nothing usable yields `None`.
pub fn participant_name(nickname: &str) -> Option<String> {
    let name: String = nickname
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .take(NAME_MAX_LEN)
        .collect();
    if name.chars().all(|c| c == '_') {
        None
    } else {
        Some(name)
    }
}
