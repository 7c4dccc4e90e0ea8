//! In-memory gateway shared by the use case tests.

use crate::ports::llm_gateway::{ChatCompletion, ChatCompletionGateway, ChatRequest, GatewayError};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

type CallHook = Box<dyn Fn() + Send + Sync>;

/// Scripted [`ChatCompletionGateway`].
///
/// Responses are consumed in order; once the script runs out every call
/// succeeds with `"message <n>"` where `n` is the 1-based call number.
pub struct MockGateway {
    responses: Mutex<VecDeque<Result<ChatCompletion, GatewayError>>>,
    requests: Mutex<Vec<ChatRequest>>,
    hooks: Mutex<HashMap<usize, CallHook>>,
    latency: Duration,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            hooks: Mutex::new(HashMap::new()),
            latency: Duration::ZERO,
        }
    }

    /// Every call sleeps this long before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn push_ok(&self, completion: ChatCompletion) {
        self.responses.lock().unwrap().push_back(Ok(completion));
    }

    pub fn push_err(&self, error: GatewayError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Run `hook` while call number `call` (1-based) is in flight.
    pub fn on_call(&self, call: usize, hook: impl Fn() + Send + Sync + 'static) {
        self.hooks.lock().unwrap().insert(call, Box::new(hook));
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatCompletionGateway for MockGateway {
    async fn send_chat_completion(
        &self,
        request: &ChatRequest,
    ) -> Result<ChatCompletion, GatewayError> {
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len()
        };

        if let Some(hook) = self.hooks.lock().unwrap().get(&call) {
            hook();
        }

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ChatCompletion::new(format!("message {}", call))))
    }
}
