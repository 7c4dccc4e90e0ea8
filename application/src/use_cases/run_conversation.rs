//! Run Conversation use case
//!
//! Orchestrates a two-model conversation: validates the configuration,
//! alternates turns between Model A and Model B, enforces the turn limit,
//! honors cancellation, and keeps the run state observable while the loop
//! runs in the background.

use crate::config::RetryPolicy;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::llm_gateway::{ChatCompletionGateway, GatewayError};
use crate::ports::progress::ConversationProgressNotifier;
use crate::use_cases::model_client::ModelClient;
use duel_domain::{
    ConfigIssue, ConversationConfig, ConversationExport, ExportFormat, FailureKind, RunFailure,
    RunState, RunStatus, Speaker, Turn,
};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Errors that prevent a run from starting
#[derive(Error, Debug)]
pub enum RunConversationError {
    #[error("Invalid configuration: {}", summarize(.0))]
    Configuration(Vec<ConfigIssue>),
}

fn summarize(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(|issue| issue.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result of probing one model endpoint.
#[derive(Debug)]
pub struct ConnectionCheck {
    pub speaker: Speaker,
    pub nickname: String,
    pub model: String,
    pub result: Result<(), GatewayError>,
}

/// Use case for running a conversation between two models
pub struct RunConversationUseCase {
    gateway: Arc<dyn ChatCompletionGateway>,
    retry: RetryPolicy,
    logger: Arc<dyn ConversationLogger>,
}

impl RunConversationUseCase {
    pub fn new(gateway: Arc<dyn ChatCompletionGateway>) -> Self {
        Self {
            gateway,
            retry: RetryPolicy::default(),
            logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Validate `config` and start the turn loop on the Tokio runtime.
    ///
    /// Fails before any turn when the configuration has error-severity
    /// issues. Must be called from within a Tokio runtime.
    pub fn start(
        &self,
        config: ConversationConfig,
        progress: Arc<dyn ConversationProgressNotifier>,
        cancellation: CancellationToken,
    ) -> Result<RunHandle, RunConversationError> {
        let issues = config.validate();
        for issue in issues.iter().filter(|i| !i.is_error()) {
            warn!("{}", issue);
        }
        let errors: Vec<ConfigIssue> = issues.into_iter().filter(|i| i.is_error()).collect();
        if !errors.is_empty() {
            return Err(RunConversationError::Configuration(errors));
        }

        let mut state = RunState::new();
        // A fresh state always accepts `begin`
        if let Err(e) = state.begin() {
            error!("Could not begin run: {}", e);
        }

        let config = Arc::new(config);
        let state = Arc::new(RwLock::new(state));
        let (done_tx, done_rx) = watch::channel(false);

        let run = TurnLoop {
            client_a: ModelClient::for_speaker(
                Arc::clone(&self.gateway),
                &config,
                Speaker::A,
                self.retry.clone(),
            ),
            client_b: ModelClient::for_speaker(
                Arc::clone(&self.gateway),
                &config,
                Speaker::B,
                self.retry.clone(),
            ),
            config: Arc::clone(&config),
            state: Arc::clone(&state),
            progress,
            logger: Arc::clone(&self.logger),
            cancellation: cancellation.clone(),
        };

        info!(
            "Starting conversation on \"{}\": {} ({}) vs {} ({}), {} turns",
            config.topic,
            config.model_a.nickname,
            config.model(Speaker::A).model,
            config.model_b.nickname,
            config.model(Speaker::B).model,
            config.max_turns
        );

        let task = tokio::spawn(run.drive());
        let task_state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(e) = task.await {
                error!("Conversation task ended abnormally: {}", e);
                abort_run(&task_state, &e.to_string());
            }
            let _ = done_tx.send(true);
        });

        Ok(RunHandle {
            config,
            state,
            cancellation,
            done: done_rx,
        })
    }

    /// Send a minimal request to both endpoints, without retries.
    pub async fn check_connection(&self, config: &ConversationConfig) -> Vec<ConnectionCheck> {
        let mut checks = Vec::with_capacity(2);
        for speaker in [Speaker::A, Speaker::B] {
            let client = ModelClient::for_speaker(
                Arc::clone(&self.gateway),
                config,
                speaker,
                RetryPolicy::none(),
            );
            let result = client.check_connection().await;
            match &result {
                Ok(()) => info!("{} ({}) reachable", client.nickname(), client.model_name()),
                Err(e) => warn!("{} ({}) check failed: {}", client.nickname(), client.model_name(), e),
            }
            checks.push(ConnectionCheck {
                speaker,
                nickname: client.nickname().to_string(),
                model: client.model_name().to_string(),
                result,
            });
        }
        checks
    }
}

/// Observer and controller of a started run.
///
/// Cheap to clone; every clone refers to the same run.
#[derive(Clone)]
pub struct RunHandle {
    config: Arc<ConversationConfig>,
    state: Arc<RwLock<RunState>>,
    cancellation: CancellationToken,
    done: watch::Receiver<bool>,
}

impl RunHandle {
    /// Consistent copy of the current run state.
    pub fn snapshot(&self) -> RunState {
        read_state(&self.state)
    }

    pub fn status(&self) -> RunStatus {
        read_state(&self.state).status()
    }

    pub fn config(&self) -> &ConversationConfig {
        &self.config
    }

    /// Request a graceful stop.
    ///
    /// An in-flight model call is not interrupted; its turn is kept if it
    /// succeeds, then the run ends as `StoppedByUser`.
    pub fn stop(&self) {
        if !self.cancellation.is_cancelled() {
            info!("Stop requested");
        }
        self.cancellation.cancel();
    }

    /// Render the run as it is right now. Safe to call at any time.
    pub fn export(&self, format: ExportFormat) -> String {
        ConversationExport::new(&self.config, &self.snapshot()).render(format)
    }

    pub fn is_finished(&self) -> bool {
        *self.done.borrow()
    }

    /// Wait for the turn loop to end and return the final state.
    pub async fn wait(&self) -> RunState {
        let mut done = self.done.clone();
        let _ = done.wait_for(|finished| *finished).await;
        self.snapshot()
    }
}

fn read_state(state: &RwLock<RunState>) -> RunState {
    match state.read() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

/// Fail a run whose turn loop died before reaching a terminal state.
fn abort_run(state: &RwLock<RunState>, reason: &str) {
    let mut state = match state.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    if state.status().is_terminal() {
        return;
    }
    let failure = RunFailure::new(
        state.transcript().next_turn_number(),
        state.current_speaker(),
        FailureKind::Aborted,
        reason,
    );
    if let Err(e) = state.fail(failure) {
        error!("Could not record aborted run: {}", e);
    }
}

/// How the turn loop ended.
enum Outcome {
    Completed,
    Stopped,
    Failed(RunFailure),
}

/// Background part of a run. Sole writer of the shared state.
struct TurnLoop {
    client_a: ModelClient,
    client_b: ModelClient,
    config: Arc<ConversationConfig>,
    state: Arc<RwLock<RunState>>,
    progress: Arc<dyn ConversationProgressNotifier>,
    logger: Arc<dyn ConversationLogger>,
    cancellation: CancellationToken,
}

impl TurnLoop {
    async fn drive(self) {
        self.logger.log(ConversationEvent::run_started(&self.config));
        self.progress.on_run_start(self.config.max_turns);

        let outcome = self.run_turns().await;

        if let Outcome::Failed(failure) = &outcome {
            self.logger.log(ConversationEvent::turn_failed(failure));
        }
        self.update(|state| match outcome {
            Outcome::Completed => state.complete(),
            Outcome::Stopped => state.stop_by_user(),
            Outcome::Failed(failure) => state.fail(failure),
        });

        let final_state = read_state(&self.state);
        match final_state.failure() {
            Some(failure) => warn!("Conversation failed: {}", failure),
            None => info!(
                "Conversation {} after {} turns",
                final_state.status(),
                final_state.turn_count()
            ),
        }
        self.logger.log(ConversationEvent::run_finished(&final_state));
        self.progress.on_run_finish(&final_state);
    }

    async fn run_turns(&self) -> Outcome {
        if self.cancellation.is_cancelled() {
            debug!("Cancelled before the first turn");
            return Outcome::Stopped;
        }

        loop {
            let (number, speaker, history) = {
                let state = read_state(&self.state);
                let transcript = state.transcript();
                (
                    transcript.next_turn_number(),
                    transcript.next_speaker(),
                    transcript.turns().to_vec(),
                )
            };

            let client = self.client(speaker);
            let persona = self.config.model(speaker).persona;
            info!(
                "Turn {}/{}: {} ({})",
                number,
                self.config.max_turns,
                client.nickname(),
                client.model_name()
            );
            self.progress.on_turn_start(number, speaker, client.nickname());

            let progress = &self.progress;
            let on_retry = |attempt: u32, delay: Duration, error: &GatewayError| {
                progress.on_turn_retry(number, attempt, delay, error);
            };
            let result = client
                .generate_with_retry_hook(
                    &history,
                    &persona,
                    &self.config.topic,
                    self.config.temperature,
                    &on_retry,
                )
                .await;

            let result = match result {
                Ok(result) => result,
                Err(e) => {
                    return Outcome::Failed(RunFailure::new(number, speaker, e.kind(), e.to_string()));
                }
            };

            let attempts = result.attempts;
            let turn = Turn::new(number, speaker, result.text, result.latency)
                .with_usage(result.usage)
                .with_finish_reason(result.finish_reason);
            debug!(
                "Turn {} received in {:.2}s after {} attempt(s)",
                number,
                turn.latency().as_secs_f64(),
                attempts
            );

            let recorded = {
                let mut state = match self.state.write() {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                };
                state.record_turn(turn.clone())
            };
            if let Err(e) = recorded {
                return Outcome::Failed(RunFailure::new(
                    number,
                    speaker,
                    FailureKind::InvalidResponse,
                    e.to_string(),
                ));
            }

            self.logger.log(ConversationEvent::turn_completed(
                &turn,
                client.nickname(),
                attempts,
            ));
            self.progress.on_turn_complete(&turn);

            if self.cancellation.is_cancelled() {
                info!("Stopped by user after turn {}", number);
                return Outcome::Stopped;
            }
            if number >= self.config.max_turns {
                return Outcome::Completed;
            }

            let delay = self.config.turn_delay();
            if !delay.is_zero() {
                tokio::select! {
                    biased;
                    _ = self.cancellation.cancelled() => {
                        info!("Stopped by user while waiting after turn {}", number);
                        return Outcome::Stopped;
                    }
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }
    }

    fn client(&self, speaker: Speaker) -> &ModelClient {
        match speaker {
            Speaker::A => &self.client_a,
            Speaker::B => &self.client_b,
        }
    }

    fn update<F>(&self, apply: F)
    where
        F: FnOnce(&mut RunState) -> Result<(), duel_domain::DomainError>,
    {
        let mut state = match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = apply(&mut state) {
            error!("Invalid run state transition: {}", e);
        }
    }
}
