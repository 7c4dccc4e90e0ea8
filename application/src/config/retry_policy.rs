//! Retry policy — Model Client retry control.
//!
//! [`RetryPolicy`] bounds how often the Model Client repeats a call after a
//! retryable failure and how long it waits in between. The orchestrator never
//! retries on its own.

use duel_domain::FailureKind;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Bounded exponential backoff.
///
/// | Failure      | Retries            |
/// |--------------|--------------------|
/// | RateLimited  | `max_retries`      |
/// | Network      | `max_retries`      |
/// | Timeout      | `timeout_retries`  |
/// | anything else| none               |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retries after rate limiting or transport failures.
    pub max_retries: u32,
    /// Retries after a request timeout.
    pub timeout_retries: u32,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Factor applied to the delay after each retry.
    pub backoff_multiplier: f64,
    /// Upper bound for any single delay, including provider `Retry-After`.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            timeout_retries: 1,
            initial_backoff: Duration::from_secs(1),
            backoff_multiplier: 2.0,
            max_backoff: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Policy that surfaces every failure immediately.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            timeout_retries: 0,
            ..Self::default()
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_max_retries(mut self, max: u32) -> Self {
        self.max_retries = max;
        self
    }

    pub fn with_timeout_retries(mut self, max: u32) -> Self {
        self.timeout_retries = max;
        self
    }

    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    pub fn with_max_backoff(mut self, backoff: Duration) -> Self {
        self.max_backoff = backoff;
        self
    }

    // ==================== Policy ====================

    /// Number of retries allowed for a failure of this kind.
    pub fn retries_for(&self, kind: FailureKind) -> u32 {
        match kind {
            FailureKind::RateLimited | FailureKind::Network => self.max_retries,
            FailureKind::Timeout => self.timeout_retries,
            _ => 0,
        }
    }

    /// Delay before retry number `retry` (1-based).
    ///
    /// A provider hint replaces the computed delay; both are capped at
    /// `max_backoff`.
    pub fn backoff(&self, retry: u32, hint: Option<Duration>) -> Duration {
        if let Some(hint) = hint {
            return hint.min(self.max_backoff);
        }
        let exponent = retry.saturating_sub(1) as i32;
        let factor = self.backoff_multiplier.max(1.0).powi(exponent);
        let secs = self.initial_backoff.as_secs_f64() * factor;
        Duration::try_from_secs_f64(secs)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }
}
