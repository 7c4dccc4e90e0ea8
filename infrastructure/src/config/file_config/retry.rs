//! Retry configuration from TOML (`[retry]` section)

use duel_application::RetryPolicy;
use duel_domain::ConfigIssue;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw retry settings for the Model Client
///
/// # Example
///
/// ```toml
/// [retry]
/// max_retries = 5          # rate limits and network errors
/// timeout_retries = 0
/// initial_backoff_secs = 2.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRetryConfig {
    pub max_retries: u32,
    pub timeout_retries: u32,
    pub initial_backoff_secs: f64,
    pub backoff_multiplier: f64,
    pub max_backoff_secs: f64,
}

impl Default for FileRetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_retries: policy.max_retries,
            timeout_retries: policy.timeout_retries,
            initial_backoff_secs: policy.initial_backoff.as_secs_f64(),
            backoff_multiplier: policy.backoff_multiplier,
            max_backoff_secs: policy.max_backoff.as_secs_f64(),
        }
    }
}

impl FileRetryConfig {
    /// Convert to a [`RetryPolicy`]. Invalid values fall back to their
    /// defaults and are reported as issues.
    pub fn to_retry_policy(&self) -> (RetryPolicy, Vec<ConfigIssue>) {
        let defaults = RetryPolicy::default();
        let mut issues = Vec::new();

        let mut seconds = |field: &str, value: f64, fallback: Duration| -> Duration {
            match Duration::try_from_secs_f64(value) {
                Ok(duration) => duration,
                Err(_) => {
                    issues.push(ConfigIssue::out_of_range(format!("retry.{}", field), value, ">= 0"));
                    fallback
                }
            }
        };
        let initial_backoff = seconds(
            "initial_backoff_secs",
            self.initial_backoff_secs,
            defaults.initial_backoff,
        );
        let max_backoff = seconds("max_backoff_secs", self.max_backoff_secs, defaults.max_backoff);

        let backoff_multiplier = if self.backoff_multiplier.is_finite() && self.backoff_multiplier >= 1.0 {
            self.backoff_multiplier
        } else {
            issues.push(ConfigIssue::out_of_range(
                "retry.backoff_multiplier",
                self.backoff_multiplier,
                ">= 1.0",
            ));
            defaults.backoff_multiplier
        };

        let policy = RetryPolicy::default()
            .with_max_retries(self.max_retries)
            .with_timeout_retries(self.timeout_retries)
            .with_initial_backoff(initial_backoff)
            .with_backoff_multiplier(backoff_multiplier)
            .with_max_backoff(max_backoff);
        (policy, issues)
    }
}
