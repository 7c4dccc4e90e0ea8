//! Application-level configuration.
//!
//! - [`RetryPolicy`] — bounded retry with backoff inside the Model Client

pub mod retry_policy;

pub use retry_policy::RetryPolicy;
