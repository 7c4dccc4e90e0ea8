//! Core domain concepts shared across all subdomains.
//!
//! - [`error::DomainError`] — domain-level errors
//! - [`error::FailureKind`] / [`error::ErrorClass`] — classification of failed model calls

pub mod error;
