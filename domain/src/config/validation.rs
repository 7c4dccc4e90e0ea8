//! Structured configuration issues.
//!
//! Validation never stops at the first problem: every check appends a
//! [`ConfigIssue`] so the user can fix all of them in one pass.

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: a run cannot start with this configuration.
    Error,
    /// Non-fatal: the run works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// A required string is empty or whitespace.
    EmptyField { field: String },
    /// A numeric value lies outside its allowed range.
    OutOfRange {
        field: String,
        value: String,
        range: String,
    },
    /// The system prompt template lacks the `{topic}` placeholder.
    MissingPlaceholder { field: String },
    /// A value is set but has no effect with the rest of the configuration.
    IgnoredField { field: String },
    /// A referenced file could not be read; a fallback is used.
    UnreadableFile { field: String, path: String },
}

/// A detected issue in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn empty_field(field: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            severity: Severity::Error,
            message: format!("{} is required", field),
            code: ConfigIssueCode::EmptyField { field },
        }
    }

    pub fn out_of_range(
        field: impl Into<String>,
        value: impl std::fmt::Display,
        range: impl Into<String>,
    ) -> Self {
        let field = field.into();
        let range = range.into();
        let value = value.to_string();
        Self {
            severity: Severity::Error,
            message: format!("{} must be within {} (got {})", field, range, value),
            code: ConfigIssueCode::OutOfRange {
                field,
                value,
                range,
            },
        }
    }

    pub fn missing_placeholder(field: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            severity: Severity::Warning,
            message: format!(
                "{} does not contain {{topic}}; the topic will not appear in the system prompt",
                field
            ),
            code: ConfigIssueCode::MissingPlaceholder { field },
        }
    }

    pub fn ignored_field(field: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        let field = field.into();
        Self {
            severity: Severity::Warning,
            message: format!("{} is ignored: {}", field, reason),
            code: ConfigIssueCode::IgnoredField { field },
        }
    }

    pub fn unreadable_file(
        field: impl Into<String>,
        path: impl Into<String>,
        reason: impl std::fmt::Display,
    ) -> Self {
        let field = field.into();
        let path = path.into();
        Self {
            severity: Severity::Warning,
            message: format!("{}: cannot read {} ({}), using the default", field, path, reason),
            code: ConfigIssueCode::UnreadableFile { field, path },
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {}", label, self.message)
    }
}
