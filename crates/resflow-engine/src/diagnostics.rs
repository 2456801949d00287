//! Uniform diagnostics value for callers that report rather than propagate

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// One human-readable message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,

    /// Entity label and failing phase, e.g. `org: update failed at fetch`
    pub summary: String,

    /// Underlying cause
    pub detail: String,
}

impl Diagnostic {
    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.into(),
            detail: detail.into(),
        }
    }

    pub fn warning(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            summary: summary.into(),
            detail: detail.into(),
        }
    }
}

impl From<&EngineError> for Diagnostic {
    fn from(err: &EngineError) -> Self {
        match err {
            EngineError::Phase {
                label,
                operation,
                step,
                source,
            } => Diagnostic::error(
                format!("{}: {} failed at {}", label, operation, step),
                source.to_string(),
            ),
            other => Diagnostic::error(other.to_string(), String::new()),
        }
    }
}

/// Success (no errors) or a list of messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_result<T>(result: &Result<T, EngineError>) -> Self {
        match result {
            Ok(_) => Self::new(),
            Err(e) => Self::from(e),
        }
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn is_success(&self) -> bool {
        !self.has_errors()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<&EngineError> for Diagnostics {
    fn from(err: &EngineError) -> Self {
        Self {
            items: vec![Diagnostic::from(err)],
        }
    }
}

impl From<EngineError> for Diagnostics {
    fn from(err: EngineError) -> Self {
        Self::from(&err)
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, d) in self.items.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {}", d.severity, d.summary)?;
            if !d.detail.is_empty() {
                write!(f, ": {}", d.detail)?;
            }
        }
        Ok(())
    }
}
