//! Fatal diagnostics.
//!
//! The compiler is an all-or-nothing batch: every structural or semantic
//! violation is reported as a `Fatal` carrying full entity context, and
//! returning it up the stack is the abort mechanism. Warnings are not
//! errors; they go through `tracing::warn!` and processing continues.

use std::fmt;

/// A fatal diagnostic with full context: the subject (entity path or
/// parse-node path), the attempted operation, the cause, optional detail
/// and an optional nested cause.
#[derive(Debug)]
pub struct Fatal {
    pub subject: String,
    pub operation: String,
    pub cause: String,
    pub detail: Option<String>,
    pub source: Option<Box<Fatal>>,
}

impl Fatal {
    pub fn new(
        subject: impl Into<String>,
        operation: impl Into<String>,
        cause: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            operation: operation.into(),
            cause: cause.into(),
            detail: None,
            source: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_source(mut self, source: Fatal) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for Fatal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.subject, self.operation, self.cause)?;
        if let Some(detail) = &self.detail {
            write!(f, ": {}", detail)?;
        }
        if let Some(source) = &self.source {
            write!(f, "; caused by: {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for Fatal {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|s| s as &(dyn std::error::Error + 'static))
    }
}

/// Result type for compiler operations.
pub type ModlResult<T> = Result<T, Fatal>;
