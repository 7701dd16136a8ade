//! A single import problem or repair.

use std::fmt;

use crate::error::{ErrorCode, Severity};

/// A diagnostic message produced while decoding an import payload.
///
/// Built fluently from [`Diagnostic::error`] or [`Diagnostic::warning`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    severity: Severity,
    message: String,
    code: Option<ErrorCode>,
    record: Option<usize>,
    help: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            code: None,
            record: None,
            help: None,
        }
    }

    /// Attach an error code.
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Point the diagnostic at the zero-based position of a record in the payload.
    pub fn at_record(mut self, index: usize) -> Self {
        self.record = Some(index);
        self
    }

    /// Attach help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    pub fn record(&self) -> Option<usize> {
        self.record
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.severity)?;
        if let Some(code) = self.code {
            write!(f, "[{code}]")?;
        }
        write!(f, ": {}", self.message)?;
        if let Some(record) = self.record {
            write!(f, " (record {record})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_plain() {
        let diag = Diagnostic::error("not a list");
        assert_eq!(diag.to_string(), "error: not a list");
    }

    #[test]
    fn test_display_with_code_and_record() {
        let diag = Diagnostic::warning("header dropped")
            .with_code(ErrorCode::W200)
            .at_record(4);
        assert_eq!(diag.to_string(), "warning[W200]: header dropped (record 4)");
        assert!(diag.severity().is_warning());
        assert_eq!(diag.help(), None);
    }
}
