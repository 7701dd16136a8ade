//! Accumulates diagnostics across a whole payload.

use log::debug;

use crate::error::{Diagnostic, ImportError};

/// Collects diagnostics so every problem in a payload is reported at once.
#[derive(Debug, Default)]
pub(crate) struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    /// Record a diagnostic.
    pub(crate) fn emit(&mut self, diagnostic: Diagnostic) {
        debug!(diagnostic:% = diagnostic; "Import diagnostic");
        self.diagnostics.push(diagnostic);
    }

    /// Returns `true` if any error has been recorded.
    pub(crate) fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity().is_error())
    }

    /// Finish collecting.
    ///
    /// Returns the warnings if no error was recorded, otherwise an
    /// [`ImportError`] carrying only the errors.
    pub(crate) fn finish(self) -> Result<Vec<Diagnostic>, ImportError> {
        if self.has_errors() {
            let errors = self
                .diagnostics
                .into_iter()
                .filter(|d| d.severity().is_error())
                .collect::<Vec<_>>();
            return Err(ImportError::new(errors));
        }
        Ok(self.diagnostics)
    }
}
