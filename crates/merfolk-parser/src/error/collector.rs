//! Accumulates diagnostics across a phase.
//!
//! The lexer keeps scanning after a bad character and the interpreter keeps
//! going after a dropped instruction, so both report through a
//! [`DiagnosticCollector`] instead of stopping at the first problem.

use crate::error::{Diagnostic, ParseError};

/// A collector for diagnostics emitted during one processing phase.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    has_errors: bool,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and log it at its severity.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity().is_error() {
            self.has_errors = true;
        }
        diagnostic.log();
        self.diagnostics.push(diagnostic);
    }

    /// Finish collection.
    ///
    /// Returns `Err` with every diagnostic if any of them is an error.
    /// Warnings alone are discarded; use [`Self::into_diagnostics`] to keep them.
    pub fn finish(self) -> Result<(), ParseError> {
        if self.has_errors {
            Err(ParseError::new(self.diagnostics))
        } else {
            Ok(())
        }
    }

    /// Consume the collector, returning everything emitted in order.
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
