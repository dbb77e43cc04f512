//! Collector for accumulating diagnostics during a check pass.
//!
//! Resolution never stops at the first unresolved name; every problem in a
//! template is reported at once.

use crate::error::Diagnostic;

/// A collector for accumulating diagnostics.
///
/// # Example
///
/// ```
/// # use cfn_xref_parser::error::{Diagnostic, DiagnosticCollector, ErrorCode};
/// # use cfn_xref_parser::Span;
///
/// let mut collector = DiagnosticCollector::new();
///
/// collector.emit(
///     Diagnostic::error("Unable to find referenced value, 'Foo'")
///         .with_code(ErrorCode::E100)
///         .with_label(Span::new(10..13), "not defined"),
/// );
/// collector.emit(
///     Diagnostic::warning("Properties missing value for parameter with default value, 'Bar'")
///         .with_code(ErrorCode::E203),
/// );
///
/// assert!(collector.has_errors());
/// assert_eq!(collector.into_diagnostics().len(), 2);
/// ```
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

    /// Emit a diagnostic to this collector.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity().is_error() {
            self.has_errors = true;
        }
        self.diagnostics.push(diagnostic);
    }

    /// Emit every diagnostic of `diagnostics`.
    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.emit(diagnostic);
        }
    }

    /// Whether any emitted diagnostic is an error.
    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Diagnostics emitted so far, in emission order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Finish collection, returning every diagnostic in emission order.
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
