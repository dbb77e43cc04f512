//! Labeled source spans for diagnostic messages.

use crate::span::Span;

/// A labeled span in the template source.
///
/// The primary label marks the referenced name itself; secondary labels add
/// context such as the nested stack the name was looked up in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    span: Span,
    message: String,
    is_primary: bool,
}

impl Label {
    /// Create a new primary label.
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    /// Create a new secondary label.
    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: false,
        }
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    pub fn is_secondary(&self) -> bool {
        !self.is_primary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_primary() {
        let label = Label::primary(Span::new(0..4), "here");
        assert!(label.is_primary());
        assert!(!label.is_secondary());
        assert_eq!(label.message(), "here");
        assert_eq!(label.span(), Span::new(0..4));
    }

    #[test]
    fn test_label_secondary() {
        let label = Label::secondary(Span::new(3..9), "declared here");
        assert!(label.is_secondary());
    }
}
