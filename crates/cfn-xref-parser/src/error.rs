//! Error and diagnostic system shared by the template checker.
//!
//! This module provides:
//! - Error codes for documentation and searchability
//! - Labeled spans pointing at the offending name in the template
//! - Severity levels
//! - A collector for accumulating diagnostics during one check pass
//!
//! # Example
//!
//! ```
//! # use cfn_xref_parser::error::{Diagnostic, ErrorCode};
//! # use cfn_xref_parser::Span;
//!
//! let span = Span::new(120..126);
//!
//! let diag = Diagnostic::error("Unable to find referenced value, 'Bucket'")
//!     .with_code(ErrorCode::E100)
//!     .with_label(span, "not defined in this template")
//!     .with_help("declare it under Parameters or Resources");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub use collector::DiagnosticCollector;
pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
pub use severity::Severity;
