//! Error codes for the template checker.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Document loading errors
//! - `E1xx` - Reference resolution errors
//! - `E2xx` - Nested stack contract errors

use std::fmt;

/// Error codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Document Loading Errors (E0xx)
    // =========================================================================
    /// Invalid YAML.
    ///
    /// The YAML scanner rejected the template text.
    E001,

    // =========================================================================
    // Reference Resolution Errors (E1xx)
    // =========================================================================
    /// Undefined value.
    ///
    /// A `!Ref` or `!Sub` names something that is not a parameter, resource,
    /// condition or mapping of this template.
    E100,

    /// Undefined condition.
    ///
    /// The first argument of an `!If` is not declared under `Conditions`.
    E101,

    /// Undefined map.
    ///
    /// The first argument of a `!FindInMap` is not declared under `Mappings`.
    E102,

    /// Undefined resource.
    ///
    /// A `DependsOn` entry names a resource that does not exist.
    E103,

    /// Undefined sub stack output.
    ///
    /// A `!GetAtt` names neither a local resource nor an output of a nested
    /// stack template.
    E104,

    // =========================================================================
    // Nested Stack Contract Errors (E2xx)
    // =========================================================================
    /// Nested template could not be loaded.
    ///
    /// The file named by `TemplateURL` could not be read or parsed.
    E200,

    /// Unknown nested stack parameter.
    ///
    /// A value was passed for a parameter the nested template does not declare.
    E201,

    /// Missing required nested stack parameter.
    ///
    /// The nested template declares a parameter without a `Default` and the
    /// parent does not pass a value for it.
    E202,

    /// Missing defaulted nested stack parameter.
    ///
    /// The nested template declares a parameter with a `Default` and the
    /// parent does not pass a value for it.
    E203,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            // Loading errors
            ErrorCode::E001 => "E001",
            // Resolution errors
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            ErrorCode::E104 => "E104",
            // Nested stack errors
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E203 => "E203",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            // Loading errors
            ErrorCode::E001 => "invalid yaml",
            // Resolution errors
            ErrorCode::E100 => "undefined value",
            ErrorCode::E101 => "undefined condition",
            ErrorCode::E102 => "undefined map",
            ErrorCode::E103 => "undefined resource",
            ErrorCode::E104 => "undefined sub stack output",
            // Nested stack errors
            ErrorCode::E200 => "nested template not loadable",
            ErrorCode::E201 => "unknown nested stack parameter",
            ErrorCode::E202 => "missing required parameter",
            ErrorCode::E203 => "missing defaulted parameter",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
