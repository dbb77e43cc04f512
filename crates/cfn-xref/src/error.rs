//! Error types for cfn-xref operations.
//!
//! [`CfnXrefError`] covers the failures that stop one template from being
//! checked at all. Problems found *in* a template are reported as
//! [`Diagnostic`](cfn_xref_parser::error::Diagnostic)s instead.

use std::{
    io,
    path::{Path, PathBuf},
};

use thiserror::Error;

use cfn_xref_parser::error::ParseError;

/// The main error type for cfn-xref operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant keeps the template text next to the structured parse
/// error so that hosts can render the error against its source.
#[derive(Debug, Error)]
pub enum CfnXrefError {
    #[error("I/O error reading '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{err}")]
    Parse {
        path: PathBuf,
        err: ParseError,
        src: String,
    },
}

impl CfnXrefError {
    /// Create a new `Io` error for the file at `path`.
    pub fn new_io_error(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(path: impl Into<PathBuf>, err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            err,
            src: src.into(),
        }
    }

    /// The file the error is about.
    pub fn path(&self) -> &Path {
        match self {
            Self::Io { path, .. } | Self::Parse { path, .. } => path,
        }
    }

    /// The underlying cause without the path, for messages that already name it.
    pub fn details(&self) -> String {
        match self {
            Self::Io { source, .. } => source.to_string(),
            Self::Parse { err, .. } => err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use cfn_xref_parser::error::Diagnostic;

    use super::*;

    #[test]
    fn test_io_error_display() {
        let err = CfnXrefError::new_io_error(
            "/tmp/child.yml",
            io::Error::new(io::ErrorKind::NotFound, "not found"),
        );
        assert_eq!(err.to_string(), "I/O error reading '/tmp/child.yml': not found");
        assert_eq!(err.details(), "not found");
        assert_eq!(err.path(), Path::new("/tmp/child.yml"));
    }

    #[test]
    fn test_parse_error_keeps_source() {
        let parse = ParseError::from(Diagnostic::error("bad"));
        let err = CfnXrefError::new_parse_error("a.yml", parse, "A: [");
        let CfnXrefError::Parse { src, .. } = &err else {
            panic!("Expected parse error");
        };
        assert_eq!(src, "A: [");
    }
}
