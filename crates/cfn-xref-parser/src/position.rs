//! Conversion from absolute source offsets to line/column positions.
//!
//! The YAML tree only records byte offsets. Editors and terminal output want
//! zero-based `(line, column)` pairs, so this module counts the line breaks
//! (`\n` or `\r\n`) that precede an offset.

use std::fmt;

/// A zero-based line/column position in source text.
///
/// `column` counts characters from the start of the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct RowColumn {
    pub line: usize,
    pub column: usize,
}

impl RowColumn {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for RowColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Rendered one-based, the way editors and compilers print locations.
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// A single-line range as handed to diagnostic renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineRange {
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

impl LineRange {
    /// A range of `len` characters starting at `start`, never spanning lines.
    pub fn on_line(start: RowColumn, len: usize) -> Self {
        Self {
            start_line: start.line,
            start_column: start.column,
            end_line: start.line,
            end_column: start.column + len,
        }
    }

    /// The start position of the range.
    pub fn start(&self) -> RowColumn {
        RowColumn::new(self.start_line, self.start_column)
    }
}

/// Compute the line and column of `offset` within `text`.
///
/// `line` is the number of line breaks before `offset`; `column` is the number
/// of characters between the last of those line breaks and `offset`.
///
/// # Panics
///
/// `offset` must lie within `text` and on a character boundary.
pub fn row_column_of(text: &str, offset: usize) -> RowColumn {
    let before = &text[..offset];
    let line = before.matches('\n').count();
    let line_start = before.rfind('\n').map_or(0, |index| index + 1);
    let column = before[line_start..].chars().count();
    RowColumn { line, column }
}
