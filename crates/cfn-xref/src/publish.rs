//! Delivery of diagnostics to the host.
//!
//! A [`Checker`](crate::Checker) hands each finished file to a
//! [`DiagnosticsPublisher`]. Every publish replaces whatever was previously
//! published for that file.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use cfn_xref_parser::{
    LineRange,
    error::{Diagnostic, Severity},
};

use crate::error::CfnXrefError;

/// The diagnostics of one checked file, with the text they refer to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    path: PathBuf,
    source: String,
    diagnostics: Vec<Diagnostic>,
}

impl FileReport {
    pub fn new(path: impl Into<PathBuf>, source: impl Into<String>, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            path: path.into(),
            source: source.into(),
            diagnostics,
        }
    }

    /// The normalized path of the checked file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The text that was checked.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    /// Each diagnostic with its single-line range in [`source`](Self::source).
    pub fn line_ranges(&self) -> impl Iterator<Item = (&Diagnostic, Option<LineRange>)> {
        self.diagnostics
            .iter()
            .map(|diagnostic| (diagnostic, diagnostic.line_range(&self.source)))
    }

    fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.severity() == severity)
            .count()
    }
}

/// Receives diagnostics for display.
pub trait DiagnosticsPublisher {
    /// Replace the published diagnostics of `report.path()`.
    fn publish(&mut self, report: FileReport);

    /// Remove the published diagnostics of one file.
    fn clear(&mut self, path: &Path);

    /// Remove all published diagnostics.
    fn clear_all(&mut self);

    /// Bring a file with problems to the user's attention.
    fn reveal(&mut self, _path: &Path) {}

    /// Called with the error that aborted the check of `path`, after it was
    /// logged.
    fn report_failure(&mut self, _path: &Path, _error: CfnXrefError) {}
}

/// A publisher that keeps everything in memory.
#[derive(Debug, Default)]
pub struct CollectingPublisher {
    reports: IndexMap<PathBuf, FileReport>,
    revealed: Vec<PathBuf>,
    failures: Vec<CfnXrefError>,
}

impl CollectingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current report of each file, in the order files were first published.
    pub fn reports(&self) -> impl Iterator<Item = &FileReport> {
        self.reports.values()
    }

    pub fn report(&self, path: &Path) -> Option<&FileReport> {
        self.reports.get(path)
    }

    /// Files passed to [`reveal`](DiagnosticsPublisher::reveal), in order.
    pub fn revealed(&self) -> &[PathBuf] {
        &self.revealed
    }

    /// Errors that aborted a check.
    pub fn failures(&self) -> &[CfnXrefError] {
        &self.failures
    }

    pub fn error_count(&self) -> usize {
        self.reports.values().map(FileReport::error_count).sum()
    }

    pub fn warning_count(&self) -> usize {
        self.reports.values().map(FileReport::warning_count).sum()
    }
}

impl DiagnosticsPublisher for CollectingPublisher {
    fn publish(&mut self, report: FileReport) {
        self.reports.insert(report.path.clone(), report);
    }

    fn clear(&mut self, path: &Path) {
        self.reports.shift_remove(path);
    }

    fn clear_all(&mut self) {
        self.reports.clear();
        self.revealed.clear();
        self.failures.clear();
    }

    fn reveal(&mut self, path: &Path) {
        self.revealed.push(path.to_path_buf());
    }

    fn report_failure(&mut self, _path: &Path, error: CfnXrefError) {
        self.failures.push(error);
    }
}
