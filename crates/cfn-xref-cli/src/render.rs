//! Text rendering of check results.

use std::fmt::Write as _;

use miette::GraphicalReportHandler;

use cfn_xref::{CfnXrefError, CollectingPublisher, FileReport};

use crate::{
    config::OutputFormat,
    error_adapter::{Reportable, report_reportables, to_reportables},
};

/// Render every published report and every aborted check.
pub fn render(publisher: &CollectingPublisher, format: OutputFormat) -> String {
    let mut out = String::new();
    for report in publisher.reports() {
        match format {
            OutputFormat::Pretty => render_pretty(&mut out, &report_reportables(report)),
            OutputFormat::Short => render_short(&mut out, report),
        }
    }
    for failure in publisher.failures() {
        match format {
            OutputFormat::Pretty => render_pretty(&mut out, &to_reportables(failure)),
            OutputFormat::Short => render_failure_short(&mut out, failure),
        }
    }
    out
}

fn render_pretty(out: &mut String, reportables: &[Reportable<'_>]) {
    let reporter = GraphicalReportHandler::new();
    for reportable in reportables {
        if reporter.render_report(out, reportable).is_err() {
            // Fall back to the plain message if the handler gives up.
            let _ = writeln!(out, "{reportable}");
        }
    }
}

/// `path:line:column: error[E100]: message`, one line per diagnostic.
fn render_short(out: &mut String, report: &FileReport) {
    let path = report.path().display();
    for (diagnostic, range) in report.line_ranges() {
        let _ = match range {
            Some(range) => writeln!(out, "{path}:{}: {diagnostic}", range.start()),
            None => writeln!(out, "{path}: {diagnostic}"),
        };
    }
}

fn render_failure_short(out: &mut String, failure: &CfnXrefError) {
    match failure {
        CfnXrefError::Parse { path, err, src } => {
            let path = path.display();
            for diagnostic in err.diagnostics() {
                let _ = match diagnostic.line_range(src) {
                    Some(range) => writeln!(out, "{path}:{}: {diagnostic}", range.start()),
                    None => writeln!(out, "{path}: {diagnostic}"),
                };
            }
        }
        CfnXrefError::Io { path, .. } => {
            let _ = writeln!(out, "{}: error: {failure}", path.display());
        }
    }
}
