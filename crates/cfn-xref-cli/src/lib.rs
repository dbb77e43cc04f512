//! cfn-xref CLI library
//!
//! This module contains the core CLI logic for the cfn-xref template checker.

pub mod error_adapter;

mod args;
mod config;
mod render;

pub use args::Args;
pub use config::OutputFormat;

use std::path::Path;

use log::info;

use cfn_xref::{CfnXrefError, Checker, CollectingPublisher, FsTemplateSource};

use config::CliConfig;

/// Totals of one CLI run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub files: usize,
    pub errors: usize,
    pub warnings: usize,
    /// Templates that could not be read or parsed.
    pub failures: usize,
    pub fail_on_warnings: bool,
}

impl Summary {
    fn new(publisher: &CollectingPublisher, fail_on_warnings: bool) -> Self {
        Self {
            files: publisher.reports().count(),
            errors: publisher.error_count(),
            warnings: publisher.warning_count(),
            failures: publisher.failures().len(),
            fail_on_warnings,
        }
    }

    /// Whether the run should exit successfully.
    pub fn is_success(&self) -> bool {
        self.errors == 0 && self.failures == 0 && !(self.fail_on_warnings && self.warnings > 0)
    }
}

/// Check the templates named by `args` and collect the results.
///
/// # Errors
///
/// Returns `CfnXrefError` when the configuration cannot be loaded. Problems in
/// the templates themselves are collected in the returned publisher.
pub fn check(args: &Args) -> Result<(CollectingPublisher, Summary), CfnXrefError> {
    let app_config = config::load_config(args.config.as_ref())?;
    Ok(check_with_config(args, &app_config))
}

fn check_with_config(args: &Args, app_config: &CliConfig) -> (CollectingPublisher, Summary) {
    let recurse = args.recurse || app_config.check().recurse();
    let fail_on_warnings = args.fail_on_warnings || app_config.output().fail_on_warnings();

    let mut checker = Checker::new(
        FsTemplateSource,
        CollectingPublisher::new(),
        app_config.check().clone(),
    );
    for input in &args.inputs {
        checker.check_file(Path::new(input), recurse);
    }

    let publisher = checker.into_publisher();
    let summary = Summary::new(&publisher, fail_on_warnings);
    (publisher, summary)
}

/// Run the cfn-xref CLI application
///
/// Checks every input template and prints the diagnostics found.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `CfnXrefError` for configuration loading errors.
pub fn run(args: &Args) -> Result<Summary, CfnXrefError> {
    info!(inputs:? = args.inputs, recurse = args.recurse; "Checking templates");

    let app_config = config::load_config(args.config.as_ref())?;
    let format = args.format.unwrap_or(app_config.output().format());
    let (publisher, summary) = check_with_config(args, &app_config);
    print!("{}", render::render(&publisher, format));

    info!(
        files = summary.files,
        errors = summary.errors,
        warnings = summary.warnings,
        failures = summary.failures;
        "Check finished"
    );
    Ok(summary)
}
