//! # cfn-xref
//!
//! Cross-reference checking for CloudFormation YAML templates.
//!
//! cfn-xref finds every name a template uses through `!Ref`, `!Sub`,
//! `!GetAtt`, `!If`, `!FindInMap` and `DependsOn`, and reports the ones that
//! do not name a parameter, resource, condition, mapping or nested stack
//! output. For nested stacks (`AWS::CloudFormation::Stack`) it also checks
//! that the parameters passed match the parameters the nested template
//! declares.
//!
//! ## Usage
//!
//! [`analyze`] checks one parsed template; [`Checker`] adds file access,
//! recursion into nested templates and publishing of the results.
//!
//! ```
//! # use std::path::Path;
//! # use cfn_xref::{analyze, FsTemplateSource, config::CheckConfig};
//! # use cfn_xref_parser::parse;
//! let source = r#"
//! Parameters:
//!   Env:
//!     Type: String
//! Resources:
//!   Bucket:
//!     Type: AWS::S3::Bucket
//!     Properties:
//!       BucketName: !Sub "${Env}-${Stage}"
//! "#;
//!
//! let document = parse(source).unwrap();
//! let analysis = analyze(&document, Path::new("."), &FsTemplateSource, &CheckConfig::default());
//!
//! assert_eq!(analysis.diagnostics.len(), 1);
//! assert_eq!(
//!     analysis.diagnostics[0].message(),
//!     "Unable to find referenced value, 'Stage'"
//! );
//! ```

pub mod config;
pub mod definitions;
pub mod reference;
pub mod validate;

mod checker;
mod error;
mod publish;
mod source;
mod sub;

pub use checker::{Checker, HostEvent};
pub use error::CfnXrefError;
pub use publish::{CollectingPublisher, DiagnosticsPublisher, FileReport};
pub use source::{FsTemplateSource, LoadedTemplate, TemplateSource, load_template, normalize_path};

use std::path::{Path, PathBuf};

use log::debug;

use cfn_xref_parser::{
    Document,
    error::{Diagnostic, DiagnosticCollector},
};

use config::CheckConfig;
use definitions::{
    collect_local_definitions, collect_nested_stack_definitions, find_nested_stack_nodes,
};
use reference::extract_references;
use validate::{validate_nested_stack_parameters, validate_references};

/// The outcome of checking one template.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    /// Diagnostics in the order they were produced: nested template load
    /// failures, unresolved references, nested stack parameter mismatches.
    pub diagnostics: Vec<Diagnostic>,
    /// Normalized paths of the nested templates that were loaded.
    pub nested_templates: Vec<PathBuf>,
}

/// Check the references of `document`.
///
/// Nested templates are resolved against `parent_dir` and read through
/// `templates`; they are loaded for their outputs and parameters but not
/// checked themselves.
pub fn analyze(
    document: &Document,
    parent_dir: &Path,
    templates: &dyn TemplateSource,
    config: &CheckConfig,
) -> Analysis {
    let resources = document.section("Resources");
    let outputs = document.section("Outputs");

    let local = collect_local_definitions(document.root()).with_known_names(config.known_names());
    let nested_stacks = find_nested_stack_nodes(resources);
    let nested = collect_nested_stack_definitions(&nested_stacks, parent_dir, templates, config);
    debug!(
        resources = local.resources().len(),
        nested_stacks = nested_stacks.len(),
        nested_outputs = nested.definitions.outputs().len();
        "Definitions collected"
    );

    let references = extract_references(resources, outputs);
    debug!(references = references.len(); "References extracted");

    let mut collector = DiagnosticCollector::new();
    collector.extend(nested.diagnostics);
    collector.extend(validate_references(&references, &local, &nested.definitions));
    collector.extend(validate_nested_stack_parameters(
        &nested_stacks,
        &nested.definitions,
    ));
    debug!(
        diagnostics = collector.len(),
        has_errors = collector.has_errors();
        "Template analyzed"
    );

    Analysis {
        diagnostics: collector.into_diagnostics(),
        nested_templates: nested.templates,
    }
}
