//! Definition collection.
//!
//! Gathers the names a template declares (`Parameters`, `Resources`,
//! `Conditions`, `Mappings`) and the names its nested stacks expose: the
//! `<Stack>.Outputs.<Key>` outputs and the parameters each nested template
//! accepts.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::{debug, warn};

use cfn_xref_parser::{
    Node, NodeKind, Span,
    error::{Diagnostic, ErrorCode},
};

use crate::{
    config::CheckConfig,
    source::{TemplateSource, load_template, normalize_path},
};

/// The resource type of a nested stack.
pub const NESTED_STACK_TYPE: &str = "AWS::CloudFormation::Stack";

/// Names declared by the template itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalDefinitions {
    parameters: Vec<String>,
    resources: Vec<String>,
    conditions: Vec<String>,
    mappings: Vec<String>,
    known_names: Vec<String>,
}

impl LocalDefinitions {
    /// Add names that count as defined without being declared.
    pub fn with_known_names(mut self, names: &[String]) -> Self {
        self.known_names.extend(names.iter().cloned());
        self
    }

    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    pub fn resources(&self) -> &[String] {
        &self.resources
    }

    pub fn conditions(&self) -> &[String] {
        &self.conditions
    }

    pub fn mappings(&self) -> &[String] {
        &self.mappings
    }

    /// Whether `name` is a parameter, resource, condition, mapping or known name.
    pub fn contains(&self, name: &str) -> bool {
        [
            &self.parameters,
            &self.resources,
            &self.conditions,
            &self.mappings,
            &self.known_names,
        ]
        .into_iter()
        .any(|names| names.iter().any(|n| n == name))
    }

    /// Whether `name` is a resource of this template, or a known name.
    pub fn has_resource(&self, name: &str) -> bool {
        self.resources
            .iter()
            .chain(&self.known_names)
            .any(|n| n == name)
    }
}

/// Collect the names declared by the sections of `root`.
pub fn collect_local_definitions(root: &Node) -> LocalDefinitions {
    let keys = |section: &str| -> Vec<String> {
        root.get(section)
            .keys()
            .into_iter()
            .map(str::to_string)
            .collect()
    };
    LocalDefinitions {
        parameters: keys("Parameters"),
        resources: keys("Resources"),
        conditions: keys("Conditions"),
        mappings: keys("Mappings"),
        known_names: Vec::new(),
    }
}

/// Find the resources of type [`NESTED_STACK_TYPE`].
///
/// Returns the `Name: {...}` pairs so callers keep the resource name and key
/// location. The search does not descend into a nested stack's own properties.
pub fn find_nested_stack_nodes(resources: &Node) -> Vec<&Node> {
    let mut found = Vec::new();
    visit_nested_stacks(resources, &mut found);
    found
}

fn visit_nested_stacks<'a>(node: &'a Node, found: &mut Vec<&'a Node>) {
    for child in node.value_of().children() {
        let value = child.value_of();
        if value.get("Type").as_str() == Some(NESTED_STACK_TYPE) {
            found.push(child);
        } else if matches!(value.kind(), NodeKind::Map(_) | NodeKind::Sequence(_)) {
            visit_nested_stacks(value, found);
        }
    }
}

/// A parameter declared by a nested template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedParameter {
    pub name: String,
    /// True when the parameter has a non-null `Default`.
    pub has_default: bool,
}

/// Names exposed by the nested stacks of one template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NestedStackDefinitions {
    pub(crate) outputs: Vec<String>,
    pub(crate) parameters: IndexMap<String, Vec<NestedParameter>>,
    pub(crate) loaded_stacks: Vec<String>,
}

impl NestedStackDefinitions {
    /// The outputs, as `<Stack>.Outputs.<Key>`.
    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    pub fn has_output(&self, name: &str) -> bool {
        self.outputs.iter().any(|output| output == name)
    }

    /// The parameters declared by the template behind `template_url`, if it
    /// was loaded.
    pub fn parameters_for(&self, template_url: &str) -> Option<&[NestedParameter]> {
        self.parameters.get(template_url).map(Vec::as_slice)
    }

    /// Whether the template of the nested stack resource `stack` was loaded,
    /// so that its outputs are known.
    pub fn is_loaded_stack(&self, stack: &str) -> bool {
        self.loaded_stacks.iter().any(|name| name == stack)
    }
}

/// Result of reading the nested templates of one template.
#[derive(Debug, Default)]
pub struct NestedStackCollection {
    pub definitions: NestedStackDefinitions,
    /// One diagnostic per nested template that failed to load.
    pub diagnostics: Vec<Diagnostic>,
    /// Normalized paths of the nested templates that loaded.
    pub templates: Vec<PathBuf>,
}

/// Read the template behind each nested stack and collect what it exposes.
///
/// `TemplateURL`s are resolved against `parent_dir`. A failing template is
/// reported as an `E200` diagnostic on its `TemplateURL` and contributes no
/// definitions; the remaining nested stacks are still read.
pub fn collect_nested_stack_definitions(
    nested_stacks: &[&Node],
    parent_dir: &Path,
    templates: &dyn TemplateSource,
    config: &CheckConfig,
) -> NestedStackCollection {
    let mut collection = NestedStackCollection::default();

    for stack in nested_stacks {
        let stack_name = stack.string_key().unwrap_or_default();
        let url_node = stack.value_of().get("Properties").get("TemplateURL");
        let Some(url) = template_url(url_node) else {
            debug!(stack = stack_name; "Skipping nested stack without a literal TemplateURL");
            continue;
        };
        if config.skips_template_url(url) {
            debug!(stack = stack_name, url; "Skipping remote nested template");
            continue;
        }

        let path = normalize_path(&parent_dir.join(url));
        let template = match load_template(templates, &path) {
            Ok(template) => template,
            Err(err) => {
                warn!(stack = stack_name, path:? = path, err:% = err; "Nested template failed to load");
                collection.diagnostics.push(
                    Diagnostic::error(format!(
                        "Unable to load or parse template file, '{}'. Error encountered: {}",
                        path.display(),
                        err.details()
                    ))
                    .with_code(ErrorCode::E200)
                    .with_label(scalar_span(url_node, url), "nested template referenced here"),
                );
                continue;
            }
        };

        let document = &template.document;
        collection.definitions.outputs.extend(
            document
                .section("Outputs")
                .keys()
                .into_iter()
                .map(|key| format!("{stack_name}.Outputs.{key}")),
        );
        collection
            .definitions
            .parameters
            .entry(url.to_string())
            .or_insert_with(|| declared_parameters(document.section("Parameters")));
        collection
            .definitions
            .loaded_stacks
            .push(stack_name.to_string());
        if !collection.templates.contains(&template.path) {
            collection.templates.push(template.path);
        }
        debug!(stack = stack_name, url; "Nested template loaded");
    }

    collection
}

/// The `TemplateURL` when it is a literal string.
fn template_url(node: &Node) -> Option<&str> {
    if node.tag().is_some() {
        return None;
    }
    node.as_str().filter(|url| !url.is_empty())
}

fn declared_parameters(parameters: &Node) -> Vec<NestedParameter> {
    parameters
        .value_of()
        .children()
        .iter()
        .filter_map(|parameter| {
            Some(NestedParameter {
                name: parameter.string_key()?.to_string(),
                has_default: !parameter.value_of().get("Default").is_null(),
            })
        })
        .collect()
}

/// Span of the text of an untagged scalar.
pub(crate) fn scalar_span(node: &Node, text: &str) -> Span {
    let quote = node.scalar_style().map_or(0, |style| style.quote_width());
    Span::with_len(node.span().start() + quote, text.len())
}
