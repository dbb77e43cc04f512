//! Reference resolution and nested stack parameter checks.

use cfn_xref_parser::{
    Node, Span,
    error::{Diagnostic, ErrorCode},
};

use crate::{
    definitions::{LocalDefinitions, NestedParameter, NestedStackDefinitions, scalar_span},
    reference::{Reference, ReferenceKind},
};

/// Report every reference that does not name a known definition.
pub fn validate_references(
    references: &[Reference],
    local: &LocalDefinitions,
    nested: &NestedStackDefinitions,
) -> Vec<Diagnostic> {
    references
        .iter()
        .filter(|reference| !resolves(reference, local, nested))
        .map(Reference::unresolved)
        .collect()
}

fn resolves(reference: &Reference, local: &LocalDefinitions, nested: &NestedStackDefinitions) -> bool {
    let name = reference.name();
    match reference.kind() {
        ReferenceKind::GetAtt if reference.has_computed_attribute() => {
            name.split('.').next().is_some_and(|resource| local.has_resource(resource))
        }
        ReferenceKind::GetAtt => resolves_attribute(name, local, nested),
        ReferenceKind::Sub if name.contains('.') => resolves_attribute(name, local, nested),
        ReferenceKind::Ref
        | ReferenceKind::Sub
        | ReferenceKind::If
        | ReferenceKind::FindInMap
        | ReferenceKind::DependsOn => local.contains(name),
    }
}

/// `Resource.Attribute` or `Stack.Outputs.Key`.
///
/// Outputs of a nested stack whose template was loaded must exist; any other
/// attribute only needs its resource to exist.
fn resolves_attribute(name: &str, local: &LocalDefinitions, nested: &NestedStackDefinitions) -> bool {
    if nested.has_output(name) {
        return true;
    }
    let Some((resource, attribute)) = name.split_once('.') else {
        return false;
    };
    if nested.is_loaded_stack(resource) && attribute.starts_with("Outputs.") {
        return false;
    }
    local.has_resource(resource)
}

/// Compare the `Parameters` passed to each nested stack with the parameters
/// its template declares.
///
/// Nested stacks whose template was not loaded are skipped.
pub fn validate_nested_stack_parameters(
    nested_stacks: &[&Node],
    nested: &NestedStackDefinitions,
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for stack in nested_stacks {
        let properties = stack.value_of().child_by_key("Properties");
        let Some(url) = properties.get("TemplateURL").as_str() else {
            continue;
        };
        let Some(declared) = nested.parameters_for(url) else {
            continue;
        };

        let parameters = properties.child_by_key("Parameters");
        let mut missing: Vec<&NestedParameter> = declared.iter().collect();
        for supplied in parameters.value_of().children() {
            let Some(name) = supplied.string_key() else {
                continue;
            };
            if let Some(index) = missing.iter().position(|p| p.name == name) {
                missing.remove(index);
            } else if !declared.iter().any(|p| p.name == name) {
                diagnostics.push(
                    Diagnostic::error(format!(
                        "Referenced file does not have parameter, '{name}'"
                    ))
                    .with_code(ErrorCode::E201)
                    .with_label(key_span(supplied), "not declared by the nested template"),
                );
            }
        }

        let anchor = [parameters, properties, *stack]
            .into_iter()
            .find(|node| node.is_pair())
            .map_or_else(|| Span::with_len(stack.span().start(), 0), key_span);
        diagnostics.extend(missing.into_iter().map(|parameter| missing_parameter(parameter, anchor)));
    }

    diagnostics
}

fn missing_parameter(parameter: &NestedParameter, anchor: Span) -> Diagnostic {
    let help = format!("pass a value for `{}` under `Parameters`", parameter.name);
    let diagnostic = if parameter.has_default {
        Diagnostic::warning(format!(
            "Properties missing value for parameter with default value, '{}'",
            parameter.name
        ))
        .with_code(ErrorCode::E203)
    } else {
        Diagnostic::error(format!(
            "Properties missing value for required parameter, '{}'",
            parameter.name
        ))
        .with_code(ErrorCode::E202)
    };
    diagnostic
        .with_label(anchor, "parameter not passed")
        .with_help(help)
}

/// Span of the key text of a pair.
fn key_span(pair: &Node) -> Span {
    let key = pair.key();
    scalar_span(key, key.as_str().unwrap_or_default())
}
