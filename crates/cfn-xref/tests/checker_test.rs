//! Integration tests for the Checker API
//!
//! These tests write parent and nested templates to a temporary directory and
//! check them through the file system.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::{TempDir, tempdir};

use cfn_xref::{
    Checker, CollectingPublisher, FsTemplateSource, HostEvent, config::CheckConfig,
};
use cfn_xref_parser::{
    LineRange,
    error::{Diagnostic, ErrorCode, Severity},
};

/// A temporary template directory.
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: tempdir().expect("Failed to create temp directory"),
        }
    }

    fn write(&self, name: &str, text: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create template directory");
        }
        fs::write(&path, text).expect("Failed to write template");
        path
    }
}

fn checker() -> Checker<FsTemplateSource, CollectingPublisher> {
    Checker::new(
        FsTemplateSource,
        CollectingPublisher::new(),
        CheckConfig::default(),
    )
}

fn check(path: &Path) -> Vec<Diagnostic> {
    checker().check_file(path, false)
}

fn summary(diagnostics: &[Diagnostic]) -> Vec<(Severity, &str)> {
    diagnostics
        .iter()
        .map(|d| (d.severity(), d.message()))
        .collect()
}

const NESTED_PARENT: &str = "\
Resources:
  MyStack:
    Type: AWS::CloudFormation::Stack
    Properties:
      TemplateURL: ./child.yml
      Parameters:
        Foo: value
";

#[test]
fn test_unresolved_ref_in_resource_property() {
    let workspace = Workspace::new();
    let source = "Resources:\n  A:\n    Type: X\n    Properties:\n      Value: !Ref B\n";
    let path = workspace.write("main.yml", source);

    let diagnostics = check(&path);
    assert_eq!(
        summary(&diagnostics),
        vec![(Severity::Error, "Unable to find referenced value, 'B'")]
    );
    assert_eq!(
        diagnostics[0].line_range(source),
        Some(LineRange {
            start_line: 4,
            start_column: 18,
            end_line: 4,
            end_column: 19,
        })
    );
}

#[test]
fn test_unknown_nested_parameter() {
    let workspace = Workspace::new();
    workspace.write("child.yml", "Parameters:\n  Other:\n    Type: String\n    Default: x\n");
    let path = workspace.write("main.yml", NESTED_PARENT);

    let diagnostics = check(&path);
    assert_eq!(
        summary(&diagnostics),
        vec![
            (
                Severity::Error,
                "Referenced file does not have parameter, 'Foo'"
            ),
            (
                Severity::Warning,
                "Properties missing value for parameter with default value, 'Other'"
            ),
        ]
    );
    assert_eq!(diagnostics[0].code(), Some(ErrorCode::E201));
}

#[test]
fn test_missing_nested_parameter_with_and_without_default() {
    let workspace = Workspace::new();
    workspace.write(
        "child.yml",
        "Parameters:\n  Foo:\n    Type: String\n  Bar:\n    Type: String\n    Default: x\n",
    );
    let path = workspace.write("main.yml", NESTED_PARENT);
    assert_eq!(
        summary(&check(&path)),
        vec![(
            Severity::Warning,
            "Properties missing value for parameter with default value, 'Bar'"
        )]
    );

    workspace.write(
        "child.yml",
        "Parameters:\n  Foo:\n    Type: String\n  Bar:\n    Type: String\n",
    );
    let diagnostics = check(&path);
    assert_eq!(
        summary(&diagnostics),
        vec![(
            Severity::Error,
            "Properties missing value for required parameter, 'Bar'"
        )]
    );
    let span = diagnostics[0].primary_span().unwrap();
    assert_eq!(&NESTED_PARENT[span.range()], "Parameters");
}

#[test]
fn test_sub_with_one_undefined_name() {
    let workspace = Workspace::new();
    let source = "\
Parameters:
  Foo:
    Type: String
Resources:
  A:
    Type: X
    Properties:
      Name: !Sub \"${Foo}-${Bar}\"
";
    let path = workspace.write("main.yml", source);

    let diagnostics = check(&path);
    assert_eq!(
        summary(&diagnostics),
        vec![(Severity::Error, "Unable to find referenced value, 'Bar'")]
    );
    let span = diagnostics[0].primary_span().unwrap();
    assert_eq!(&source[span.range()], "Bar");
}

#[test]
fn test_missing_nested_stack_output() {
    let workspace = Workspace::new();
    workspace.write(
        "child.yml",
        "Parameters:\n  Foo:\n    Type: String\nOutputs:\n  Present:\n    Value: x\n",
    );
    let source = format!(
        "{NESTED_PARENT}Outputs:\n  Ok:\n    Value: !GetAtt MyStack.Outputs.Present\n  Bad:\n    Value: !GetAtt MyStack.Outputs.Missing\n"
    );
    let path = workspace.write("main.yml", &source);

    let diagnostics = check(&path);
    assert_eq!(
        summary(&diagnostics),
        vec![(
            Severity::Error,
            "Unable to find referenced sub stack output, 'MyStack.Outputs.Missing'"
        )]
    );
    let span = diagnostics[0].primary_span().unwrap();
    assert_eq!(&source[span.range()], "MyStack.Outputs.Missing");
}

#[test]
fn test_missing_nested_template_file() {
    let workspace = Workspace::new();
    let path = workspace.write("main.yml", NESTED_PARENT);

    let diagnostics = check(&path);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code(), Some(ErrorCode::E200));
    assert!(
        diagnostics[0]
            .message()
            .starts_with("Unable to load or parse template file, '"),
        "unexpected message: {}",
        diagnostics[0].message()
    );
    let span = diagnostics[0].primary_span().unwrap();
    assert_eq!(&NESTED_PARENT[span.range()], "./child.yml");
}

#[test]
fn test_recursive_check_through_subdirectories() {
    let workspace = Workspace::new();
    workspace.write(
        "stacks/network.yml",
        "Resources:\n  Storage:\n    Type: AWS::CloudFormation::Stack\n    Properties:\n      TemplateURL: ../storage/bucket.yml\n",
    );
    workspace.write(
        "storage/bucket.yml",
        "Resources:\n  Bucket:\n    Type: AWS::S3::Bucket\n    Properties:\n      BucketName: !Ref Name\n",
    );
    let root = workspace.write(
        "main.yml",
        "Resources:\n  Network:\n    Type: AWS::CloudFormation::Stack\n    Properties:\n      TemplateURL: stacks/network.yml\n",
    );

    let mut checker = checker();
    assert!(checker.check_file(&root, true).is_empty());

    let publisher = checker.publisher();
    assert_eq!(publisher.reports().count(), 3);
    assert_eq!(publisher.error_count(), 1);
    assert_eq!(publisher.revealed().len(), 1);
    assert!(publisher.revealed()[0].ends_with("storage/bucket.yml"));
}

#[test]
fn test_editor_buffer_overrides_disk() {
    let workspace = Workspace::new();
    let path = workspace.write("main.yml", "Resources:\n  A:\n    Type: X\n");

    let mut checker = checker();
    assert!(checker.handle_event(HostEvent::Saved(path.clone())).is_empty());

    let diagnostics = checker.handle_event(HostEvent::Changed {
        path: path.clone(),
        text: "Resources:\n  A:\n    Type: X\n    DependsOn: [B]\n".to_string(),
    });
    assert_eq!(
        summary(&diagnostics),
        vec![(Severity::Error, "Unable to find referenced resource, 'B'")]
    );
}

#[test]
fn test_repeated_checks_are_identical() {
    let workspace = Workspace::new();
    workspace.write("child.yml", "Parameters:\n  Bar:\n    Type: String\n");
    let path = workspace.write("main.yml", NESTED_PARENT);

    let mut checker = checker();
    let first = checker.check_file(&path, true);
    let second = checker.check_file(&path, true);
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}
