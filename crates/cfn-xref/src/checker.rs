//! The check orchestrator.
//!
//! [`Checker`] owns the host seams: it reads templates through a
//! [`TemplateSource`], runs [`analyze`] on them and hands the results to a
//! [`DiagnosticsPublisher`]. It is the only part of the crate that knows about
//! files and editor events.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use log::{debug, error, info};

use cfn_xref_parser::{error::Diagnostic, parse};

use crate::{
    analyze,
    config::CheckConfig,
    error::CfnXrefError,
    publish::{DiagnosticsPublisher, FileReport},
    source::{TemplateSource, normalize_path},
};

/// Editor events that affect a file's diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Opened(PathBuf),
    Saved(PathBuf),
    /// The buffer of `path` now holds `text`, which may be unsaved.
    Changed { path: PathBuf, text: String },
    ActiveChanged(PathBuf),
    Closed(PathBuf),
}

/// Checks templates and publishes their diagnostics.
///
/// A file that is already being checked is not checked again until that check
/// finishes, which stops recursion through cyclic nested stacks.
///
/// # Examples
///
/// ```
/// # use std::path::Path;
/// # use cfn_xref::{Checker, CollectingPublisher, FsTemplateSource, config::CheckConfig};
/// let mut checker = Checker::new(
///     FsTemplateSource,
///     CollectingPublisher::new(),
///     CheckConfig::default(),
/// );
///
/// let source = "Resources:\n  A:\n    Type: X\n    Properties:\n      Name: !Ref B\n";
/// let diagnostics = checker.check_document(Path::new("/templates/main.yml"), source, false);
/// assert_eq!(diagnostics[0].message(), "Unable to find referenced value, 'B'");
/// ```
#[derive(Debug)]
pub struct Checker<S, P> {
    templates: S,
    publisher: P,
    config: CheckConfig,
    processing: HashSet<PathBuf>,
}

impl<S: TemplateSource, P: DiagnosticsPublisher> Checker<S, P> {
    pub fn new(templates: S, publisher: P, config: CheckConfig) -> Self {
        Self {
            templates,
            publisher,
            config,
            processing: HashSet::new(),
        }
    }

    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    pub fn publisher_mut(&mut self) -> &mut P {
        &mut self.publisher
    }

    pub fn into_publisher(self) -> P {
        self.publisher
    }

    /// Check the template stored at `path`.
    ///
    /// With `recurse`, the nested templates it references are checked and
    /// published as well; nested files with diagnostics are revealed.
    ///
    /// Returns the diagnostics published for `path`. A file that cannot be
    /// read or parsed yields no diagnostics; the failure is logged and passed
    /// to [`DiagnosticsPublisher::report_failure`].
    pub fn check_file(&mut self, path: &Path, recurse: bool) -> Vec<Diagnostic> {
        self.check(path, None, recurse)
    }

    /// Check `text` as the content of `path`, e.g. an unsaved editor buffer.
    pub fn check_document(&mut self, path: &Path, text: &str, recurse: bool) -> Vec<Diagnostic> {
        self.check(path, Some(text), recurse)
    }

    /// React to an editor event.
    pub fn handle_event(&mut self, event: HostEvent) -> Vec<Diagnostic> {
        debug!(event:? = event; "Host event");
        match event {
            HostEvent::Opened(path) | HostEvent::Saved(path) | HostEvent::ActiveChanged(path) => {
                self.check_file(&path, false)
            }
            HostEvent::Changed { path, text } => self.check_document(&path, &text, false),
            HostEvent::Closed(path) => {
                self.publisher.clear(&normalize_path(&path));
                Vec::new()
            }
        }
    }

    /// Clear all published diagnostics and forget in-flight checks.
    pub fn reset(&mut self) {
        self.publisher.clear_all();
        self.processing.clear();
    }

    fn check(&mut self, path: &Path, text: Option<&str>, recurse: bool) -> Vec<Diagnostic> {
        let path = normalize_path(path);
        if !self.processing.insert(path.clone()) {
            debug!(path:? = path; "Check already in progress, skipping");
            return Vec::new();
        }

        self.publisher.clear(&path);
        let diagnostics = match self.run(&path, text, recurse) {
            Ok((source, diagnostics)) => {
                self.publisher
                    .publish(FileReport::new(&path, source, diagnostics.clone()));
                diagnostics
            }
            Err(err) => {
                error!(path:? = path, err:% = err; "Template check aborted");
                self.publisher.report_failure(&path, err);
                Vec::new()
            }
        };

        self.processing.remove(&path);
        diagnostics
    }

    fn run(
        &mut self,
        path: &Path,
        text: Option<&str>,
        recurse: bool,
    ) -> Result<(String, Vec<Diagnostic>), CfnXrefError> {
        info!(path:? = path, recurse; "Checking template");

        let source = match text {
            Some(text) => text.to_string(),
            None => self
                .templates
                .read_template(path)
                .map_err(|err| CfnXrefError::new_io_error(path, err))?,
        };
        let document =
            parse(&source).map_err(|err| CfnXrefError::new_parse_error(path, err, source.as_str()))?;

        let parent_dir = path.parent().unwrap_or(Path::new(""));
        let analysis = analyze(&document, parent_dir, &self.templates, &self.config);

        if recurse {
            for nested in &analysis.nested_templates {
                if !self.check_file(nested, true).is_empty() {
                    self.publisher.reveal(nested);
                }
            }
        }

        info!(
            path:? = path,
            diagnostics = analysis.diagnostics.len();
            "Template checked"
        );
        Ok((source, analysis.diagnostics))
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, io};

    use super::*;
    use crate::publish::CollectingPublisher;

    #[derive(Default)]
    struct MemorySource(HashMap<PathBuf, String>);

    impl MemorySource {
        fn with(mut self, path: &str, text: &str) -> Self {
            self.0.insert(PathBuf::from(path), text.to_string());
            self
        }
    }

    impl TemplateSource for MemorySource {
        fn read_template(&self, path: &Path) -> io::Result<String> {
            self.0
                .get(path)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such template"))
        }
    }

    fn checker(source: MemorySource) -> Checker<MemorySource, CollectingPublisher> {
        Checker::new(source, CollectingPublisher::new(), CheckConfig::default())
    }

    const MAIN: &str = "\
Resources:
  A:
    Type: X
    Properties:
      Name: !Ref B
";

    #[test]
    fn test_check_file_publishes_report() {
        let mut checker = checker(MemorySource::default().with("/t/main.yml", MAIN));
        let diagnostics = checker.check_file(Path::new("/t/main.yml"), false);
        assert_eq!(diagnostics.len(), 1);

        let report = checker.publisher().report(Path::new("/t/main.yml")).unwrap();
        assert_eq!(report.diagnostics(), diagnostics.as_slice());
        assert_eq!(report.source(), MAIN);
    }

    #[test]
    fn test_check_is_idempotent() {
        let mut checker = checker(MemorySource::default().with("/t/main.yml", MAIN));
        let first = checker.check_file(Path::new("/t/main.yml"), false);
        let second = checker.check_file(Path::new("/t/main.yml"), false);
        assert_eq!(first, second);
        assert_eq!(checker.publisher().reports().count(), 1);
    }

    #[test]
    fn test_unreadable_file_is_reported_as_failure() {
        let mut checker = checker(MemorySource::default());
        let diagnostics = checker.check_file(Path::new("/t/missing.yml"), false);
        assert!(diagnostics.is_empty());
        assert_eq!(checker.publisher().failures().len(), 1);
        assert!(checker.publisher().report(Path::new("/t/missing.yml")).is_none());
    }

    #[test]
    fn test_invalid_yaml_is_reported_as_failure() {
        let mut checker = checker(MemorySource::default());
        let diagnostics = checker.check_document(Path::new("/t/bad.yml"), "A: [\n", false);
        assert!(diagnostics.is_empty());
        assert!(matches!(
            checker.publisher().failures()[0],
            CfnXrefError::Parse { .. }
        ));
    }

    #[test]
    fn test_events() {
        let mut checker = checker(MemorySource::default().with("/t/main.yml", MAIN));
        let path = PathBuf::from("/t/main.yml");

        assert_eq!(checker.handle_event(HostEvent::Opened(path.clone())).len(), 1);

        let fixed = MAIN.replace("!Ref B", "!Ref A");
        let diagnostics = checker.handle_event(HostEvent::Changed {
            path: path.clone(),
            text: fixed,
        });
        assert!(diagnostics.is_empty());
        assert!(checker.publisher().report(&path).unwrap().is_empty());

        checker.handle_event(HostEvent::Closed(path.clone()));
        assert!(checker.publisher().report(&path).is_none());
    }

    #[test]
    fn test_recursive_check_reveals_nested_problems() {
        let parent = "\
Resources:
  Child:
    Type: AWS::CloudFormation::Stack
    Properties:
      TemplateURL: ./nested/child.yml
";
        let child = "Resources:\n  X:\n    Type: Y\n    DependsOn: Missing\n";
        let mut checker = checker(
            MemorySource::default()
                .with("/t/main.yml", parent)
                .with("/t/nested/child.yml", child),
        );

        let diagnostics = checker.check_file(Path::new("/t/main.yml"), true);
        assert!(diagnostics.is_empty());

        let nested = Path::new("/t/nested/child.yml");
        let report = checker.publisher().report(nested).unwrap();
        assert_eq!(
            report.diagnostics()[0].message(),
            "Unable to find referenced resource, 'Missing'"
        );
        assert_eq!(checker.publisher().revealed(), [nested.to_path_buf()]);
    }

    #[test]
    fn test_cyclic_nested_stacks_terminate() {
        let a = "Resources:\n  B:\n    Type: AWS::CloudFormation::Stack\n    Properties:\n      TemplateURL: b.yml\n";
        let b = "Resources:\n  A:\n    Type: AWS::CloudFormation::Stack\n    Properties:\n      TemplateURL: ./a.yml\n";
        let mut checker = checker(
            MemorySource::default()
                .with("/t/a.yml", a)
                .with("/t/b.yml", b),
        );
        assert!(checker.check_file(Path::new("/t/a.yml"), true).is_empty());
        assert_eq!(checker.publisher().reports().count(), 2);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut checker = checker(MemorySource::default().with("/t/main.yml", MAIN));
        checker.check_file(Path::new("/t/main.yml"), false);
        checker.reset();
        assert_eq!(checker.publisher().reports().count(), 0);
    }

    #[test]
    fn test_file_identity_is_normalized() {
        let mut checker = checker(MemorySource::default().with("/t/main.yml", MAIN));
        checker.check_file(Path::new("/t/sub/../main.yml"), false);
        assert!(checker.publisher().report(Path::new("/t/main.yml")).is_some());
    }
}
