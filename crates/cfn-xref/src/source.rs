//! Access to template files.
//!
//! The checker never touches the file system directly; it asks a
//! [`TemplateSource`] for text. [`FsTemplateSource`] reads from disk, hosts
//! with open editor buffers can serve unsaved text instead.

use std::{
    env, fs, io,
    path::{Component, Path, PathBuf},
};

use log::debug;

use cfn_xref_parser::{Document, parse};

use crate::error::CfnXrefError;

/// Provides the text of template files.
pub trait TemplateSource {
    /// Read the full text of the template at `path`.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the template cannot be read.
    fn read_template(&self, path: &Path) -> io::Result<String>;
}

/// Reads templates from the local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsTemplateSource;

impl TemplateSource for FsTemplateSource {
    fn read_template(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }
}

impl<T: TemplateSource + ?Sized> TemplateSource for &T {
    fn read_template(&self, path: &Path) -> io::Result<String> {
        (**self).read_template(path)
    }
}

/// A template that was read and parsed successfully.
#[derive(Debug, Clone)]
pub struct LoadedTemplate {
    pub path: PathBuf,
    pub source: String,
    pub document: Document,
}

/// Read and parse the template at `path`.
///
/// # Errors
///
/// Returns [`CfnXrefError::Io`] when the file cannot be read and
/// [`CfnXrefError::Parse`] when it is not valid YAML.
pub fn load_template(
    templates: &dyn TemplateSource,
    path: &Path,
) -> Result<LoadedTemplate, CfnXrefError> {
    debug!(path:? = path; "Loading template");
    let source = templates
        .read_template(path)
        .map_err(|err| CfnXrefError::new_io_error(path, err))?;
    let document =
        parse(&source).map_err(|err| CfnXrefError::new_parse_error(path, err, source.as_str()))?;
    Ok(LoadedTemplate {
        path: path.to_path_buf(),
        source,
        document,
    })
}

/// The identity of a template file: its absolute path with `.` and `..`
/// segments removed.
///
/// Symlinks are not resolved, so the file does not need to exist.
pub fn normalize_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()
            .map(|dir| dir.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() && !normalized.has_root() {
                    normalized.push(component);
                }
            }
            Component::Prefix(_) | Component::RootDir | Component::Normal(_) => {
                normalized.push(component)
            }
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_removes_dot_segments() {
        let path = Path::new("/templates/./nested/../child.yml");
        assert_eq!(normalize_path(path), PathBuf::from("/templates/child.yml"));
    }

    #[test]
    fn test_normalize_parent_of_root_stays_at_root() {
        assert_eq!(
            normalize_path(Path::new("/../child.yml")),
            PathBuf::from("/child.yml")
        );
    }

    #[test]
    fn test_normalize_relative_path_is_absolute() {
        assert!(normalize_path(Path::new("child.yml")).is_absolute());
    }

    #[test]
    fn test_load_template_reports_missing_file() {
        let err = load_template(&FsTemplateSource, Path::new("/definitely/not/here.yml"))
            .unwrap_err();
        assert!(matches!(err, CfnXrefError::Io { .. }));
    }
}
