//! Configuration for template checks.
//!
//! [`CheckConfig`] implements [`serde::Deserialize`] so hosts can embed it in
//! their own configuration files.
//!
//! # Example
//!
//! ```
//! # use cfn_xref::config::CheckConfig;
//! let config = CheckConfig::default()
//!     .with_recurse(true)
//!     .with_known_names(["GeneratedByMacro"]);
//! assert!(config.recurse());
//! assert!(config.skip_remote_templates());
//! ```

use serde::Deserialize;

/// URL schemes of nested templates that are not read from the local disk.
const REMOTE_SCHEMES: [&str; 3] = ["http://", "https://", "s3://"];

/// Settings shared by every check of a [`Checker`](crate::Checker).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct CheckConfig {
    /// Also check nested stack templates, recursively.
    recurse: bool,

    /// Names treated as defined in every template, e.g. names injected by
    /// transforms or macros.
    known_names: Vec<String>,

    /// Do not try to load nested templates with an `http://`, `https://` or
    /// `s3://` `TemplateURL`.
    skip_remote_templates: bool,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            recurse: false,
            known_names: Vec::new(),
            skip_remote_templates: true,
        }
    }
}

impl CheckConfig {
    pub fn with_recurse(mut self, recurse: bool) -> Self {
        self.recurse = recurse;
        self
    }

    pub fn with_known_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_skip_remote_templates(mut self, skip: bool) -> Self {
        self.skip_remote_templates = skip;
        self
    }

    /// Returns whether nested templates are checked as well.
    pub fn recurse(&self) -> bool {
        self.recurse
    }

    /// Returns the names that are always considered defined.
    pub fn known_names(&self) -> &[String] {
        &self.known_names
    }

    pub fn skip_remote_templates(&self) -> bool {
        self.skip_remote_templates
    }

    /// Whether a `TemplateURL` should be left unread under this configuration.
    pub fn skips_template_url(&self, url: &str) -> bool {
        self.skip_remote_templates && REMOTE_SCHEMES.iter().any(|scheme| url.starts_with(scheme))
    }
}
